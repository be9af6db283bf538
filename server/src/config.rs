use std::{env, fmt::Display, net::IpAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use tracing::{info, warn};

pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    /// Base url of the shipment REST API
    pub shipment_api_url: String,
    /// `None` keeps geocoding to the static table
    pub geocoder_url: Option<String>,
    pub geocode_timeout: Duration,
    pub tls: Option<TlsPaths>,
}

pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        let geocoder_url = var("GEOCODER_URL")
            .unwrap_or_else(|| tracking_map::geocoder::DEFAULT_BASE_URL.to_string());

        let tls = match (var("TLS_CERT"), var("TLS_KEY")) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert: cert.into(), key: key.into() }),
            (None, None) => None,
            _ => anyhow::bail!("TLS_CERT and TLS_KEY must be set together"),
        };

        Ok(Self {
            bind_address: try_load("BIND_ADDRESS", "0.0.0.0")?,
            port: try_load("PORT", "8080")?,
            shipment_api_url: var("SHIPMENT_API_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            geocoder_url: (geocoder_url != "off").then_some(geocoder_url),
            geocode_timeout: Duration::from_millis(try_load("GEOCODE_TIMEOUT_MS", "5000")?),
            tls,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            anyhow::anyhow!("{e}")
        })
        .with_context(|| format!("Environment variable {key} is misconfigured"))
}
