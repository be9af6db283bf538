use std::{fs::OpenOptions, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use server::{config::ServerConfig, routes, server_state::ServerState, shipment_client::ShipmentClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracking_map::{
    geocoder::{Geocoder, KnownLocations, NominatimGeocoder},
    LocationResolver, MapConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    std::fs::create_dir_all("server/log").context("Failed to create log directory")?;
    let log_file = "server/log/server.log";

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open {log_file}"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=trace,tracking_map=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        .init();

    tracing::info!("Starting server...");

    let config = ServerConfig::load()?;

    let map_config = MapConfig {
        geocode_timeout: config.geocode_timeout,
        ..Default::default()
    }
    .validate()?;

    let backend: Option<Box<dyn Geocoder>> = match &config.geocoder_url {
        Some(url) => {
            tracing::info!("Geocoding through {}", url);
            Some(Box::new(NominatimGeocoder::new(url.as_str())?))
        }
        None => {
            tracing::info!("Live geocoding disabled, using the static table only");
            None
        }
    };

    let server_state = Arc::new(ServerState {
        resolver: Arc::new(LocationResolver::from_config(KnownLocations::default(), backend, &map_config)),
        map_config,
        shipments: ShipmentClient::new(&config.shipment_api_url)?,
    });

    let app = routes::router(server_state);
    let addr = SocketAddr::from((config.bind_address, config.port));

    match &config.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await
                .context("Failed to load TLS certificate")?;

            tracing::info!("Listening on https://{}", addr);
            axum_server::bind_rustls(addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await
                .with_context(|| format!("Failed to bind {addr}"))?;

            tracing::info!("Listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
