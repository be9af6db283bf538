use anyhow::{bail, Context};
use reqwest::{Client, StatusCode, Url};
use serde::de::IgnoredAny;
use shipment_tracker_lib::shipment::{ApiResponse, Shipment};

use crate::error::AppError;

/// Reads shipments from the external shipment REST API
#[derive(Clone)]
pub struct ShipmentClient {
    client: Client,
    base_url: Url,
}

impl ShipmentClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("Invalid shipment API url {base_url}"))?;
        if base_url.cannot_be_a_base() {
            bail!("Shipment API url {base_url} cannot carry a path");
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// `{base}/api/tracking/{id}` with the id kept as a single escaped segment
    fn tracking_url(&self, shipment_id: &str) -> Result<Url, AppError> {
        if matches!(shipment_id, "" | "." | "..") {
            return Err(AppError::BadRequest(format!("Invalid shipment id \"{shipment_id}\"")));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Upstream(format!("Shipment API url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "tracking", shipment_id]);
        Ok(url)
    }

    pub async fn get_shipment(&self, shipment_id: &str) -> Result<Shipment, AppError> {
        let url = self.tracking_url(shipment_id)?;

        let response = self.client.get(url.clone()).send().await
            .map_err(|e| AppError::Upstream(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // Body is informational only, and may not be JSON at all
            let message = response.json::<ApiResponse<IgnoredAny>>().await.ok().and_then(|envelope| envelope.message);
            return Err(AppError::NotFound(message.unwrap_or_else(|| format!("Shipment {shipment_id} not found"))));
        }
        if !status.is_success() {
            let message = response.json::<ApiResponse<IgnoredAny>>().await.ok().and_then(|envelope| envelope.message);
            return Err(AppError::Upstream(format!("{status}: {}", message.unwrap_or_default())));
        }

        let envelope: ApiResponse<Shipment> = response.json().await
            .map_err(|e| AppError::Upstream(format!("Unparseable shipment response ({status}): {e}")))?;
        envelope.into_result().map_err(AppError::Upstream)
    }
}
