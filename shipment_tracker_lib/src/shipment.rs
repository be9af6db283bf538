use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub current_location: Option<String>,
    /// Older records only fill this column
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub shipment_status: Option<String>,
    #[serde(default)]
    pub tracking_progress: Option<f64>,
    #[serde(default)]
    pub shipping_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub events: Vec<TrackingEvent>,
}

impl Shipment {
    /// Events, newest first
    pub fn timeline(&self) -> Vec<&TrackingEvent> {
        let mut events: Vec<&TrackingEvent> = self.events.iter().collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events
    }

    /// Where the parcel is now, preferring `currentLocation` over the legacy column
    pub fn whereabouts(&self) -> Option<&str> {
        [&self.current_location, &self.location]
            .into_iter()
            .filter_map(|text| text.as_deref())
            .find(|text| !text.trim().is_empty())
    }

    /// Status set on the shipment itself, otherwise the newest event's
    pub fn status(&self) -> &str {
        match self.shipment_status.as_deref() {
            Some(status) if !status.trim().is_empty() => status,
            _ => self.latest_status(),
        }
    }

    pub fn latest_status(&self) -> &str {
        self.timeline()
            .first()
            .map(|event| event.status.as_str())
            .unwrap_or("Unknown")
    }
}

/// Envelope used by the shipment REST endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("Response carried no data".to_string()),
            (false, _) => Err(self.message.unwrap_or_else(|| "Request failed".to_string())),
        }
    }
}
