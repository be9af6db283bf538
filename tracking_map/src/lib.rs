use std::{fmt, time::Duration};

use projection::MAX_TILE_ZOOM;
use shipment_tracker_lib::coordinate::Coordinate;

pub mod canvas;
pub mod controller;
pub mod fit;
pub mod geocoder;
pub mod layers;
pub mod projection;
pub mod session;

pub use controller::MapController;
pub use geocoder::LocationResolver;
pub use session::{MapSession, MapSnapshot, SessionState, UpdateOutcome};

pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub default_center: Coordinate,
    /// Pixels kept between the fitted anchors and the closest viewport edge
    pub edge_margin: f64,
    pub tolerance: f64,
    pub geocode_timeout: Duration,
    pub tile_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            min_zoom: 3,
            max_zoom: 18,
            default_center: Coordinate::new(20., 0.),
            edge_margin: 40.,
            tolerance: 5.,
            geocode_timeout: Duration::from_secs(5),
            tile_url: DEFAULT_TILE_URL.to_string(),
        }
    }
}

impl MapConfig {
    pub fn validate(self) -> Result<Self, MapError> {
        if self.min_zoom > self.max_zoom {
            return Err(MapError::Config(format!("min_zoom {} is above max_zoom {}", self.min_zoom, self.max_zoom)));
        }
        if self.max_zoom > MAX_TILE_ZOOM {
            return Err(MapError::Config(format!("max_zoom {} is beyond the tile grid limit {MAX_TILE_ZOOM}", self.max_zoom)));
        }
        if !(self.edge_margin > 0.) || !(self.tolerance >= 0.) {
            return Err(MapError::Config("edge margin must be positive and tolerance non-negative".to_string()));
        }
        if !self.tile_url.contains("{z}") || !self.tile_url.contains("{x}") || !self.tile_url.contains("{y}") {
            return Err(MapError::Config(format!("tile url {} lacks {{z}}/{{x}}/{{y}} placeholders", self.tile_url)));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// A session entry point was called in a lifecycle state that does not allow it
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    Config(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidState { operation, state } => write!(f, "{operation} is not valid while the map is {state:?}"),
            MapError::Config(message) => write!(f, "Invalid map configuration: {message}"),
        }
    }
}

impl std::error::Error for MapError {}
