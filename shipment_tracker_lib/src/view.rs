use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// The map camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: Coordinate,
    pub zoom: u8,
}

impl ViewState {
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        Self { center, zoom }
    }
}

/// Pixel size of the render target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
