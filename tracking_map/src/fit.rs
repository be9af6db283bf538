//! Center and zoom selection that keeps two anchor points a fixed number of
//! pixels away from the nearest viewport edge.
//!
//! Everything here is pure so it can be tested without a map behind it.

use shipment_tracker_lib::{coordinate::Coordinate, view::{ViewState, Viewport}};

use crate::{projection::container_point, MapConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub edge_margin: f64,
    pub tolerance: f64,
}

impl From<&MapConfig> for FitParams {
    fn from(config: &MapConfig) -> Self {
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            edge_margin: config.edge_margin,
            tolerance: config.tolerance,
        }
    }
}

impl FitParams {
    /// Upper bound on search steps: ceil(log2(range size)) + 2
    pub fn max_iterations(&self) -> u32 {
        let candidates = (self.max_zoom - self.min_zoom) as u32 + 1;
        candidates.next_power_of_two().trailing_zeros() + 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub zoom: u8,
    /// Smallest anchor-to-edge distance at `zoom`
    pub edge_distance: f64,
    pub iterations: u32,
    /// Whether `edge_distance` landed within tolerance of the margin
    pub exact: bool,
}

pub fn midpoint(p1: &Coordinate, p2: &Coordinate) -> Coordinate {
    p1.midpoint(p2)
}

/// Minimum distance from either point to any of the four viewport edges.
/// Negative when a point falls outside the viewport.
pub fn min_edge_distance(p1: &Coordinate, p2: &Coordinate, center: &Coordinate, zoom: u8, viewport: &Viewport) -> f64 {
    let a = container_point(p1, center, zoom, viewport);
    let b = container_point(p2, center, zoom, viewport);

    let left = a.x.min(b.x);
    let right = (viewport.width - a.x).min(viewport.width - b.x);
    let top = a.y.min(b.y);
    let bottom = (viewport.height - a.y).min(viewport.height - b.y);

    left.min(right).min(top).min(bottom)
}

/// Binary search over integer zooms. The edge distance shrinks as zoom grows,
/// so a distance below the margin means zoom out and above means zoom in.
/// Falls back to the visited zoom closest to the margin, preferring the lower
/// zoom on ties.
pub fn fit_zoom(p1: &Coordinate, p2: &Coordinate, viewport: &Viewport, params: &FitParams) -> FitResult {
    let center = midpoint(p1, p2);
    let max_iterations = params.max_iterations();

    let mut low = params.min_zoom as i32;
    let mut high = params.max_zoom as i32;
    let mut iterations = 0;
    let mut best: Option<(u8, f64)> = None;

    while low <= high && iterations < max_iterations {
        let zoom = ((low + high) / 2) as u8;
        let distance = min_edge_distance(p1, p2, &center, zoom, viewport);
        iterations += 1;

        let error = (distance - params.edge_margin).abs();
        if error <= params.tolerance {
            return FitResult { zoom, edge_distance: distance, iterations, exact: true };
        }

        best = match best {
            Some((best_zoom, best_distance)) => {
                let best_error = (best_distance - params.edge_margin).abs();
                if error < best_error || (error == best_error && zoom < best_zoom) {
                    Some((zoom, distance))
                } else {
                    Some((best_zoom, best_distance))
                }
            }
            None => Some((zoom, distance)),
        };

        if distance < params.edge_margin {
            high = zoom as i32 - 1;
        } else {
            low = zoom as i32 + 1;
        }
    }

    // The loop always runs at least once since min_zoom <= max_zoom
    let (zoom, edge_distance) = best.unwrap_or((params.min_zoom, f64::NAN));
    FitResult { zoom, edge_distance, iterations, exact: false }
}

pub fn fit_view(p1: &Coordinate, p2: &Coordinate, viewport: &Viewport, params: &FitParams) -> ViewState {
    let result = fit_zoom(p1, p2, viewport, params);
    ViewState::new(midpoint(p1, p2), result.zoom)
}
