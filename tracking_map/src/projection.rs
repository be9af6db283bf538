use std::f64::consts::PI;

use serde::Serialize;
use shipment_tracker_lib::{coordinate::Coordinate, view::{ViewState, Viewport}};

pub const TILE_SIZE: f64 = 256.;
pub const MAX_LATITUDE: f64 = 85.0511287798;
/// Deepest zoom whose tile indices still fit the `u32` tile grid
pub const MAX_TILE_ZOOM: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Width and height of the whole world in pixels at the given zoom
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Spherical Web Mercator, origin at the top left of the world
pub fn project(coord: &Coordinate, zoom: u8) -> PixelPoint {
    let size = world_size(zoom);
    let lat = coord.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();

    let x = (coord.longitude + 180.) / 360.;
    let y = 0.5 - f64::ln(f64::tan(PI / 4. + lat / 2.)) / (2. * PI);

    PixelPoint { x: x * size, y: y * size }
}

pub fn unproject(point: PixelPoint, zoom: u8) -> Coordinate {
    let size = world_size(zoom);
    let longitude = point.x / size * 360. - 180.;
    let n = PI - 2. * PI * point.y / size;
    let latitude = f64::atan(f64::sinh(n)).to_degrees();
    Coordinate::new(latitude, longitude)
}

/// Position of `coord` inside a viewport showing `center` at `zoom`
pub fn container_point(coord: &Coordinate, center: &Coordinate, zoom: u8, viewport: &Viewport) -> PixelPoint {
    let point = project(coord, zoom);
    let origin = project(center, zoom);

    PixelPoint {
        x: point.x - origin.x + viewport.width / 2.,
        y: point.y - origin.y + viewport.height / 2.,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

pub fn tile_for(coord: &Coordinate, zoom: u8) -> TileId {
    let point = project(coord, zoom);
    let max_index = (1u32 << zoom) - 1;

    TileId {
        z: zoom,
        x: ((point.x / TILE_SIZE).floor().max(0.) as u32).min(max_index),
        y: ((point.y / TILE_SIZE).floor().max(0.) as u32).min(max_index),
    }
}

/// Base map imagery addressed by `{z}/{x}/{y}`
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    template: String,
}

impl TileSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn url(&self, tile: &TileId) -> String {
        self.template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

/// Every tile intersecting the viewport. Columns wrap around the antimeridian,
/// rows outside the world are skipped.
pub fn visible_tiles(view: &ViewState, viewport: &Viewport) -> Vec<TileId> {
    let center = project(&view.center, view.zoom);
    let count = 1i64 << view.zoom;

    let min_x = ((center.x - viewport.width / 2.) / TILE_SIZE).floor() as i64;
    let max_x = ((center.x + viewport.width / 2.) / TILE_SIZE).ceil() as i64 - 1;
    let min_y = (((center.y - viewport.height / 2.) / TILE_SIZE).floor() as i64).max(0);
    let max_y = ((((center.y + viewport.height / 2.) / TILE_SIZE).ceil() as i64) - 1).min(count - 1);

    let mut tiles = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let tile = TileId {
                z: view.zoom,
                x: x.rem_euclid(count) as u32,
                y: y as u32,
            };
            if !tiles.contains(&tile) {
                tiles.push(tile);
            }
        }
    }
    tiles
}
