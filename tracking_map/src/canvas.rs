use std::sync::{Arc, Mutex};

use shipment_tracker_lib::view::{ViewState, Viewport};

use crate::{
    layers::{MarkerLayer, RouteLayer},
    projection::TileSource,
};

/// The rendering substrate a map session draws on
pub trait MapCanvas: Send {
    /// Current pixel size of the render target
    fn viewport(&self) -> Viewport;

    fn attach_tiles(&mut self, tiles: &TileSource);

    fn set_view(&mut self, view: ViewState, animate: bool);

    /// Replace everything drawn on top of the base tiles
    fn redraw(&mut self, markers: &MarkerLayer, routes: &RouteLayer);

    fn release(&mut self);
}

/// What a headless canvas has been asked to do so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasLog {
    pub tile_template: Option<String>,
    pub views: Vec<(ViewState, bool)>,
    pub redraws: usize,
    pub markers_drawn: usize,
    pub segments_drawn: usize,
    pub released: bool,
    /// Calls that arrived after release
    pub calls_after_release: usize,
}

/// In-memory canvas with a fixed viewport. Cloning shares the log, so a test
/// can keep a handle after giving the canvas to a session.
#[derive(Debug, Clone)]
pub struct HeadlessCanvas {
    viewport: Viewport,
    log: Arc<Mutex<CanvasLog>>,
}

impl HeadlessCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            log: Arc::new(Mutex::new(CanvasLog::default())),
        }
    }

    pub fn log(&self) -> CanvasLog {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, f: impl FnOnce(&mut CanvasLog)) {
        let mut log = match self.log.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        if log.released {
            log.calls_after_release += 1;
            return;
        }
        f(&mut log);
    }
}

impl MapCanvas for HeadlessCanvas {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn attach_tiles(&mut self, tiles: &TileSource) {
        self.record(|log| log.tile_template = Some(tiles.template().to_string()));
    }

    fn set_view(&mut self, view: ViewState, animate: bool) {
        self.record(|log| log.views.push((view, animate)));
    }

    fn redraw(&mut self, markers: &MarkerLayer, routes: &RouteLayer) {
        self.record(|log| {
            log.redraws += 1;
            log.markers_drawn = markers.len();
            log.segments_drawn = routes.polylines().len();
        });
    }

    fn release(&mut self) {
        self.record(|log| log.released = true);
    }
}
