use serde::Serialize;
use shipment_tracker_lib::{
    coordinate::Coordinate,
    location::{LocationLabel, SegmentKind},
    view::ViewState,
};

use crate::{
    canvas::MapCanvas,
    fit::{fit_view, FitParams},
    geocoder::{LocationResolver, LocationSet},
    layers::{build_segments, legend, LegendEntry, Marker, MarkerLayer, RouteLayer, RoutePolyline},
    projection::{visible_tiles, TileSource},
    MapConfig, MapError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOutcome {
    /// The locations were drawn
    Applied,
    /// A newer request was issued while this one was resolving
    Stale,
    /// The session was unmounted while this one was resolving
    Discarded,
}

/// Location strings waiting to be geocoded, tagged with the sequence number of
/// the update that issued them.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRequest {
    sequence: u64,
    origin: String,
    current: Option<String>,
    destination: String,
}

impl LocationRequest {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub async fn resolve(self, resolver: &LocationResolver) -> ResolvedLocations {
        let locations = resolver.resolve_all(&self.origin, self.current.as_deref(), &self.destination).await;
        ResolvedLocations { request: self, locations }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocations {
    request: LocationRequest,
    locations: LocationSet,
}

impl ResolvedLocations {
    pub fn sequence(&self) -> u64 {
        self.request.sequence
    }

    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLegendEntry {
    pub kind: SegmentKind,
    pub text: &'static str,
    pub color: &'static str,
}

/// Serializable picture of everything a session currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    pub state: SessionState,
    pub view: ViewState,
    pub markers: Vec<Marker>,
    pub segments: Vec<RoutePolyline>,
    pub legend: Vec<LegendEntry>,
    pub route_legend: Vec<RouteLegendEntry>,
    pub tiles: Vec<String>,
}

/// One map canvas with its marker and route layers.
///
/// `Uninitialized -> mount -> Ready -> unmount -> Destroyed`. Updates are split
/// into `begin_update` and `apply` so that several can be resolving at once;
/// only the most recently issued one is ever drawn.
pub struct MapSession {
    config: MapConfig,
    state: SessionState,
    canvas: Option<Box<dyn MapCanvas>>,
    tiles: TileSource,
    markers: MarkerLayer,
    routes: RouteLayer,
    view: ViewState,
    legend: Vec<LegendEntry>,
    issued: u64,
}

impl MapSession {
    pub fn new(config: MapConfig) -> Result<Self, MapError> {
        let config = config.validate()?;
        let view = ViewState::new(config.default_center, config.min_zoom);
        let tiles = TileSource::new(config.tile_url.clone());

        Ok(Self {
            config,
            state: SessionState::Uninitialized,
            canvas: None,
            tiles,
            markers: MarkerLayer::default(),
            routes: RouteLayer::default(),
            view,
            legend: Vec::new(),
            issued: 0,
        })
    }

    pub fn mount(&mut self, canvas: impl MapCanvas + 'static) -> Result<(), MapError> {
        self.expect_state("mount", SessionState::Uninitialized)?;

        let mut canvas: Box<dyn MapCanvas> = Box::new(canvas);
        canvas.attach_tiles(&self.tiles);
        canvas.set_view(self.view, false);
        canvas.redraw(&self.markers, &self.routes);

        self.canvas = Some(canvas);
        self.state = SessionState::Ready;
        tracing::debug!("Map mounted at {:?}", self.view);
        Ok(())
    }

    /// Issues a new request. Any request issued earlier becomes stale.
    pub fn begin_update(&mut self, origin: &str, current: Option<&str>, destination: &str) -> Result<LocationRequest, MapError> {
        self.expect_state("update_locations", SessionState::Ready)?;

        self.issued += 1;
        Ok(LocationRequest {
            sequence: self.issued,
            origin: origin.to_string(),
            current: current.map(str::to_string),
            destination: destination.to_string(),
        })
    }

    pub fn apply(&mut self, resolved: ResolvedLocations) -> Result<UpdateOutcome, MapError> {
        match self.state {
            SessionState::Uninitialized => {
                return Err(MapError::InvalidState { operation: "apply", state: self.state });
            }
            SessionState::Destroyed => {
                tracing::debug!("Dropping locations for request {} after unmount", resolved.sequence());
                return Ok(UpdateOutcome::Discarded);
            }
            SessionState::Ready => {}
        }

        if resolved.sequence() != self.issued {
            tracing::debug!("Dropping stale request {}, latest is {}", resolved.sequence(), self.issued);
            return Ok(UpdateOutcome::Stale);
        }

        let ResolvedLocations { request, locations } = resolved;
        self.legend = legend(&request.origin, request.current.as_deref(), &request.destination);
        self.render(&locations);
        Ok(UpdateOutcome::Applied)
    }

    /// Begin, resolve and apply in one go
    pub async fn update_locations(&mut self, resolver: &LocationResolver, origin: &str, current: Option<&str>, destination: &str) -> Result<UpdateOutcome, MapError> {
        let request = self.begin_update(origin, current, destination)?;
        let resolved = request.resolve(resolver).await;
        self.apply(resolved)
    }

    pub fn unmount(&mut self) -> Result<(), MapError> {
        self.expect_state("unmount", SessionState::Ready)?;

        if let Some(mut canvas) = self.canvas.take() {
            canvas.release();
        }
        self.markers.clear();
        self.routes.clear();
        self.legend.clear();
        self.state = SessionState::Destroyed;
        tracing::debug!("Map unmounted");
        Ok(())
    }

    fn render(&mut self, locations: &LocationSet) {
        self.markers.clear();
        self.routes.clear();

        let labelled = [
            (LocationLabel::Origin, locations.origin),
            (LocationLabel::Current, locations.current),
            (LocationLabel::Destination, locations.destination),
        ];

        for (label, coord) in labelled {
            if let Some(coord) = coord {
                self.markers.place(label, coord);
            }
        }

        let segments = build_segments(locations.origin, locations.current, locations.destination);
        self.routes.redraw(&segments);

        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        canvas.redraw(&self.markers, &self.routes);

        let points: Vec<Coordinate> = labelled.iter().filter_map(|(_, coord)| *coord).collect();
        let Some((first, last)) = anchors(&points) else {
            return;
        };

        let viewport = canvas.viewport();
        let view = fit_view(&first, &last, &viewport, &FitParams::from(&self.config));

        // Cut to the new center first, then zoom
        canvas.set_view(ViewState::new(view.center, self.view.zoom), false);
        canvas.set_view(view, true);

        tracing::debug!("Fitted view {:?} for {} points", view, points.len());
        self.view = view;
    }

    fn expect_state(&self, operation: &'static str, expected: SessionState) -> Result<(), MapError> {
        if self.state != expected {
            return Err(MapError::InvalidState { operation, state: self.state });
        }
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn routes(&self) -> &RouteLayer {
        &self.routes
    }

    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn snapshot(&self) -> MapSnapshot {
        let tiles: Vec<String> = self.canvas
            .as_ref()
            .map(|canvas| visible_tiles(&self.view, &canvas.viewport()).iter().map(|tile| self.tiles.url(tile)).collect())
            .unwrap_or_default();

        MapSnapshot {
            state: self.state,
            view: self.view,
            markers: self.markers.markers().to_vec(),
            segments: self.routes.polylines().to_vec(),
            legend: self.legend.clone(),
            route_legend: [SegmentKind::Traveled, SegmentKind::Remaining]
                .into_iter()
                .map(|kind| RouteLegendEntry { kind, text: kind.legend_text(), color: kind.color() })
                .collect(),
            tiles,
        }
    }
}

/// First and last resolved point, or `None` when fewer than two distinct
/// points exist. If the first and last coincide the first differing point
/// takes the place of the last.
fn anchors(points: &[Coordinate]) -> Option<(Coordinate, Coordinate)> {
    let first = *points.first()?;
    let last = *points.last()?;

    if first != last {
        return Some((first, last));
    }

    points.iter().find(|point| **point != first).map(|other| (first, *other))
}
