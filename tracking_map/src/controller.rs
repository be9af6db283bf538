use std::{cell::RefCell, rc::Rc, sync::Arc};

use shipment_tracker_lib::view::ViewState;

use crate::{
    canvas::MapCanvas,
    geocoder::LocationResolver,
    session::{MapSession, MapSnapshot, SessionState, UpdateOutcome},
    MapConfig, MapError,
};

/// Single threaded handle to a map session. Clones share the session, and
/// overlapping `update_locations` calls may be awaited together; the session
/// is never borrowed across an await.
#[derive(Clone)]
pub struct MapController {
    session: Rc<RefCell<MapSession>>,
    resolver: Arc<LocationResolver>,
}

impl MapController {
    pub fn new(config: MapConfig, resolver: Arc<LocationResolver>) -> Result<Self, MapError> {
        Ok(Self {
            session: Rc::new(RefCell::new(MapSession::new(config)?)),
            resolver,
        })
    }

    pub fn mount(&self, canvas: impl MapCanvas + 'static) -> Result<(), MapError> {
        self.session.borrow_mut().mount(canvas)
    }

    pub async fn update_locations(&self, origin: &str, current: Option<&str>, destination: &str) -> Result<UpdateOutcome, MapError> {
        let request = self.session.borrow_mut().begin_update(origin, current, destination)?;
        let resolved = request.resolve(&self.resolver).await;
        self.session.borrow_mut().apply(resolved)
    }

    /// Safe while updates are still resolving; they complete as no-ops
    pub fn unmount(&self) -> Result<(), MapError> {
        self.session.borrow_mut().unmount()
    }

    pub fn state(&self) -> SessionState {
        self.session.borrow().state()
    }

    pub fn view(&self) -> ViewState {
        self.session.borrow().view()
    }

    pub fn snapshot(&self) -> MapSnapshot {
        self.session.borrow().snapshot()
    }
}
