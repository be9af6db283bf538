use std::sync::Arc;

use tracking_map::{LocationResolver, MapConfig};

use crate::shipment_client::ShipmentClient;

pub struct ServerState {
    pub map_config: MapConfig,
    pub resolver: Arc<LocationResolver>,
    pub shipments: ShipmentClient,
}
