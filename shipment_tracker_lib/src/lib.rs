pub mod coordinate;
pub mod location;
pub mod shipment;
pub mod view;
