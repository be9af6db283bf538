use serde::Serialize;
use shipment_tracker_lib::{
    coordinate::Coordinate,
    location::{LocationLabel, RouteSegment, SegmentKind},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub label: LocationLabel,
    pub position: Coordinate,
    pub color: &'static str,
    pub text: &'static str,
}

impl Marker {
    pub fn new(label: LocationLabel, position: Coordinate) -> Self {
        Self {
            label,
            position,
            color: label.color(),
            text: label.text(),
        }
    }
}

/// Holds at most one marker per label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn place(&mut self, label: LocationLabel, position: Coordinate) {
        self.markers.retain(|marker| marker.label != label);
        self.markers.push(Marker::new(label, position));
        self.markers.sort_by_key(|marker| marker.label);
    }

    pub fn get(&self, label: LocationLabel) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.label == label)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolylineStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub dash_array: Option<&'static str>,
}

impl From<SegmentKind> for PolylineStyle {
    fn from(kind: SegmentKind) -> Self {
        Self {
            color: kind.color(),
            weight: 2.5,
            opacity: 0.8,
            dash_array: kind.dash_array(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePolyline {
    pub segment: RouteSegment,
    pub style: PolylineStyle,
    pub length_km: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteLayer {
    polylines: Vec<RoutePolyline>,
}

impl RouteLayer {
    /// Replaces the whole layer in one go
    pub fn redraw(&mut self, segments: &[RouteSegment]) {
        self.polylines = segments
            .iter()
            .map(|segment| RoutePolyline {
                segment: *segment,
                style: segment.kind.into(),
                length_km: segment.length_km(),
            })
            .collect();
    }

    pub fn polylines(&self) -> &[RoutePolyline] {
        &self.polylines
    }

    pub fn segments(&self) -> Vec<RouteSegment> {
        self.polylines.iter().map(|polyline| polyline.segment).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    pub fn clear(&mut self) {
        self.polylines.clear();
    }
}

/// Traveled first, remaining second. The direct origin to destination line
/// only appears when the current location did not resolve.
pub fn build_segments(origin: Option<Coordinate>, current: Option<Coordinate>, destination: Option<Coordinate>) -> Vec<RouteSegment> {
    let mut segments = Vec::new();

    if let (Some(origin), Some(current)) = (origin, current) {
        segments.push(RouteSegment::new(origin, current, SegmentKind::Traveled));
    }

    if let (Some(current), Some(destination)) = (current, destination) {
        segments.push(RouteSegment::new(current, destination, SegmentKind::Remaining));
    }

    if let (None, Some(origin), Some(destination)) = (current, origin, destination) {
        segments.push(RouteSegment::new(origin, destination, SegmentKind::Remaining));
    }

    segments
}

/// Legend row shown beside the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: LocationLabel,
    pub text: &'static str,
    pub color: &'static str,
    pub location: String,
}

pub fn legend(origin: &str, current: Option<&str>, destination: &str) -> Vec<LegendEntry> {
    LocationLabel::ALL
        .iter()
        .zip([Some(origin), current, Some(destination)])
        .filter_map(|(label, location)| {
            let location = location?.trim();
            if location.is_empty() {
                return None;
            }
            Some(LegendEntry {
                label: *label,
                text: label.text(),
                color: label.color(),
                location: location.to_string(),
            })
        })
        .collect()
}
