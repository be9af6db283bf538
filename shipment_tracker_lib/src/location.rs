use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocationLabel {
    Origin,
    Current,
    Destination,
}

impl LocationLabel {
    /// Legend order
    pub const ALL: [LocationLabel; 3] = [LocationLabel::Origin, LocationLabel::Current, LocationLabel::Destination];

    pub fn color(&self) -> &'static str {
        match self {
            LocationLabel::Origin => "green",
            LocationLabel::Current => "blue",
            LocationLabel::Destination => "red",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            LocationLabel::Origin => "Origin",
            LocationLabel::Current => "Current",
            LocationLabel::Destination => "Destination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Traveled,
    Remaining,
}

impl SegmentKind {
    pub fn color(&self) -> &'static str {
        match self {
            SegmentKind::Traveled => "#22c55e",
            SegmentKind::Remaining => "#ef4444",
        }
    }

    /// Stroke dash pattern, `None` for a solid line
    pub fn dash_array(&self) -> Option<&'static str> {
        match self {
            SegmentKind::Traveled => None,
            SegmentKind::Remaining => Some("8, 8"),
        }
    }

    pub fn legend_text(&self) -> &'static str {
        match self {
            SegmentKind::Traveled => "Distance covered",
            SegmentKind::Remaining => "Distance to go",
        }
    }
}

/// A straight route piece between two resolved locations. Derived on every
/// update, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub from: Coordinate,
    pub to: Coordinate,
    pub kind: SegmentKind,
}

impl RouteSegment {
    pub fn new(from: Coordinate, to: Coordinate, kind: SegmentKind) -> Self {
        Self { from, to, kind }
    }

    pub fn length_km(&self) -> f64 {
        self.from.distance_km(&self.to)
    }
}
