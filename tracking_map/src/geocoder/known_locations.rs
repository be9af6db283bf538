use shipment_tracker_lib::coordinate::Coordinate;

const TABLE: &[(&str, f64, f64)] = &[
    ("new york, ny", 40.7128, -74.0060),
    ("new york", 40.7128, -74.0060),
    ("brooklyn", 40.6782, -73.9442),
    ("los angeles, ca", 34.0522, -118.2437),
    ("los angeles", 34.0522, -118.2437),
    ("chicago, il", 41.8781, -87.6298),
    ("chicago", 41.8781, -87.6298),
    ("houston, tx", 29.7604, -95.3698),
    ("houston", 29.7604, -95.3698),
    ("phoenix, az", 33.4484, -112.0740),
    ("phoenix", 33.4484, -112.0740),
    ("philadelphia, pa", 39.9526, -75.1652),
    ("philadelphia", 39.9526, -75.1652),
    ("san antonio, tx", 29.4241, -98.4936),
    ("san diego, ca", 32.7157, -117.1611),
    ("dallas, tx", 32.7767, -96.7970),
    ("dallas", 32.7767, -96.7970),
    ("san francisco, ca", 37.7749, -122.4194),
    ("san francisco", 37.7749, -122.4194),
    ("seattle, wa", 47.6062, -122.3321),
    ("seattle", 47.6062, -122.3321),
    ("denver, co", 39.7392, -104.9903),
    ("denver", 39.7392, -104.9903),
    ("boston, ma", 42.3601, -71.0589),
    ("boston", 42.3601, -71.0589),
    ("atlanta, ga", 33.7490, -84.3880),
    ("atlanta", 33.7490, -84.3880),
    ("miami, fl", 25.7617, -80.1918),
    ("miami", 25.7617, -80.1918),
    ("memphis, tn", 35.1495, -90.0490),
    ("memphis", 35.1495, -90.0490),
    ("louisville, ky", 38.2527, -85.7585),
    ("toronto", 43.6532, -79.3832),
    ("mexico city", 19.4326, -99.1332),
    ("london", 51.5074, -0.1278),
    ("paris", 48.8566, 2.3522),
    ("berlin", 52.5200, 13.4050),
    ("hamburg", 53.5511, 9.9937),
    ("rotterdam", 51.9244, 4.4777),
    ("copenhagen", 55.6761, 12.5683),
    ("aarhus", 56.1629, 10.2039),
    ("dubai", 25.2048, 55.2708),
    ("singapore", 1.3521, 103.8198),
    ("hong kong", 22.3193, 114.1694),
    ("shanghai", 31.2304, 121.4737),
    ("tokyo", 35.6762, 139.6503),
    ("sydney", -33.8688, 151.2093),
];

/// Static table of common location strings, consulted before any network lookup
#[derive(Debug, Clone)]
pub struct KnownLocations {
    entries: Vec<(String, Coordinate)>,
}

impl Default for KnownLocations {
    fn default() -> Self {
        Self::new(TABLE.iter().map(|(name, lat, lng)| (name.to_string(), Coordinate::new(*lat, *lng))))
    }
}

impl KnownLocations {
    pub fn new(entries: impl IntoIterator<Item = (String, Coordinate)>) -> Self {
        let mut entries: Vec<(String, Coordinate)> = entries
            .into_iter()
            .map(|(name, coord)| (normalize(&name), coord))
            .filter(|(name, _)| !name.is_empty())
            .collect();

        // Longest keys first so the most specific match wins
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Exact match first, then the longest known name contained in the text
    pub fn lookup(&self, text: &str) -> Option<Coordinate> {
        let text = normalize(text);
        if text.is_empty() {
            return None;
        }

        if let Some((_, coord)) = self.entries.iter().find(|(name, _)| *name == text) {
            return Some(*coord);
        }

        self.entries
            .iter()
            .find(|(name, _)| contains_phrase(&text, name))
            .map(|(_, coord)| *coord)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// `needle` occurs in `haystack` on word boundaries
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back().is_none_or(|c| !c.is_alphanumeric());
        let after = haystack[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
        before && after
    })
}
