use std::{collections::HashMap, fmt, time::Duration};

use async_trait::async_trait;
use shipment_tracker_lib::coordinate::Coordinate;
use tokio::{sync::Mutex, time::timeout};

use crate::MapConfig;

mod known_locations;
mod nominatim;

pub use known_locations::KnownLocations;
pub use nominatim::{NominatimGeocoder, DEFAULT_BASE_URL};

use known_locations::normalize;

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeError {
    Backend(String),
    Malformed(String),
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeError::Backend(message) => write!(f, "Geocoding backend failed: {message}"),
            GeocodeError::Malformed(message) => write!(f, "Malformed geocoding result: {message}"),
        }
    }
}

impl std::error::Error for GeocodeError {}

/// A backend turning free text into a position. `Ok(None)` means the backend
/// answered but knows no such place.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Coordinates for one origin/current/destination triple
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationSet {
    pub origin: Option<Coordinate>,
    pub current: Option<Coordinate>,
    pub destination: Option<Coordinate>,
}

/// Never fails: anything that cannot be resolved in time comes back as `None`.
pub struct LocationResolver {
    known: KnownLocations,
    backend: Option<Box<dyn Geocoder>>,
    lookup_timeout: Duration,
    cache: Mutex<HashMap<String, Option<Coordinate>>>,
}

impl LocationResolver {
    pub fn new(known: KnownLocations, backend: Option<Box<dyn Geocoder>>, lookup_timeout: Duration) -> Self {
        Self {
            known,
            backend,
            lookup_timeout,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Bounds every backend lookup by the map's geocode timeout
    pub fn from_config(known: KnownLocations, backend: Option<Box<dyn Geocoder>>, config: &MapConfig) -> Self {
        Self::new(known, backend, config.geocode_timeout)
    }

    /// Static table only, no network
    pub fn offline() -> Self {
        Self::from_config(KnownLocations::default(), None, &MapConfig::default())
    }

    pub async fn resolve(&self, text: &str) -> Option<Coordinate> {
        let key = normalize(text);
        if key.is_empty() {
            return None;
        }

        if let Some(coord) = self.known.lookup(&key) {
            return Some(coord);
        }

        let backend = self.backend.as_ref()?;

        if let Some(cached) = self.cache.lock().await.get(&key) {
            return *cached;
        }

        match timeout(self.lookup_timeout, backend.lookup(text.trim())).await {
            Ok(Ok(result)) => {
                if result.is_none() {
                    tracing::info!("No geocoding result for \"{}\"", text.trim());
                }
                self.cache.lock().await.insert(key, result);
                result
            }
            Ok(Err(err)) => {
                tracing::warn!("Geocoding \"{}\" failed: {}", text.trim(), err);
                None
            }
            Err(_) => {
                tracing::warn!("Geocoding \"{}\" timed out after {:?}", text.trim(), self.lookup_timeout);
                None
            }
        }
    }

    /// The three lookups run concurrently and all of them settle
    pub async fn resolve_all(&self, origin: &str, current: Option<&str>, destination: &str) -> LocationSet {
        let (origin, current, destination) = tokio::join!(
            self.resolve(origin),
            async {
                match current {
                    Some(current) => self.resolve(current).await,
                    None => None,
                }
            },
            self.resolve(destination),
        );

        LocationSet { origin, current, destination }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use tokio::time::Instant;

    use super::{testing::ScriptedGeocoder, *};

    const LYON: Coordinate = Coordinate::new(45.7640, 4.8357);
    const OSLO: Coordinate = Coordinate::new(59.9139, 10.7522);

    fn resolver(geocoder: ScriptedGeocoder, timeout_ms: u64) -> LocationResolver {
        LocationResolver::new(KnownLocations::empty(), Some(Box::new(geocoder)), Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn blank_input_skips_lookup() {
        let geocoder = ScriptedGeocoder::new(&[]);
        let calls = geocoder.calls.clone();
        let resolver = resolver(geocoder, 100);

        assert_eq!(resolver.resolve("").await, None);
        assert_eq!(resolver.resolve("  \t ").await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn static_table_wins_over_backend() {
        let geocoder = ScriptedGeocoder::new(&[]);
        let calls = geocoder.calls.clone();
        let resolver = LocationResolver::new(KnownLocations::default(), Some(Box::new(geocoder)), Duration::from_secs(1));

        assert!(resolver.resolve("Chicago, IL").await.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn offline_resolver_gives_up_on_unknowns() {
        let resolver = LocationResolver::offline();
        assert_eq!(resolver.resolve("Somewhere Unmapped 42").await, None);
        assert!(resolver.resolve("Los Angeles, CA").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_unresolved() {
        let resolver = resolver(ScriptedGeocoder::new(&[("Lyon", 10_000, Some(LYON))]), 500);
        assert_eq!(resolver.resolve("Lyon").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn config_timeout_bounds_lookups() {
        let config = MapConfig {
            geocode_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let geocoder = ScriptedGeocoder::new(&[("Lyon", 100, Some(LYON)), ("Oslo", 300, Some(OSLO))]);
        let resolver = LocationResolver::from_config(KnownLocations::empty(), Some(Box::new(geocoder)), &config);

        assert_eq!(resolver.resolve("Lyon").await, Some(LYON));
        assert_eq!(resolver.resolve("Oslo").await, None);
    }

    #[tokio::test]
    async fn backend_errors_degrade_to_none() {
        let resolver = resolver(ScriptedGeocoder::new(&[]), 100);
        assert_eq!(resolver.resolve("Nowhere").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn answers_are_cached() {
        let geocoder = ScriptedGeocoder::new(&[("Lyon", 50, Some(LYON)), ("Atlantis", 50, None)]);
        let calls = geocoder.calls.clone();
        let resolver = resolver(geocoder, 1_000);

        assert_eq!(resolver.resolve("Lyon").await, Some(LYON));
        assert_eq!(resolver.resolve(" lyon ").await, Some(LYON));
        assert_eq!(resolver.resolve("Atlantis").await, None);
        assert_eq!(resolver.resolve("Atlantis").await, None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_run_concurrently() {
        let resolver = resolver(
            ScriptedGeocoder::new(&[("Lyon", 300, Some(LYON)), ("Oslo", 300, Some(OSLO)), ("Atlantis", 300, None)]),
            1_000,
        );

        let start = Instant::now();
        let set = resolver.resolve_all("Lyon", Some("Atlantis"), "Oslo").await;

        assert_eq!(set, LocationSet { origin: Some(LYON), current: None, destination: Some(OSLO) });
        assert!(start.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn one_slow_lookup_does_not_block_the_rest() {
        let resolver = resolver(ScriptedGeocoder::new(&[("Lyon", 10, Some(LYON)), ("Oslo", 60_000, Some(OSLO))]), 2_000);

        let start = Instant::now();
        let set = resolver.resolve_all("Lyon", None, "Oslo").await;

        assert_eq!(set.origin, Some(LYON));
        assert_eq!(set.destination, None);
        assert!(start.elapsed() <= Duration::from_millis(2_100));
    }
}
