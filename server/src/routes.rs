use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shipment_tracker_lib::{
    coordinate::Coordinate,
    shipment::{ApiResponse, TrackingEvent},
};
use tower_http::trace::TraceLayer;
use tracking_map::{canvas::HeadlessCanvas, MapSession, MapSnapshot};

use crate::{error::AppError, server_state::ServerState};

const DEFAULT_WIDTH: f64 = 600.;
const DEFAULT_HEIGHT: f64 = 300.;
const MAX_SIDE: f64 = 8192.;

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/geocode", get(get_geocode))
        .route("/map", get(get_map))
        .route("/tracking/{shipment_id}/map", get(get_tracking_map))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub q: String,
}

pub async fn get_geocode(State(state): State<Arc<ServerState>>, Query(query): Query<GeocodeQuery>) -> Result<Json<ApiResponse<Coordinate>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::BadRequest("Query text is required".to_string()));
    }

    match state.resolver.resolve(&query.q).await {
        Some(coord) => Ok(Json(ApiResponse::ok(coord))),
        None => Err(AppError::NotFound(format!("No location found for \"{}\"", query.q.trim()))),
    }
}

#[derive(Debug, Deserialize)]
pub struct CanvasSize {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl CanvasSize {
    fn canvas(&self) -> Result<HeadlessCanvas, AppError> {
        let width = self.width.unwrap_or(DEFAULT_WIDTH);
        let height = self.height.unwrap_or(DEFAULT_HEIGHT);

        for side in [width, height] {
            if !(side > 0. && side <= MAX_SIDE) {
                return Err(AppError::BadRequest(format!("Canvas sides must be within (0, {MAX_SIDE}]")));
            }
        }
        Ok(HeadlessCanvas::new(width, height))
    }
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    #[serde(default)]
    pub origin: String,
    pub current: Option<String>,
    #[serde(default)]
    pub destination: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

pub async fn get_map(State(state): State<Arc<ServerState>>, Query(query): Query<MapQuery>) -> Result<Json<MapSnapshot>, AppError> {
    let size = CanvasSize { width: query.width, height: query.height };
    let snapshot = render_map(&state, &size, &query.origin, query.current.as_deref(), &query.destination).await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingMap {
    pub tracking_number: String,
    pub status: String,
    pub timeline: Vec<TrackingEvent>,
    pub map: MapSnapshot,
}

pub async fn get_tracking_map(
    State(state): State<Arc<ServerState>>,
    Path(shipment_id): Path<String>,
    Query(size): Query<CanvasSize>,
) -> Result<Response, AppError> {
    let shipment = state.shipments.get_shipment(&shipment_id).await?;
    tracing::debug!("Rendering map for shipment {}", shipment.tracking_number);

    let map = render_map(&state, &size, &shipment.origin, shipment.whereabouts(), &shipment.destination).await?;

    let tracking = TrackingMap {
        status: shipment.status().to_string(),
        timeline: shipment.timeline().into_iter().cloned().collect(),
        tracking_number: shipment.tracking_number,
        map,
    };

    Ok(Json(ApiResponse::ok(tracking)).into_response())
}

async fn render_map(state: &ServerState, size: &CanvasSize, origin: &str, current: Option<&str>, destination: &str) -> Result<MapSnapshot, AppError> {
    let canvas = size.canvas()?;

    let mut session = MapSession::new(state.map_config.clone())?;
    session.mount(canvas)?;
    session.update_locations(&state.resolver, origin, current, destination).await?;

    let snapshot = session.snapshot();
    session.unmount()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{http::StatusCode, response::Html};
    use shipment_tracker_lib::location::{LocationLabel, SegmentKind};
    use tokio::net::TcpListener;
    use tracking_map::{LocationResolver, MapConfig, SessionState};

    use super::*;
    use crate::shipment_client::ShipmentClient;

    fn state(shipment_api_url: &str) -> Arc<ServerState> {
        Arc::new(ServerState {
            map_config: MapConfig::default(),
            resolver: Arc::new(LocationResolver::offline()),
            shipments: ShipmentClient::new(shipment_api_url).unwrap(),
        })
    }

    fn map_query(origin: &str, current: Option<&str>, destination: &str) -> MapQuery {
        MapQuery {
            origin: origin.to_string(),
            current: current.map(str::to_string),
            destination: destination.to_string(),
            width: None,
            height: None,
        }
    }

    /// Serves a fixed shipment the way the shipment API does
    async fn fake_shipment_api() -> String {
        async fn tracking(Path(id): Path<String>) -> Response {
            if id == "gone" {
                return (StatusCode::NOT_FOUND, Html("<html><body>Not Found</body></html>")).into_response();
            }
            if id != "clx1" {
                let body = serde_json::json!({ "success": false, "message": "Shipment not found" });
                return (StatusCode::NOT_FOUND, Json(body)).into_response();
            }
            Json(serde_json::json!({
                "success": true,
                "data": {
                    "id": "clx1",
                    "trackingNumber": "AWB746456",
                    "origin": "123 Shipping Lane, New York, NY 10001",
                    "destination": "456 Delivery Road, Los Angeles, CA 90001",
                    "location": "Sort facility in New York",
                    "currentLocation": "Chicago, IL",
                    "events": [
                        { "status": "Picked Up", "description": "", "location": "Brooklyn Warehouse", "timestamp": "2024-03-01T10:00:00Z" },
                        { "status": "In Transit", "description": "", "location": "Chicago, IL", "timestamp": "2024-03-03T10:00:00Z" }
                    ]
                }
            }))
            .into_response()
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/api/tracking/{id}", get(tracking));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn geocode_known_and_unknown() {
        let state = state("http://localhost:1");

        let Json(found) = get_geocode(State(state.clone()), Query(GeocodeQuery { q: "Boston, MA".into() })).await.unwrap();
        assert!(found.success);
        assert_eq!(found.data, Some(Coordinate::new(42.3601, -71.0589)));

        let missing = get_geocode(State(state.clone()), Query(GeocodeQuery { q: "Atlantis".into() })).await.unwrap_err();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let blank = get_geocode(State(state), Query(GeocodeQuery { q: " ".into() })).await.unwrap_err();
        assert_eq!(blank.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn map_for_origin_and_destination() {
        let state = state("http://localhost:1");

        let Json(snapshot) = get_map(State(state), Query(map_query("New York, NY", None, "Los Angeles, CA"))).await.unwrap();

        assert_eq!(snapshot.state, SessionState::Ready);
        assert_eq!(snapshot.markers.len(), 2);
        assert_eq!(snapshot.segments.len(), 1);
        assert_eq!(snapshot.segments[0].segment.kind, SegmentKind::Remaining);
        assert_eq!(snapshot.view.zoom, 4);
    }

    #[tokio::test]
    async fn rejects_silly_canvas() {
        let state = state("http://localhost:1");
        let mut query = map_query("New York, NY", None, "Los Angeles, CA");
        query.width = Some(0.);

        let err = get_map(State(state), Query(query)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn tracking_map_from_shipment_api() {
        let state = state(&fake_shipment_api().await);

        let response = get_tracking_map(State(state), Path("clx1".to_string()), Query(CanvasSize { width: Some(800.), height: Some(400.) }))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let data = &json["data"];

        assert_eq!(data["trackingNumber"], "AWB746456");
        assert_eq!(data["status"], "In Transit");
        assert_eq!(data["timeline"][0]["status"], "In Transit");
        assert_eq!(data["map"]["markers"].as_array().map(Vec::len), Some(3));
        assert_eq!(data["map"]["segments"].as_array().map(Vec::len), Some(2));
        assert_eq!(data["map"]["legend"][1]["label"], serde_json::json!(LocationLabel::Current));
    }

    #[tokio::test]
    async fn unknown_shipment_is_not_found() {
        let state = state(&fake_shipment_api().await);

        let err = get_tracking_map(State(state), Path("nope".to_string()), Query(CanvasSize { width: None, height: None }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref message) if message == "Shipment not found"));
    }

    #[tokio::test]
    async fn html_not_found_page_is_not_found() {
        let state = state(&fake_shipment_api().await);

        let err = get_tracking_map(State(state), Path("gone".to_string()), Query(CanvasSize { width: None, height: None }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref message) if message == "Shipment gone not found"));
    }

    #[tokio::test]
    async fn traversal_in_shipment_id_stays_in_tracking_route() {
        let state = state(&fake_shipment_api().await);

        // Would reach the clx1 record if the slashes were not escaped
        let err = get_tracking_map(State(state), Path("../tracking/clx1".to_string()), Query(CanvasSize { width: None, height: None }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unreachable_shipment_api() {
        let state = state("http://127.0.0.1:9");

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            get_tracking_map(State(state), Path("clx1".to_string()), Query(CanvasSize { width: None, height: None })),
        )
        .await
        .unwrap();
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
