use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shipment_tracker_lib::shipment::ApiResponse;
use thiserror::Error;
use tracking_map::MapError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Shipment service failed: {0}")]
    Upstream(String),

    #[error("Map error: {0}")]
    Map(#[from] MapError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Map { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("{self}");
        }

        (status, Json(ApiResponse::<()>::failure(self.to_string()))).into_response()
    }
}
