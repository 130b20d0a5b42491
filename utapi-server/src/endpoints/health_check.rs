//! A simple health check endpoint for the query service.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::service::ServiceState;

#[derive(Serialize)]
struct Status {
    is_healthy: bool,
}

pub async fn handle(state: ServiceState) -> impl IntoResponse {
    match state.datastore().ping().await {
        Ok(()) => (StatusCode::OK, axum::Json(Status { is_healthy: true })),
        Err(error) => {
            utapi_log::warn!(
                error = &error as &dyn std::error::Error,
                "datastore did not answer health check"
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(Status { is_healthy: false }),
            )
        }
    }
}
