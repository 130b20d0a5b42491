//! Web server endpoints.

use axum::routing::{get, post};

use crate::service::ServiceState;

mod health_check;
mod metrics;

pub fn routes() -> axum::Router<ServiceState> {
    axum::Router::new()
        .route("/_/healthcheck", get(health_check::handle))
        .route("/{family}", post(metrics::handle))
}
