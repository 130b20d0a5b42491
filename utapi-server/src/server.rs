use axum::http::{header, HeaderValue};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::service::{ServerError, ServiceState};
use crate::{constants, endpoints};

/// Builds the axum application with all routes and middleware.
pub fn make_app(state: ServiceState) -> axum::Router {
    let middleware = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(constants::SERVER),
        ))
        .layer(TraceLayer::new_for_http());

    endpoints::routes().layer(middleware).with_state(state)
}

/// Binds the configured listener and serves requests until shutdown.
pub async fn serve(state: ServiceState) -> Result<(), ServerError> {
    let addr = state.config().listen_addr()?;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    utapi_log::info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        utapi_log::error!(
            error = &error as &dyn std::error::Error,
            "failed to listen for shutdown signal"
        );
        return;
    }

    utapi_log::info!("shutting down HTTP server");
}
