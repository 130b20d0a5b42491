//! HTTP endpoints and services of the UTAPI query API.
//!
//! The server exposes the signed `ListMetrics` endpoint for the three
//! resource families plus a health check, all built on top of the metric
//! engine in `utapi-metrics`.

mod constants;
mod endpoints;
mod error;
mod extractors;
mod server;
mod service;

pub use self::server::*;
pub use self::service::*;
