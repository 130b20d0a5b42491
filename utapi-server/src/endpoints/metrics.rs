//! The `ListMetrics` endpoint serving all three resource families.

use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use utapi_metrics::{Granularity, ListMetrics, ResourceMetrics, TimeRange};

use crate::constants::API_VERSION;
use crate::error::ApiError;
use crate::extractors::SignedJson;
use crate::service::ServiceState;

#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    #[serde(rename = "Action")]
    action: Option<String>,
    #[serde(rename = "Version")]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListMetricsRequest {
    buckets: Option<Vec<String>>,
    accounts: Option<Vec<String>>,
    #[serde(rename = "timeRange")]
    time_range: TimeRange,
}

/// Dispatches a `ListMetrics` request to the lister of the addressed family.
pub async fn handle(
    state: ServiceState,
    Path(family): Path<String>,
    Query(query): Query<ActionQuery>,
    SignedJson(body): SignedJson<ListMetricsRequest>,
) -> Result<Json<Vec<ResourceMetrics>>, ApiError> {
    let granularity: Granularity = family
        .parse()
        .map_err(|_| ApiError::invalid_uri(format!("unknown resource family: {family}")))?;

    match query.action.as_deref() {
        Some("ListMetrics") => {}
        Some(action) => {
            return Err(ApiError::invalid_action(format!(
                "unsupported action: {action}"
            )))
        }
        None => return Err(ApiError::invalid_action("missing Action parameter")),
    }
    if let Some(version) = query.version.as_deref() {
        if version != API_VERSION {
            return Err(ApiError::invalid_query_parameter(format!(
                "unsupported version: {version}"
            )));
        }
    }

    let range = body.time_range;
    if range.start > range.end {
        return Err(ApiError::invalid_parameter_value(
            "timeRange must be ascending",
        ));
    }

    let resources = match granularity {
        Granularity::Bucket => body.buckets.unwrap_or_default(),
        Granularity::Account => body.accounts.unwrap_or_default(),
        Granularity::Service => vec![state.config().component().to_owned()],
    };
    if resources.is_empty() {
        return Err(ApiError::invalid_parameter_value(format!(
            "no {family} to list metrics for"
        )));
    }

    let lister = ListMetrics::new(granularity, state.datastore().clone())
        .with_concurrency(state.config().list_concurrency());

    let records = lister
        .list(&resources, range)
        .await
        .map_err(|_| ApiError::internal_error())?;

    Ok(Json(records))
}
