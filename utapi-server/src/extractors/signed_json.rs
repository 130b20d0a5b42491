use axum::extract::{FromRequest, Request};
use axum::http::header;
use chrono::Utc;
use serde::de::DeserializeOwned;
use utapi_auth::{Authorization, SignableRequest};

use crate::constants::MAX_JSON_SIZE;
use crate::error::ApiError;
use crate::service::ServiceState;

/// A JSON request body whose AWS SigV4 signature has been verified against
/// the configured access keys.
///
/// Verification covers the method, path, query string, the signed headers,
/// and the body digest; only then is the body deserialized.
#[derive(Debug)]
pub struct SignedJson<T>(pub T);

impl<T: DeserializeOwned> FromRequest<ServiceState> for SignedJson<T> {
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &ServiceState) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::access_denied("missing authorization header"))?;
        let authorization = Authorization::parse(authorization)
            .map_err(|error| ApiError::access_denied(error.to_string()))?;

        let secret_key = state
            .secret_key(authorization.access_key)
            .ok_or_else(|| ApiError::access_denied("unknown access key"))?
            .to_owned();

        let body = axum::body::to_bytes(body, MAX_JSON_SIZE)
            .await
            .map_err(|_| ApiError::invalid_parameter_value("request body too large"))?;

        // Header names arrive lowercase from the http crate.
        let headers: Vec<(String, String)> = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();

        let signable = SignableRequest {
            method: parts.method.as_str(),
            path: parts.uri.path(),
            query: parts.uri.query().unwrap_or(""),
            headers: &headers,
            body: &body,
        };

        authorization
            .verify(&signable, &secret_key, Utc::now())
            .map_err(|error| {
                utapi_log::debug!(
                    access_key = authorization.access_key,
                    error = &error as &dyn std::error::Error,
                    "rejecting request signature"
                );
                ApiError::access_denied(error.to_string())
            })?;

        let inner = serde_json::from_slice(&body)
            .map_err(|error| ApiError::invalid_parameter_value(error.to_string()))?;

        Ok(SignedJson(inner))
    }
}
