use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// An API error answered as a JSON `{"code", "message"}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ApiErrorBody<'a> {
    code: &'static str,
    message: &'a str,
}

impl ApiError {
    /// The request path does not name a known resource family.
    pub fn invalid_uri(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "InvalidURI",
            message: message.into(),
        }
    }

    /// The `Action` query parameter is missing or unknown.
    pub fn invalid_action(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "InvalidAction",
            message: message.into(),
        }
    }

    /// A query parameter carries an unsupported value.
    pub fn invalid_query_parameter(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "InvalidQueryParameter",
            message: message.into(),
        }
    }

    /// The request body is malformed or inconsistent.
    pub fn invalid_parameter_value(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "InvalidParameterValue",
            message: message.into(),
        }
    }

    /// The request failed signature verification.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "AccessDenied",
            message: message.into(),
        }
    }

    /// An opaque server-side failure.
    pub fn internal_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "InternalError",
            message: "We encountered an internal error. Please try again.".to_owned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            code: self.code,
            message: &self.message,
        };

        (self.status, axum::Json(&body)).into_response()
    }
}
