//! Uniform JSON response envelope shared by every endpoint.
//!
//! Successful and failed responses both serialize as
//! `{success, message, data?, count?, error?}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Placeholder sent in place of server-side error details.
pub const GENERIC_ERROR_DETAIL: &str = "Internal server error";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            count: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            count: None,
            error: None,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Fully detailed body of a server error, attached as a response extension.
///
/// The served body carries [`GENERIC_ERROR_DETAIL`]; the error-detail
/// middleware swaps this one in when running outside production.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub serde_json::Value);

/// Builds an error response from an envelope and an optional technical detail.
///
/// Client errors (4xx) always expose `detail`. Server errors expose the
/// generic placeholder and stash the detailed body in [`ErrorDetail`].
pub fn failure_response<T: Serialize>(
    status: StatusCode,
    envelope: ApiResponse<T>,
    detail: Option<String>,
) -> Response {
    let Some(detail) = detail else {
        return (status, Json(envelope)).into_response();
    };

    if !status.is_server_error() {
        return (status, Json(envelope.with_error(detail))).into_response();
    }

    let detailed = envelope.with_error(detail);
    let detailed_body = serde_json::to_value(&detailed).ok();
    let redacted = detailed.with_error(GENERIC_ERROR_DETAIL);

    let mut response = (status, Json(redacted)).into_response();
    if let Some(body) = detailed_body {
        response.extensions_mut().insert(ErrorDetail(body));
    }
    response
}
