use crate::error::AppError;
use axum::response::{IntoResponse, Response};
use std::any::Any;

/// Last-resort responder for `tower_http::catch_panic::CatchPanicLayer`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    AppError::InternalError(anyhow::anyhow!(detail)).into_response()
}
