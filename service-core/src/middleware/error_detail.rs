use crate::config::Environment;
use crate::response::ErrorDetail;
use axum::{
    Json,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Outside production, replaces redacted server-error bodies with the
/// detailed body recorded in [`ErrorDetail`].
pub async fn error_detail_middleware(
    State(environment): State<Environment>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;

    let Some(ErrorDetail(detailed)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };

    if environment.is_production() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let (_, body) = Json(detailed).into_response().into_parts();

    Response::from_parts(parts, body)
}
