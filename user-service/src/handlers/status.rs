use crate::dtos::{HealthResponse, ServiceInfo, StatsData};
use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use service_core::response::{failure_response, ApiResponse};

pub const SERVICE_NAME: &str = "user-service";

const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "GET /metrics",
    "GET /api/hello",
    "GET /api/stats",
    "GET /api/users",
    "POST /api/users",
    "GET /api/users/:id",
    "PUT /api/users/:id",
    "DELETE /api/users/:id",
];

pub async fn root() -> impl IntoResponse {
    Json(ServiceInfo {
        success: true,
        message: "Welcome to the User Service API".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// Liveness only; never touches the store.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK".to_string(),
            message: "Service is healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            uptime: state.started_at.elapsed().as_secs_f64(),
        }),
    )
}

pub async fn hello() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Hello from the User Service!",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.store.connection_state().await;
    let database = state.store.name().to_string();

    match state.store.count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(
                ApiResponse::success("Database statistics retrieved successfully").with_data(
                    StatsData {
                        status,
                        database,
                        user_count: Some(count),
                    },
                ),
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(status = ?status, error = %e, "Failed to collect database statistics");
            failure_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::failure("Error fetching database statistics").with_data(StatsData {
                    status,
                    database,
                    user_count: None,
                }),
                Some(e.to_string()),
            )
        }
    }
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
