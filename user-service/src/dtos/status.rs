use crate::services::ConnectionState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    /// Seconds since the service started.
    pub uptime: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub success: bool,
    pub message: String,
    pub service: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub status: ConnectionState,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<u64>,
}
