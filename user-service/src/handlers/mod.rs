pub mod status;
pub mod users;

use service_core::error::AppError;

pub use status::{health_check, hello, metrics, root, stats};
pub use users::{create_user, delete_user, get_user, list_users, update_user};

/// Fallback for unknown paths and unsupported methods on known paths.
pub async fn not_found() -> AppError {
    AppError::RouteNotFound
}
