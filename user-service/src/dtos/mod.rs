pub mod status;
pub mod users;

pub use status::{HealthResponse, ServiceInfo, StatsData};
pub use users::{CreateUserRequest, UpdateUserRequest, UserResponse};
