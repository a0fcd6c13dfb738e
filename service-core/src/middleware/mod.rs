pub mod error_detail;
pub mod metrics;
pub mod panic;
pub mod tracing;
