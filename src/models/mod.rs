pub mod assignments;
pub mod common;
pub mod directory;
pub mod principal;

pub use common::error_code::ErrorCode;
pub use common::response::ApiResponse;

// 应用启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
