use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::HWSystemError;

// API 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,

    // 作业错误 4xxx
    AssignmentInvalidState = 4001,
    AssignmentInvalidOwner = 4002,
}

impl ErrorCode {
    /// 将内部错误归类为对外错误码
    pub fn from_error(err: &HWSystemError) -> Self {
        match err {
            HWSystemError::NotFound(_) => ErrorCode::NotFound,
            HWSystemError::InvalidState(_) => ErrorCode::AssignmentInvalidState,
            HWSystemError::InvalidOwner(_) => ErrorCode::AssignmentInvalidOwner,
            HWSystemError::Authentication(_) => ErrorCode::Unauthorized,
            HWSystemError::DatabaseConfig(_)
            | HWSystemError::DatabaseConnection(_)
            | HWSystemError::DatabaseOperation(_) => ErrorCode::InternalServerError,
        }
    }
}
