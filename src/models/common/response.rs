use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::HWSystemError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 由内部错误构造失败响应，消息沿用错误详情
    pub fn from_error(err: &HWSystemError) -> Self {
        Self::error_empty(ErrorCode::from_error(err), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_error_keeps_message_and_code() {
        let resp = ApiResponse::from_error(&HWSystemError::invalid_owner(
            "This assignment belongs to some other student",
        ));
        assert_eq!(resp.code, ErrorCode::AssignmentInvalidOwner as i32);
        assert_eq!(resp.message, "This assignment belongs to some other student");
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_empty_data_is_not_serialized() {
        let resp = ApiResponse::error_empty(ErrorCode::NotFound, "missing");
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["code"], 1004);
    }
}
