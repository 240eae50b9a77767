use serde::{Deserialize, Serialize};

/// `X-Principal` 请求头携带的身份声明
///
/// 只信任 `user_id`，学生/教师 ID 一律通过目录重新解析，
/// 调用方声明的其他字段会被忽略。
#[derive(Debug, Clone, Deserialize)]
pub struct PrincipalHeader {
    pub user_id: i64,
}

/// 当前请求的调用者身份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub student_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

impl Principal {
    pub fn is_student(&self) -> bool {
        self.student_id.is_some()
    }
}
