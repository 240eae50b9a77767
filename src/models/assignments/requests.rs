use serde::Deserialize;
use ts_rs::TS;

use super::entities::Grade;

/// 创建或编辑草稿：不带 id 时新建
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct UpsertAssignmentRequest {
    pub id: Option<i64>,
    pub content: String,
}

/// 学生提交作业给指定教师
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct SubmitAssignmentRequest {
    pub id: i64,
    pub teacher_id: i64,
}

/// 教师评分
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct GradeAssignmentRequest {
    pub id: i64,
    pub grade: Grade,
}
