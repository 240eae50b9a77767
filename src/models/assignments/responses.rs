use serde::Serialize;
use ts_rs::TS;

use super::entities::Assignment;

/// 作业列表响应（数量有限，不分页）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
}
