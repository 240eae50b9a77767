//! 作业存储操作

use super::map_write_error;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{HWSystemError, Result};
use crate::models::assignments::entities::{Assignment, AssignmentState, NewAssignment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// 通过 ID 获取作业
pub(super) async fn get_assignment_by_id_impl<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Assignment>> {
    let result = Assignments::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| HWSystemError::database_operation(format!("查询作业失败: {e}")))?;

    result.map(|m| m.into_assignment()).transpose()
}

/// 插入新作业（草稿）
pub(super) async fn add_assignment_impl<C: ConnectionTrait>(
    db: &C,
    req: NewAssignment,
) -> Result<Assignment> {
    let now = chrono::Utc::now().timestamp();

    let model = ActiveModel {
        student_id: Set(req.student_id),
        teacher_id: Set(None),
        content: Set(req.content),
        grade: Set(None),
        state: Set(AssignmentState::Draft.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = model
        .insert(db)
        .await
        .map_err(|e| HWSystemError::database_operation(format!("创建作业失败: {e}")))?;

    result.into_assignment()
}

/// 保存作业，条件更新保证状态未被并发修改
pub(super) async fn save_assignment_impl<C: ConnectionTrait>(
    db: &C,
    assignment: &Assignment,
    observed_state: AssignmentState,
) -> Result<Assignment> {
    let now = chrono::Utc::now().timestamp();

    let model = ActiveModel {
        content: Set(assignment.content.clone()),
        teacher_id: Set(assignment.teacher_id),
        grade: Set(assignment.grade.map(|g| g.to_string())),
        state: Set(assignment.state.to_string()),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = Assignments::update_many()
        .set(model)
        .filter(Column::Id.eq(assignment.id))
        .filter(Column::State.eq(observed_state.to_string()))
        .exec(db)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                || {
                    format!(
                        "assignment {} was modified by a concurrent request",
                        assignment.id
                    )
                },
                "更新作业失败",
            )
        })?;

    if result.rows_affected == 0 {
        return Err(HWSystemError::invalid_state(format!(
            "assignment {} is no longer in {} state",
            assignment.id, observed_state
        )));
    }

    get_assignment_by_id_impl(db, assignment.id)
        .await?
        .ok_or_else(|| HWSystemError::not_found("No assignment with this id was found"))
}

/// 列出学生的全部作业
pub(super) async fn list_assignments_by_student_impl<C: ConnectionTrait>(
    db: &C,
    student_id: i64,
) -> Result<Vec<Assignment>> {
    let results = Assignments::find()
        .filter(Column::StudentId.eq(student_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| HWSystemError::database_operation(format!("查询作业列表失败: {e}")))?;

    results.into_iter().map(|m| m.into_assignment()).collect()
}

/// 列出提交给教师的全部作业
pub(super) async fn list_assignments_by_teacher_impl<C: ConnectionTrait>(
    db: &C,
    teacher_id: i64,
) -> Result<Vec<Assignment>> {
    let results = Assignments::find()
        .filter(Column::TeacherId.eq(teacher_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| HWSystemError::database_operation(format!("查询作业列表失败: {e}")))?;

    results.into_iter().map(|m| m.into_assignment()).collect()
}
