//! 学生、教师目录查询

use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::teachers::{Column as TeacherColumn, Entity as Teachers};
use crate::errors::{HWSystemError, Result};
use crate::models::directory::entities::{Student, Teacher};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

/// 通过用户 ID 获取学生
pub(super) async fn get_student_by_user_id_impl<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<Option<Student>> {
    let result = Students::find()
        .filter(StudentColumn::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| HWSystemError::database_operation(format!("查询学生失败: {e}")))?;

    Ok(result.map(|m| m.into_student()))
}

/// 通过用户 ID 获取教师
pub(super) async fn get_teacher_by_user_id_impl<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<Option<Teacher>> {
    let result = Teachers::find()
        .filter(TeacherColumn::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| HWSystemError::database_operation(format!("查询教师失败: {e}")))?;

    Ok(result.map(|m| m.into_teacher()))
}
