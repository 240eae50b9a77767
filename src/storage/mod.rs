//! 存储层
//!
//! 作业生命周期只依赖这里定义的协作者 trait：
//! - `StudentDirectory` / `TeacherDirectory`：按用户 ID 解析学生、教师
//! - `AssignmentRepository`：作业的读取、插入、保存
//! - `UnitOfWork`：单个请求内的事务，提交前所有修改均不可见，丢弃即回滚

use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    assignments::entities::{Assignment, AssignmentState, NewAssignment},
    directory::entities::{Student, Teacher},
};

#[cfg(test)]
pub mod memory_storage;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait StudentDirectory: Send + Sync {
    // 通过用户ID获取学生
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>>;
}

#[async_trait::async_trait]
pub trait TeacherDirectory: Send + Sync {
    // 通过用户ID获取教师
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>>;
}

#[async_trait::async_trait]
pub trait AssignmentRepository: Send + Sync {
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 插入新作业，状态为 DRAFT
    async fn add_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    /// 保存作业的可变字段（content、teacher_id、grade、state）。
    ///
    /// 仅当库中该行仍处于 `observed_state` 时才写入；
    /// 否则说明有并发请求抢先迁移了状态，返回 `InvalidState`。
    async fn save_assignment(
        &self,
        assignment: &Assignment,
        observed_state: AssignmentState,
    ) -> Result<Assignment>;
    // 列出学生的作业（按插入顺序）
    async fn list_assignments_by_student(&self, student_id: i64) -> Result<Vec<Assignment>>;
    // 列出提交给教师的作业（按插入顺序）
    async fn list_assignments_by_teacher(&self, teacher_id: i64) -> Result<Vec<Assignment>>;
}

/// 请求级事务
#[async_trait::async_trait]
pub trait UnitOfWork: AssignmentRepository + StudentDirectory + TeacherDirectory {
    async fn commit(self: Box<Self>) -> Result<()>;
}

#[async_trait::async_trait]
pub trait Storage: StudentDirectory + TeacherDirectory {
    // 开启新的事务
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
