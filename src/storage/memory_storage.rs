//! 测试用内存存储
//!
//! 每个 `UnitOfWork` 在自己的状态快照上读写，并记录写操作日志。
//! `commit` 时在共享状态上重放日志：保存操作要求行仍处于观察到的状态，
//! 否则整个事务失败且共享状态不变。未提交即丢弃的事务不会留下任何修改。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::{HWSystemError, Result};
use crate::models::{
    assignments::entities::{Assignment, AssignmentState, NewAssignment},
    directory::entities::{Student, Teacher},
};
use crate::storage::{AssignmentRepository, Storage, StudentDirectory, TeacherDirectory, UnitOfWork};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    assignments: Vec<Assignment>,
    last_assignment_id: i64,
}

impl MemoryState {
    fn student(&self, user_id: i64) -> Option<Student> {
        self.students.iter().find(|s| s.user_id == user_id).cloned()
    }

    fn teacher(&self, user_id: i64) -> Option<Teacher> {
        self.teachers.iter().find(|t| t.user_id == user_id).cloned()
    }

    fn apply_save(
        &mut self,
        assignment: &Assignment,
        observed_state: AssignmentState,
    ) -> Result<Assignment> {
        let row = self
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment.id && a.state == observed_state)
            .ok_or_else(|| {
                HWSystemError::invalid_state(format!(
                    "assignment {} is no longer in {} state",
                    assignment.id, observed_state
                ))
            })?;
        row.content = assignment.content.clone();
        row.teacher_id = assignment.teacher_id;
        row.grade = assignment.grade;
        row.state = assignment.state;
        row.updated_at = assignment.updated_at;
        Ok(row.clone())
    }
}

#[derive(Debug, Clone)]
enum Write {
    Insert(Assignment),
    Save {
        assignment: Assignment,
        observed_state: AssignmentState,
    },
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(self, user_id: i64, student_id: i64) -> Self {
        let now = chrono::Utc::now();
        self.state.lock().unwrap().students.push(Student {
            id: student_id,
            user_id,
            created_at: now,
            updated_at: now,
        });
        self
    }

    pub fn with_teacher(self, user_id: i64, teacher_id: i64) -> Self {
        let now = chrono::Utc::now();
        self.state.lock().unwrap().teachers.push(Teacher {
            id: teacher_id,
            user_id,
            created_at: now,
            updated_at: now,
        });
        self
    }

    /// 已提交的作业快照
    pub fn assignment(&self, id: i64) -> Option<Assignment> {
        let state = self.state.lock().unwrap();
        state.assignments.iter().find(|a| a.id == id).cloned()
    }

    pub fn assignment_count(&self) -> usize {
        self.state.lock().unwrap().assignments.len()
    }
}

#[async_trait]
impl StudentDirectory for MemoryStorage {
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        Ok(self.state.lock().unwrap().student(user_id))
    }
}

#[async_trait]
impl TeacherDirectory for MemoryStorage {
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>> {
        Ok(self.state.lock().unwrap().teacher(user_id))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let snapshot = self.state.lock().unwrap().clone();
        Ok(Box::new(MemoryUnitOfWork {
            shared: self.state.clone(),
            staged: Mutex::new(snapshot),
            journal: Mutex::new(Vec::new()),
        }))
    }
}

pub struct MemoryUnitOfWork {
    shared: Arc<Mutex<MemoryState>>,
    staged: Mutex<MemoryState>,
    journal: Mutex<Vec<Write>>,
}

#[async_trait]
impl StudentDirectory for MemoryUnitOfWork {
    async fn get_student_by_user_id(&self, user_id: i64) -> Result<Option<Student>> {
        Ok(self.staged.lock().unwrap().student(user_id))
    }
}

#[async_trait]
impl TeacherDirectory for MemoryUnitOfWork {
    async fn get_teacher_by_user_id(&self, user_id: i64) -> Result<Option<Teacher>> {
        Ok(self.staged.lock().unwrap().teacher(user_id))
    }
}

#[async_trait]
impl AssignmentRepository for MemoryUnitOfWork {
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        let staged = self.staged.lock().unwrap();
        Ok(staged.assignments.iter().find(|a| a.id == id).cloned())
    }

    async fn add_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        // ID 从共享计数器分配，回滚后留下空洞，与数据库自增一致
        let id = {
            let mut shared = self.shared.lock().unwrap();
            shared.last_assignment_id += 1;
            shared.last_assignment_id
        };
        let now = chrono::Utc::now();
        let created = Assignment {
            id,
            student_id: assignment.student_id,
            teacher_id: None,
            content: assignment.content,
            grade: None,
            state: AssignmentState::Draft,
            created_at: now,
            updated_at: now,
        };
        self.staged
            .lock()
            .unwrap()
            .assignments
            .push(created.clone());
        self.journal
            .lock()
            .unwrap()
            .push(Write::Insert(created.clone()));
        Ok(created)
    }

    async fn save_assignment(
        &self,
        assignment: &Assignment,
        observed_state: AssignmentState,
    ) -> Result<Assignment> {
        let mut assignment = assignment.clone();
        assignment.updated_at = chrono::Utc::now();
        let saved = self
            .staged
            .lock()
            .unwrap()
            .apply_save(&assignment, observed_state)?;
        self.journal.lock().unwrap().push(Write::Save {
            assignment,
            observed_state,
        });
        Ok(saved)
    }

    async fn list_assignments_by_student(&self, student_id: i64) -> Result<Vec<Assignment>> {
        let staged = self.staged.lock().unwrap();
        Ok(staged
            .assignments
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_assignments_by_teacher(&self, teacher_id: i64) -> Result<Vec<Assignment>> {
        let staged = self.staged.lock().unwrap();
        Ok(staged
            .assignments
            .iter()
            .filter(|a| a.teacher_id == Some(teacher_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryUnitOfWork {
            shared, journal, ..
        } = *self;
        let mut shared = shared.lock().unwrap();
        let mut next = shared.clone();
        for write in journal.into_inner().unwrap() {
            match write {
                Write::Insert(assignment) => next.assignments.push(assignment),
                Write::Save {
                    assignment,
                    observed_state,
                } => {
                    next.apply_save(&assignment, observed_state)?;
                }
            }
        }
        next.assignments.sort_by_key(|a| a.id);
        *shared = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_draft(student_id: i64) -> NewAssignment {
        NewAssignment {
            student_id,
            content: Some("draft".into()),
        }
    }

    #[tokio::test]
    async fn test_overlapping_saves_keep_one_winner() {
        let storage = MemoryStorage::new().with_student(10, 1);
        let uow = storage.begin().await.unwrap();
        let created = uow.add_assignment(new_draft(1)).await.unwrap();
        uow.commit().await.unwrap();

        let first = storage.begin().await.unwrap();
        let second = storage.begin().await.unwrap();

        let mut submitted = created.clone();
        submitted.teacher_id = Some(5);
        submitted.state = AssignmentState::Submitted;
        first
            .save_assignment(&submitted, AssignmentState::Draft)
            .await
            .unwrap();

        let mut other = created.clone();
        other.teacher_id = Some(9);
        other.state = AssignmentState::Submitted;
        second
            .save_assignment(&other, AssignmentState::Draft)
            .await
            .unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, HWSystemError::InvalidState(_)));

        let stored = storage.assignment(created.id).unwrap();
        assert_eq!(stored.teacher_id, Some(5));
        assert_eq!(stored.state, AssignmentState::Submitted);
    }

    #[tokio::test]
    async fn test_overlapping_inserts_are_both_kept() {
        let storage = MemoryStorage::new().with_student(10, 1);
        let first = storage.begin().await.unwrap();
        let second = storage.begin().await.unwrap();

        let a = first.add_assignment(new_draft(1)).await.unwrap();
        let b = second.add_assignment(new_draft(1)).await.unwrap();
        assert_ne!(a.id, b.id);

        second.commit().await.unwrap();
        first.commit().await.unwrap();

        assert_eq!(storage.assignment_count(), 2);
        assert!(storage.assignment(a.id).is_some());
        assert!(storage.assignment(b.id).is_some());
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_shared_state_untouched() {
        let storage = MemoryStorage::new().with_student(10, 1);
        let uow = storage.begin().await.unwrap();
        let created = uow.add_assignment(new_draft(1)).await.unwrap();
        uow.commit().await.unwrap();

        let stale = storage.begin().await.unwrap();
        let winner = storage.begin().await.unwrap();

        let mut submitted = created.clone();
        submitted.teacher_id = Some(5);
        submitted.state = AssignmentState::Submitted;
        winner
            .save_assignment(&submitted, AssignmentState::Draft)
            .await
            .unwrap();
        winner.commit().await.unwrap();

        // 插入与失败的保存处于同一事务，应一并丢弃
        stale.add_assignment(new_draft(1)).await.unwrap();
        let mut edited = created.clone();
        edited.content = Some("late edit".into());
        stale
            .save_assignment(&edited, AssignmentState::Draft)
            .await
            .unwrap();
        assert!(stale.commit().await.is_err());

        assert_eq!(storage.assignment_count(), 1);
        assert_eq!(
            storage.assignment(created.id).unwrap().content.as_deref(),
            Some("draft")
        );
    }
}
