//! 作业生命周期
//!
//! DRAFT -> SUBMITTED -> GRADED 状态机及其前置条件。
//! 每个操作的校验按固定顺序执行，遇到第一个失败立即返回；
//! 持久化通过调用方传入的事务完成，提交与否由调用方决定。

use crate::errors::Result;
use crate::models::assignments::entities::{Assignment, AssignmentState, Grade, NewAssignment};
use crate::models::principal::entities::Principal;
use crate::storage::{AssignmentRepository, StudentDirectory, TeacherDirectory};
use crate::utils::{assert_found, assert_owner, assert_valid};

const NO_ASSIGNMENT: &str = "No assignment with this id was found";
const NO_STUDENT: &str = "No student with this user id.";
const NO_TEACHER: &str = "No teacher with this user id.";

/// 新建草稿，或覆盖已有草稿的内容。
///
/// 编辑已有草稿时只检查存在性和状态，不校验归属。
pub async fn upsert<U>(
    uow: &U,
    existing_id: Option<i64>,
    content: String,
    principal: &Principal,
) -> Result<Assignment>
where
    U: AssignmentRepository + StudentDirectory + ?Sized,
{
    match existing_id {
        Some(id) => {
            let mut assignment = assert_found(uow.get_assignment_by_id(id).await?, NO_ASSIGNMENT)?;
            assert_valid(
                assignment.state.is_editable(),
                "only assignment in draft state can be edited",
            )?;

            assignment.content = Some(content);
            uow.save_assignment(&assignment, AssignmentState::Draft)
                .await
        }
        None => {
            let student = assert_found(
                uow.get_student_by_user_id(principal.user_id).await?,
                NO_STUDENT,
            )?;

            uow.add_assignment(NewAssignment {
                student_id: student.id,
                content: Some(content),
            })
            .await
        }
    }
}

/// 学生将草稿提交给指定教师
pub async fn submit<U>(
    uow: &U,
    id: i64,
    teacher_id: i64,
    principal: &Principal,
) -> Result<Assignment>
where
    U: AssignmentRepository + StudentDirectory + ?Sized,
{
    let student = assert_found(
        uow.get_student_by_user_id(principal.user_id).await?,
        NO_STUDENT,
    )?;
    let mut assignment = assert_found(uow.get_assignment_by_id(id).await?, NO_ASSIGNMENT)?;

    assert_owner(
        assignment.student_id == student.id,
        "This assignment belongs to some other student",
    )?;
    assert_valid(
        assignment.has_content(),
        "assignment with empty content cannot be submitted",
    )?;
    assert_valid(
        assignment
            .state
            .can_transition_to(AssignmentState::Submitted),
        "only a draft assignment can be submitted",
    )?;

    let observed = assignment.state;
    assignment.teacher_id = Some(teacher_id);
    assignment.state = AssignmentState::Submitted;
    uow.save_assignment(&assignment, observed).await
}

/// 教师为提交给自己的作业评分
pub async fn grade<U>(uow: &U, id: i64, grade: Grade, principal: &Principal) -> Result<Assignment>
where
    U: AssignmentRepository + TeacherDirectory + ?Sized,
{
    let teacher = assert_found(
        uow.get_teacher_by_user_id(principal.user_id).await?,
        NO_TEACHER,
    )?;
    let mut assignment = assert_found(uow.get_assignment_by_id(id).await?, NO_ASSIGNMENT)?;

    assert_owner(
        assignment.teacher_id == Some(teacher.id),
        "This assignment was submitted to some other teacher.",
    )?;
    assert_valid(
        assignment.state.can_transition_to(AssignmentState::Graded),
        "only a submitted assignment can be graded",
    )?;

    let observed = assignment.state;
    assignment.grade = Some(grade);
    assignment.state = AssignmentState::Graded;
    uow.save_assignment(&assignment, observed).await
}

/// 列出调用者（学生）的全部作业
pub async fn list_for_student<U>(uow: &U, principal: &Principal) -> Result<Vec<Assignment>>
where
    U: AssignmentRepository + StudentDirectory + ?Sized,
{
    let student = assert_found(
        uow.get_student_by_user_id(principal.user_id).await?,
        NO_STUDENT,
    )?;
    uow.list_assignments_by_student(student.id).await
}

/// 列出提交给调用者（教师）的全部作业
pub async fn list_for_teacher<U>(uow: &U, principal: &Principal) -> Result<Vec<Assignment>>
where
    U: AssignmentRepository + TeacherDirectory + ?Sized,
{
    let teacher = assert_found(
        uow.get_teacher_by_user_id(principal.user_id).await?,
        NO_TEACHER,
    )?;
    uow.list_assignments_by_teacher(teacher.id).await
}
