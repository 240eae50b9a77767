use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, error_response, lifecycle};
use crate::models::ApiResponse;
use crate::models::assignments::requests::GradeAssignmentRequest;
use crate::models::principal::entities::Principal;

/// 评分
/// POST /api/v1/teacher/assignments/grade
pub async fn grade_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    principal: &Principal,
    req: GradeAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uow = match storage.begin().await {
        Ok(uow) => uow,
        Err(e) => return Ok(error_response(&e)),
    };

    let assignment = match lifecycle::grade(uow.as_ref(), req.id, req.grade, principal).await {
        Ok(assignment) => assignment,
        Err(e) => return Ok(error_response(&e)),
    };

    if let Err(e) = uow.commit().await {
        return Ok(error_response(&e));
    }

    info!(
        "Assignment {} graded {} by teacher {:?}",
        assignment.id, req.grade, assignment.teacher_id
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "评分成功")))
}
