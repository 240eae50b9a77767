use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, error_response, lifecycle};
use crate::models::ApiResponse;
use crate::models::assignments::requests::SubmitAssignmentRequest;
use crate::models::principal::entities::Principal;

pub async fn submit_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    principal: &Principal,
    req: SubmitAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uow = match storage.begin().await {
        Ok(uow) => uow,
        Err(e) => return Ok(error_response(&e)),
    };

    let assignment =
        match lifecycle::submit(uow.as_ref(), req.id, req.teacher_id, principal).await {
            Ok(assignment) => assignment,
            Err(e) => return Ok(error_response(&e)),
        };

    if let Err(e) = uow.commit().await {
        return Ok(error_response(&e));
    }

    info!(
        "Assignment {} submitted by student {} to teacher {}",
        assignment.id, assignment.student_id, req.teacher_id
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "作业已提交")))
}
