use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, error_response, lifecycle};
use crate::models::ApiResponse;
use crate::models::assignments::requests::UpsertAssignmentRequest;
use crate::models::principal::entities::Principal;

pub async fn upsert_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    principal: &Principal,
    req: UpsertAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uow = match storage.begin().await {
        Ok(uow) => uow,
        Err(e) => return Ok(error_response(&e)),
    };

    let assignment = match lifecycle::upsert(uow.as_ref(), req.id, req.content, principal).await {
        Ok(assignment) => assignment,
        Err(e) => return Ok(error_response(&e)),
    };

    // 提交事务，失败时事务随 uow 一同回滚
    if let Err(e) = uow.commit().await {
        return Ok(error_response(&e));
    }

    info!(
        "Assignment {} saved as draft by user {}",
        assignment.id, principal.user_id
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "作业已保存")))
}
