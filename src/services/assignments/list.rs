use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, error_response, lifecycle};
use crate::models::ApiResponse;
use crate::models::assignments::responses::AssignmentListResponse;
use crate::models::principal::entities::Principal;

// 只读请求不提交，事务在返回时丢弃
pub async fn list_student_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    principal: &Principal,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uow = match storage.begin().await {
        Ok(uow) => uow,
        Err(e) => return Ok(error_response(&e)),
    };

    match lifecycle::list_for_student(uow.as_ref(), principal).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_teacher_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    principal: &Principal,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uow = match storage.begin().await {
        Ok(uow) => uow,
        Err(e) => return Ok(error_response(&e)),
    };

    match lifecycle::list_for_teacher(uow.as_ref(), principal).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
