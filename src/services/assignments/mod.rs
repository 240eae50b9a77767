pub mod grade;
pub mod lifecycle;
pub mod list;
pub mod submit;
pub mod upsert;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{debug, error};

use crate::errors::HWSystemError;
use crate::models::ApiResponse;
use crate::models::assignments::requests::{
    GradeAssignmentRequest, SubmitAssignmentRequest, UpsertAssignmentRequest,
};
use crate::models::principal::entities::Principal;
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 创建或编辑草稿
    pub async fn upsert_assignment(
        &self,
        request: &HttpRequest,
        principal: &Principal,
        req: UpsertAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        upsert::upsert_assignment(self, request, principal, req).await
    }

    /// 学生提交作业
    pub async fn submit_assignment(
        &self,
        request: &HttpRequest,
        principal: &Principal,
        req: SubmitAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_assignment(self, request, principal, req).await
    }

    /// 教师评分
    pub async fn grade_assignment(
        &self,
        request: &HttpRequest,
        principal: &Principal,
        req: GradeAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_assignment(self, request, principal, req).await
    }

    /// 列出学生自己的作业
    pub async fn list_student_assignments(
        &self,
        request: &HttpRequest,
        principal: &Principal,
    ) -> ActixResult<HttpResponse> {
        list::list_student_assignments(self, request, principal).await
    }

    /// 列出提交给教师的作业
    pub async fn list_teacher_assignments(
        &self,
        request: &HttpRequest,
        principal: &Principal,
    ) -> ActixResult<HttpResponse> {
        list::list_teacher_assignments(self, request, principal).await
    }

    /// 按调用者身份列出可见作业
    pub async fn list_visible_assignments(
        &self,
        request: &HttpRequest,
        principal: &Principal,
    ) -> ActixResult<HttpResponse> {
        if principal.is_student() {
            list::list_student_assignments(self, request, principal).await
        } else {
            list::list_teacher_assignments(self, request, principal).await
        }
    }
}

/// 将错误映射为 HTTP 响应：业务错误 4xx，基础设施错误 500
pub(crate) fn error_response(err: &HWSystemError) -> HttpResponse {
    if err.is_business_rule() {
        debug!("Assignment request declined: {}", err);
    } else {
        error!("Assignment request failed: {}", err);
    }

    let body = ApiResponse::from_error(err);
    match err {
        HWSystemError::NotFound(_) => HttpResponse::NotFound().json(body),
        HWSystemError::InvalidState(_) | HWSystemError::InvalidOwner(_) => {
            HttpResponse::BadRequest().json(body)
        }
        HWSystemError::Authentication(_) => HttpResponse::Unauthorized().json(body),
        HWSystemError::DatabaseConfig(_)
        | HWSystemError::DatabaseConnection(_)
        | HWSystemError::DatabaseOperation(_) => HttpResponse::InternalServerError().json(body),
    }
}
