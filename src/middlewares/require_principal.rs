/*!
 * 调用者身份中间件
 *
 * 从 `X-Principal` 请求头解析调用者身份，并通过学生/教师目录补全角色信息。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequirePrincipal;
 *
 * web::scope("/api/v1/student/assignments")
 *     .wrap(RequirePrincipal)
 *     .route("", web::get().to(list_student_assignments));
 *
 * async fn handler(req: HttpRequest) -> Result<HttpResponse> {
 *     let principal = RequirePrincipal::extract_principal(&req);
 *     ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 客户端在请求头中携带 `X-Principal: {"user_id": 42}`
 * 2. 中间件只信任 `user_id`，学生/教师 ID 从存储中重新解析
 * 3. 解析成功后将 `Principal` 存入请求扩展
 * 4. 请求头缺失或格式错误返回 401，目录查询失败返回 500
 */

use crate::models::principal::entities::{Principal, PrincipalHeader};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

pub const PRINCIPAL_HEADER: &str = "X-Principal";

#[derive(Clone)]
pub struct RequirePrincipal;

enum PrincipalError {
    // 请求头缺失或无法解析
    Rejected(String),
    // 目录查询失败
    Storage(String),
}

fn create_error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    match status {
        StatusCode::NO_CONTENT => HttpResponse::build(status)
            .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
            .finish(),
        _ => HttpResponse::build(status)
            .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
            .json(ApiResponse::<()>::error_empty(code, message)),
    }
}

fn parse_principal_header(req: &ServiceRequest) -> Result<PrincipalHeader, PrincipalError> {
    let raw = req
        .headers()
        .get(PRINCIPAL_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| PrincipalError::Rejected(format!("Missing {PRINCIPAL_HEADER} header")))?;

    serde_json::from_str::<PrincipalHeader>(raw).map_err(|err| {
        info!("Malformed {} header: {}", PRINCIPAL_HEADER, err);
        PrincipalError::Rejected(format!("Invalid {PRINCIPAL_HEADER} header"))
    })
}

async fn resolve_principal(req: &ServiceRequest) -> Result<Principal, PrincipalError> {
    let header = parse_principal_header(req)?;

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| PrincipalError::Storage("Storage not found in app data".to_string()))?
        .get_ref()
        .clone();

    let student = storage
        .get_student_by_user_id(header.user_id)
        .await
        .map_err(|e| PrincipalError::Storage(e.to_string()))?;
    let teacher = storage
        .get_teacher_by_user_id(header.user_id)
        .await
        .map_err(|e| PrincipalError::Storage(e.to_string()))?;

    Ok(Principal {
        user_id: header.user_id,
        student_id: student.map(|s| s.id),
        teacher_id: teacher.map(|t| t.id),
    })
}

impl<S, B> Transform<S, ServiceRequest> for RequirePrincipal
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequirePrincipalMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePrincipalMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequirePrincipalMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequirePrincipalMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match resolve_principal(&req).await {
                Ok(principal) => {
                    debug!(
                        "Principal resolved: user {} (student {:?}, teacher {:?})",
                        principal.user_id, principal.student_id, principal.teacher_id
                    );
                    req.extensions_mut().insert(principal);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(PrincipalError::Rejected(err)) => {
                    info!("Principal rejected for request to {}: {}", req.path(), err);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
                Err(PrincipalError::Storage(err)) => {
                    error!("Failed to resolve principal for {}: {}", req.path(), err);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Failed to resolve principal",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequirePrincipal {
    /// 从请求扩展中提取调用者身份
    /// 此函数应该在应用了RequirePrincipal中间件的路由处理程序中使用
    pub fn extract_principal(req: &actix_web::HttpRequest) -> Option<Principal> {
        req.extensions().get::<Principal>().cloned()
    }
}
