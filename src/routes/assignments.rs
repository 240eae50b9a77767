use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequirePrincipal};
use crate::models::assignments::requests::{
    GradeAssignmentRequest, SubmitAssignmentRequest, UpsertAssignmentRequest,
};
use crate::errors::HWSystemError;
use crate::models::principal::entities::Principal;
use crate::services::AssignmentService;
use crate::services::assignments::error_response;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

fn principal_or_unauthorized(req: &HttpRequest) -> Result<Principal, HttpResponse> {
    RequirePrincipal::extract_principal(req).ok_or_else(|| {
        error_response(&HWSystemError::authentication(
            "Unauthorized: principal not resolved",
        ))
    })
}

// HTTP处理程序
pub async fn list_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    let principal = match principal_or_unauthorized(&req) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    ASSIGNMENT_SERVICE
        .list_visible_assignments(&req, &principal)
        .await
}

pub async fn list_student_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    let principal = match principal_or_unauthorized(&req) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    ASSIGNMENT_SERVICE
        .list_student_assignments(&req, &principal)
        .await
}

pub async fn upsert_assignment(
    req: HttpRequest,
    body: web::Json<UpsertAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let principal = match principal_or_unauthorized(&req) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    ASSIGNMENT_SERVICE
        .upsert_assignment(&req, &principal, body.into_inner())
        .await
}

pub async fn submit_assignment(
    req: HttpRequest,
    body: web::Json<SubmitAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let principal = match principal_or_unauthorized(&req) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    ASSIGNMENT_SERVICE
        .submit_assignment(&req, &principal, body.into_inner())
        .await
}

pub async fn list_teacher_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    let principal = match principal_or_unauthorized(&req) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    ASSIGNMENT_SERVICE
        .list_teacher_assignments(&req, &principal)
        .await
}

pub async fn grade_assignment(
    req: HttpRequest,
    body: web::Json<GradeAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let principal = match principal_or_unauthorized(&req) {
        Ok(p) => p,
        Err(resp) => return Ok(resp),
    };
    ASSIGNMENT_SERVICE
        .grade_assignment(&req, &principal, body.into_inner())
        .await
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequirePrincipal)
            .route("", web::get().to(list_assignments)),
    )
    .service(
        web::scope("/api/v1/student/assignments")
            .wrap(middlewares::RequirePrincipal)
            .route("", web::get().to(list_student_assignments))
            .route("", web::post().to(upsert_assignment))
            .route("/submit", web::post().to(submit_assignment)),
    )
    .service(
        web::scope("/api/v1/teacher/assignments")
            .wrap(middlewares::RequirePrincipal)
            .route("", web::get().to(list_teacher_assignments))
            .route("/grade", web::post().to(grade_assignment)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::require_principal::PRINCIPAL_HEADER;
    use crate::models::ErrorCode;
    use crate::models::assignments::entities::{AssignmentState, Grade};
    use crate::storage::Storage;
    use crate::storage::memory_storage::MemoryStorage;
    use crate::utils::json_error_handler;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn storage() -> MemoryStorage {
        MemoryStorage::new()
            .with_student(10, 1)
            .with_student(11, 2)
            .with_teacher(20, 5)
            .with_teacher(21, 9)
    }

    fn as_user(user_id: i64) -> (&'static str, String) {
        (PRINCIPAL_HEADER, format!(r#"{{"user_id": {user_id}}}"#))
    }

    macro_rules! app {
        ($storage:expr) => {{
            let storage: Arc<dyn Storage> = Arc::new($storage.clone());
            test::init_service(
                App::new()
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::Data::new(storage))
                    .configure(configure_assignments_routes),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_full_lifecycle_over_http() {
        let storage = storage();
        let app = app!(storage);

        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments")
            .insert_header(as_user(10))
            .set_json(json!({ "content": "first draft" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["state"], "DRAFT");
        let id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments")
            .insert_header(as_user(10))
            .set_json(json!({ "id": id, "content": "final answer" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["content"], "final answer");

        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments/submit")
            .insert_header(as_user(10))
            .set_json(json!({ "id": id, "teacher_id": 5 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["state"], "SUBMITTED");
        assert_eq!(body["data"]["teacher_id"], 5);

        let req = test::TestRequest::post()
            .uri("/api/v1/teacher/assignments/grade")
            .insert_header(as_user(20))
            .set_json(json!({ "id": id, "grade": "B" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["state"], "GRADED");
        assert_eq!(body["data"]["grade"], "B");

        let stored = storage.assignment(id).unwrap();
        assert_eq!(stored.state, AssignmentState::Graded);
        assert_eq!(stored.grade, Some(Grade::B));
    }

    #[actix_web::test]
    async fn test_business_errors_map_to_status_codes() {
        let storage = storage();
        let app = app!(storage);

        // 不存在的作业
        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments/submit")
            .insert_header(as_user(10))
            .set_json(json!({ "id": 404, "teacher_id": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments")
            .insert_header(as_user(10))
            .set_json(json!({ "content": "mine" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["data"]["id"].as_i64().unwrap();

        // 其他学生提交
        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments/submit")
            .insert_header(as_user(11))
            .set_json(json!({ "id": id, "teacher_id": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::AssignmentInvalidOwner as i32);

        // 对草稿评分
        let req = test::TestRequest::post()
            .uri("/api/v1/teacher/assignments/grade")
            .insert_header(as_user(20))
            .set_json(json!({ "id": id, "grade": "A" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            storage.assignment(id).unwrap().state,
            AssignmentState::Draft
        );
    }

    #[actix_web::test]
    async fn test_unknown_grade_is_rejected() {
        let storage = storage();
        let app = app!(storage);

        let req = test::TestRequest::post()
            .uri("/api/v1/teacher/assignments/grade")
            .insert_header(as_user(20))
            .set_json(json!({ "id": 1, "grade": "E" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_principal_is_unauthorized() {
        let storage = storage();
        let app = app!(storage);

        let req = test::TestRequest::get()
            .uri("/api/v1/assignments")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(storage.assignment_count(), 0);
    }

    #[actix_web::test]
    async fn test_handler_without_resolved_principal_is_unauthorized() {
        let app = test::init_service(
            App::new().route("/bare", web::get().to(list_assignments)),
        )
        .await;

        let req = test::TestRequest::get().uri("/bare").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::Unauthorized as i32);
    }

    #[actix_web::test]
    async fn test_visible_list_follows_role() {
        let storage = storage();
        let app = app!(storage);

        for (user, content) in [(10, "a"), (10, "b"), (11, "c")] {
            let req = test::TestRequest::post()
                .uri("/api/v1/student/assignments")
                .insert_header(as_user(user))
                .set_json(json!({ "content": content }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/student/assignments/submit")
            .insert_header(as_user(11))
            .set_json(json!({ "id": 3, "teacher_id": 9 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/assignments")
            .insert_header(as_user(10))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let contents: Vec<&str> = body["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["a", "b"]);

        let req = test::TestRequest::get()
            .uri("/api/v1/assignments")
            .insert_header(as_user(21))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["content"], "c");

        // 教师没有学生列表
        let req = test::TestRequest::get()
            .uri("/api/v1/student/assignments")
            .insert_header(as_user(20))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
