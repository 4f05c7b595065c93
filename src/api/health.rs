use actix_web::{HttpResponse, Responder, get};
use serde_json::json;

/// Liveness check, outside auth and rate limiting
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({"status": "ok"}))
    ),
    tag = "Health"
)]
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::TestApp;
    use actix_web::{http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn health_needs_no_token() {
        let app = TestApp::new();
        let svc = test::init_service(app.build()).await;
        let resp = test::call_service(&svc, TestApp::get("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}
