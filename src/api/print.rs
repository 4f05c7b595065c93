use crate::auth::auth::AuthUser;
use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::print::cash_advance::render_cash_advance;
use crate::print::payslip::render_payslip;
use actix_web::{HttpResponse, http::header::ContentType, web};
use chrono::Utc;
use futures::future::try_join;
use uuid::Uuid;

/// Full name for the slip, or "-" when the employee record can't be read.
async fn employee_name(backend: &BackendClient, id: Uuid) -> String {
    match backend.employee(id).await {
        Ok(employee) => employee.full_name,
        Err(e) => {
            tracing::warn!(employee_id = %id, error = %e, "Employee lookup failed, printing without name");
            "-".to_string()
        }
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// Printable payslip (A5 landscape HTML)
#[utoipa::path(
    get,
    path = "/api/print/payslip/{id}",
    params(
        ("id" = String, Path, description = "Payslip uuid")
    ),
    responses(
        (status = 200, description = "HTML document that opens the print dialog", body = String, content_type = "text/html"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden (HR/Admin only)"),
        (status = 404, description = "Payslip not found"),
        (status = 502, description = "Backend unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Print"
)]
pub async fn print_payslip(
    auth: AuthUser,
    path: web::Path<Uuid>,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let slip = backend.payslip(id).await?;
    let name = employee_name(&backend, slip.employee_id).await;
    let printed_on = config.zone.today(Utc::now());

    tracing::info!(user_id = %auth.user_id, payslip_id = %id, "Payslip printed");
    Ok(html(render_payslip(&slip, &name, &config.branding, printed_on)?))
}

/// Printable cash advance statement with its mutation history
#[utoipa::path(
    get,
    path = "/api/print/cash-advance/{id}",
    params(
        ("id" = String, Path, description = "Cash advance uuid")
    ),
    responses(
        (status = 200, description = "HTML document that opens the print dialog", body = String, content_type = "text/html"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden (HR/Admin only)"),
        (status = 404, description = "Cash advance not found"),
        (status = 502, description = "Backend unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Print"
)]
pub async fn print_cash_advance(
    auth: AuthUser,
    path: web::Path<Uuid>,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;
    let id = path.into_inner();

    let (advance, mutations) = try_join(backend.cash_advance(id), backend.cash_advance_mutations(id)).await?;
    let name = employee_name(&backend, advance.employee_id).await;
    let printed_on = config.zone.today(Utc::now());

    tracing::info!(user_id = %auth.user_id, cash_advance_id = %id, "Cash advance statement printed");
    Ok(html(render_cash_advance(
        &advance,
        &mutations,
        &name,
        &config.branding,
        printed_on,
    )?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{HR_USER_ID, TestApp, backend_bearer, bearer};
    use actix_web::{http::StatusCode, test};

    const ID: &str = "3f2a9c1e-7b44-4d2a-8c55-0e9d1b2a3c4d";

    #[actix_web::test]
    async fn employees_cannot_print() {
        let app = TestApp::new();
        let svc = test::init_service(app.build()).await;
        for uri in [
            format!("/api/print/payslip/{ID}"),
            format!("/api/print/cash-advance/{ID}"),
        ] {
            let req = TestApp::get(&uri).insert_header(bearer(3)).to_request();
            let resp = test::call_service(&svc, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
        }
    }

    #[actix_web::test]
    async fn malformed_id_is_rejected() {
        let app = TestApp::new();
        let svc = test::init_service(app.build()).await;
        let req = TestApp::get("/api/print/payslip/not-a-uuid")
            .insert_header(bearer(1))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn hr_reaches_the_backend() {
        let app = TestApp::new();
        let svc = test::init_service(app.build()).await;
        let req = TestApp::get(&format!("/api/print/payslip/{ID}"))
            .insert_header(bearer(2))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        // Nothing listens on the test backend.
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_web::test]
    async fn roleless_backend_tokens_use_configured_grants() {
        let app = TestApp::new();
        let svc = test::init_service(app.build()).await;
        let uri = format!("/api/print/cash-advance/{ID}");

        let req = TestApp::get(&uri).insert_header(backend_bearer(HR_USER_ID)).to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let req = TestApp::get(&uri)
            .insert_header(backend_bearer("0d9f2b1e-5c3a-4e7b-8f10-2a4b6c8d0e1f"))
            .to_request();
        let resp = test::call_service(&svc, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
