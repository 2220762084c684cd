use crate::application_flow::{ApplicationFlow, ApplicationForm, DraftSnapshot};
use crate::middlewares::{current_claims, require_claims};
use crate::models::*;
use crate::services::AdmissionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/admissions/submit",
    tag = "admissions",
    request_body = ApplicationForm,
    responses(
        (status = 200, description = "Application stored", body = SubmitAdmissionResponse),
        (status = 400, description = "Field-keyed validation errors", body = ErrorResponse)
    )
)]
pub async fn submit_admission(
    admission_service: web::Data<AdmissionService>,
    req: HttpRequest,
    form: web::Json<ApplicationForm>,
) -> Result<HttpResponse> {
    let submitted_by = current_claims(&req).and_then(|c| c.user_id().ok());

    match admission_service.submit(form.into_inner(), submitted_by).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Application submitted successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admissions/validate",
    tag = "admissions",
    request_body = ValidateStageRequest,
    responses(
        (status = 200, description = "Outcome of advancing from the given stage", body = ValidateStageResponse)
    )
)]
pub async fn validate_stage(request: web::Json<ValidateStageRequest>) -> Result<HttpResponse> {
    let ValidateStageRequest { step, form } = request.into_inner();
    let mut flow = ApplicationFlow::at(step, form);
    let transition = flow.next();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": ValidateStageResponse::from_flow(&flow, &transition)
    })))
}

#[utoipa::path(
    post,
    path = "/api/admissions/draft",
    tag = "admissions",
    request_body = ValidateStageRequest,
    responses(
        (status = 200, description = "Snapshot of the draft, nothing is stored", body = DraftSnapshot)
    )
)]
pub async fn save_draft(request: web::Json<ValidateStageRequest>) -> Result<HttpResponse> {
    let ValidateStageRequest { step, form } = request.into_inner();
    let flow = ApplicationFlow::at(step, form);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": flow.save_draft(),
        "message": "Draft saved"
    })))
}

#[utoipa::path(
    get,
    path = "/api/admissions/mine",
    tag = "admissions",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Applications submitted by the caller", body = [AdmissionResponse]),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn my_admissions(
    admission_service: web::Data<AdmissionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match require_claims(&req).and_then(|c| c.user_id()) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match admission_service.list_for_user(user_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admission_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admissions")
            .route("/submit", web::post().to(submit_admission))
            .route("/validate", web::post().to(validate_stage))
            .route("/draft", web::post().to(save_draft))
            .route("/mine", web::get().to(my_admissions)),
    );
}
