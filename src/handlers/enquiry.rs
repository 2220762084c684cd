use crate::middlewares::current_claims;
use crate::models::*;
use crate::services::EnquiryService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/enquiry/submit",
    tag = "enquiry",
    request_body = CreateEnquiryRequest,
    responses(
        (status = 200, description = "Enquiry stored", body = CreatedResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse)
    )
)]
pub async fn submit_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    req: HttpRequest,
    request: web::Json<CreateEnquiryRequest>,
) -> Result<HttpResponse> {
    let submitted_by = current_claims(&req).and_then(|c| c.user_id().ok());

    match enquiry_service
        .submit(request.into_inner(), submitted_by)
        .await
    {
        Ok(enquiry) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CreatedResponse { id: enquiry.id },
            "message": "Enquiry submitted successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn enquiry_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/enquiry").route("/submit", web::post().to(submit_enquiry)));
}
