use crate::models::*;
use crate::services::{
    AdmissionService, EnquiryService, ExportKind, ExportService, XLSX_CONTENT_TYPE,
};
use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/admin/enquiries",
    tag = "admin",
    params(ListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Enquiries, newest first", body = EnquiryListResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    )
)]
pub async fn list_enquiries(
    enquiry_service: web::Data<EnquiryService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match enquiry_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/enquiries/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Enquiry id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Enquiry", body = EnquiryResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    )
)]
pub async fn get_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match enquiry_service.get(path.into_inner()).await {
        Ok(enquiry) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": EnquiryResponse::from(enquiry)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/enquiries/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Enquiry id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    )
)]
pub async fn delete_enquiry(
    enquiry_service: web::Data<EnquiryService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match enquiry_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Enquiry deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/admissions",
    tag = "admin",
    params(ListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Admissions, newest first", body = AdmissionListResponse),
        (status = 400, description = "Unknown status or board filter", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse)
    )
)]
pub async fn list_admissions(
    admission_service: web::Data<AdmissionService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match admission_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/admissions/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Admission id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Admission", body = AdmissionResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    )
)]
pub async fn get_admission(
    admission_service: web::Data<AdmissionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match admission_service.get(path.into_inner()).await {
        Ok(admission) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": AdmissionResponse::from(admission)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/admissions/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Admission id")),
    request_body = UpdateStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status updated", body = AdmissionResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    )
)]
pub async fn update_admission_status(
    admission_service: web::Data<AdmissionService>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse> {
    match admission_service
        .update_status(path.into_inner(), &request.status)
        .await
    {
        Ok(admission) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": AdmissionResponse::from(admission),
            "message": "Status updated"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/admissions/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Admission id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    )
)]
pub async fn delete_admission(
    admission_service: web::Data<AdmissionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match admission_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Admission deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/export",
    tag = "admin",
    params(ExportQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Spreadsheet attachment", body = [u8], content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Unknown export type or filter", body = ErrorResponse)
    )
)]
pub async fn export(
    export_service: web::Data<ExportService>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse> {
    let kind = match query.kind.as_deref().unwrap_or("admissions").parse::<ExportKind>() {
        Ok(kind) => kind,
        Err(e) => return Ok(e.error_response()),
    };

    match export_service.export(kind, &query.filters()).await {
        Ok(file) => Ok(HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, XLSX_CONTENT_TYPE))
            .insert_header((
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ))
            .body(file.bytes)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/enquiries", web::get().to(list_enquiries))
            .route("/enquiries/{id}", web::get().to(get_enquiry))
            .route("/enquiries/{id}", web::delete().to(delete_enquiry))
            .route("/admissions", web::get().to(list_admissions))
            .route("/admissions/{id}", web::get().to(get_admission))
            .route("/admissions/{id}", web::patch().to(update_admission_status))
            .route("/admissions/{id}", web::delete().to(delete_admission))
            .route("/export", web::get().to(export)),
    );
}
