use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::application_flow::{ApplicationForm, DraftSnapshot, StageStatus, Step};
use crate::entities::admissions::{AdmissionStatus, Board, Sibling};
use crate::entities::users::UserRole;
use crate::handlers;
use crate::handlers::upload::UploadImageForm;
use crate::models::*;
use crate::services::{UploadCategory, UploadedImage};
use crate::utils::{Claims, PaginationInfo};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::signup,
        handlers::auth::send_otp,
        handlers::auth::send_mobile_otp,
        handlers::auth::verify_otp,
        handlers::auth::verify_mobile_otp,
        handlers::auth::admin_login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::enquiry::submit_enquiry,
        handlers::admission::submit_admission,
        handlers::admission::validate_stage,
        handlers::admission::save_draft,
        handlers::admission::my_admissions,
        handlers::upload::upload_image,
        handlers::admin::list_enquiries,
        handlers::admin::get_enquiry,
        handlers::admin::delete_enquiry,
        handlers::admin::list_admissions,
        handlers::admin::get_admission,
        handlers::admin::update_admission_status,
        handlers::admin::delete_admission,
        handlers::admin::export,
    ),
    components(
        schemas(
            SignupRequest,
            SendOtpRequest,
            SendMobileOtpRequest,
            VerifyOtpRequest,
            VerifyMobileOtpRequest,
            AdminLoginRequest,
            SendOtpResponse,
            UserResponse,
            AuthResponse,
            CurrentUserResponse,
            Claims,
            UserRole,
            CreateEnquiryRequest,
            EnquiryResponse,
            EnquiryListResponse,
            ApplicationForm,
            Sibling,
            Step,
            StageStatus,
            DraftSnapshot,
            ValidateStageRequest,
            ValidateStageResponse,
            StageProgress,
            SubmitAdmissionResponse,
            UpdateStatusRequest,
            AdmissionResponse,
            AdmissionListResponse,
            AdmissionStatus,
            Board,
            UploadedImage,
            UploadImageForm,
            UploadCategory,
            ListQuery,
            ExportQuery,
            PaginationInfo,
            CreatedResponse,
            ApiError,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "OTP and admin sign-in"),
        (name = "enquiry", description = "Public enquiry form"),
        (name = "admissions", description = "Admission application"),
        (name = "upload", description = "Photo upload"),
        (name = "admin", description = "Review, status changes and export"),
    ),
    info(
        title = "Admissions Backend API",
        version = "1.0.0",
        description = "School enquiry and admission REST API"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
