use crate::utils::validation::FieldErrors;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Per-field validation failures, in the order the fields were checked
    #[error("Validation failed on {} field(s)", .0.len())]
    FieldErrors(FieldErrors),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Spreadsheet error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Mail error: {0}")]
    MailError(String),
}

impl From<lettre::error::Error> for AppError {
    fn from(err: lettre::error::Error) -> Self {
        AppError::MailError(err.to_string())
    }
}

impl From<lettre::address::AddressError> for AppError {
    fn from(err: lettre::address::AddressError) -> Self {
        AppError::MailError(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        AppError::MailError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::FieldErrors(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::FieldErrors(fields) => {
                log::warn!("Validation failed: {:?}", fields.keys().collect::<Vec<_>>());
                let message = fields
                    .first_message()
                    .unwrap_or("Validation failed")
                    .to_string();
                ("VALIDATION_ERROR", message)
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                ("AUTH_ERROR", msg.clone())
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Forbidden(msg) => {
                log::warn!("Forbidden access: {msg}");
                ("FORBIDDEN", msg.clone())
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                ("EXTERNAL_API_ERROR", msg.clone())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            _ => {
                log::error!("Internal error: {self}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        let mut error = json!({
            "code": error_code,
            "message": message
        });
        if let AppError::FieldErrors(fields) = self {
            error["fields"] = json!(fields);
        }

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": error
        }))
    }
}
