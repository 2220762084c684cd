pub mod application_flow;
pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod swagger;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, ResponseError, web};
use config::AppConfig;
use database::DbPool;
use external::{EmailService, TwilioService};
use services::*;
use std::path::PathBuf;
use utils::JwtService;

/// Every service the HTTP layer needs, built once at start-up
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub auth_service: AuthService,
    pub enquiry_service: EnquiryService,
    pub admission_service: AdmissionService,
    pub upload_service: UploadService,
    pub export_service: ExportService,
    pub app_config: AppConfig,
}

impl AppState {
    pub fn new(config: &Config, pool: DbPool) -> AppResult<Self> {
        let jwt_service = JwtService::new(
            &config.jwt.secret,
            config.jwt.user_token_expires_in,
            config.jwt.admin_token_expires_in,
        );
        let email_service = EmailService::new(config.email.clone())?;
        let twilio_service = TwilioService::new(config.twilio.clone());

        let auth_service = AuthService::new(
            pool.clone(),
            jwt_service.clone(),
            email_service,
            twilio_service,
            config.app.is_development(),
        );
        let enquiry_service = EnquiryService::new(pool.clone());
        let admission_service = AdmissionService::new(pool);
        let upload_service = UploadService::new(&config.uploads);
        let export_service = ExportService::new(
            admission_service.clone(),
            enquiry_service.clone(),
            &config.app.public_url,
        );

        std::fs::create_dir_all(upload_service.dir())?;

        Ok(Self {
            jwt_service,
            auth_service,
            enquiry_service,
            admission_service,
            upload_service,
            export_service,
            app_config: config.app.clone(),
        })
    }

    fn upload_dir(&self) -> PathBuf {
        self.upload_service.dir().clone()
    }

    /// Services, extractor settings and every route; the auth middleware is wrapped by the caller
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth_service.clone()))
            .app_data(web::Data::new(self.enquiry_service.clone()))
            .app_data(web::Data::new(self.admission_service.clone()))
            .app_data(web::Data::new(self.upload_service.clone()))
            .app_data(web::Data::new(self.export_service.clone()))
            .app_data(web::Data::new(self.app_config.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .configure(swagger::swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::enquiry_config)
                    .configure(handlers::admission_config)
                    .configure(handlers::upload_config)
                    .configure(handlers::admin_config),
            )
            .service(actix_files::Files::new(
                services::upload_service::PUBLIC_PREFIX,
                self.upload_dir(),
            ));
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = AppError::ValidationError(format!("Invalid request body: {err}")).error_response();
    InternalError::from_response(err, response).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = AppError::ValidationError(format!("Invalid query: {err}")).error_response();
    InternalError::from_response(err, response).into()
}
