pub mod admission_service;
pub mod auth_service;
pub mod enquiry_service;
pub mod export_service;
pub mod upload_service;

pub use admission_service::*;
pub use auth_service::*;
pub use enquiry_service::*;
pub use export_service::*;
pub use upload_service::*;
