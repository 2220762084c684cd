pub mod admin;
pub mod admission;
pub mod auth;
pub mod enquiry;
pub mod upload;

pub use admin::admin_config;
pub use admission::admission_config;
pub use auth::auth_config;
pub use enquiry::enquiry_config;
pub use upload::upload_config;
