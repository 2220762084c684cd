pub mod admissions;
pub mod enquiries;
pub mod users;
