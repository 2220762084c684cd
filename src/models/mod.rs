pub mod admission;
pub mod common;
pub mod enquiry;
pub mod user;

pub use admission::*;
pub use common::*;
pub use enquiry::*;
pub use user::*;
