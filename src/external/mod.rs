pub mod email;
pub mod twilio;

pub use email::*;
pub use twilio::*;
