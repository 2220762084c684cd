pub mod code_generator;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod search;
pub mod validation;

pub use code_generator::{generate_file_suffix, generate_six_digit_code};
pub use jwt::*;
pub use pagination::*;
pub use password::*;
pub use search::*;
pub use validation::*;
