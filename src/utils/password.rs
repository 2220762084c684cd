use crate::error::{AppError, AppResult};
use bcrypt::{hash, verify};

pub const PASSWORD_HASH_COST: u32 = 12;

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::ValidationError(
            "Password must be between 8 and 128 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash_password_with_cost(password, PASSWORD_HASH_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> AppResult<String> {
    hash(password, cost).map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("correct-horse").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        // low cost keeps the test fast
        let hashed = hash_password_with_cost("Password123", 4).unwrap();
        assert!(verify_password("Password123", &hashed).unwrap());
        assert!(!verify_password("WrongPassword", &hashed).unwrap());
    }
}
