use crate::entities::users::UserRole;
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Claims {
    pub sub: String, // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    user_token_expires_in: i64,
    admin_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, user_expires_in: i64, admin_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            user_token_expires_in: user_expires_in,
            admin_token_expires_in: admin_expires_in,
        }
    }

    pub fn expires_in_for(&self, role: UserRole) -> i64 {
        match role {
            UserRole::Admin => self.admin_token_expires_in,
            UserRole::User => self.user_token_expires_in,
        }
    }

    pub fn generate_token(
        &self,
        user_id: Uuid,
        email: Option<&str>,
        role: UserRole,
    ) -> AppResult<IssuedToken> {
        let expires_in = self.expires_in_for(role);
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_in })
    }

    /// Signature and expiry only, there is no revocation list
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 7 * 24 * 3600, 24 * 3600)
    }

    #[test]
    fn test_role_decides_lifetime() {
        let jwt = service();
        let user = jwt
            .generate_token(Uuid::new_v4(), Some("a@b.com"), UserRole::User)
            .unwrap();
        let admin = jwt
            .generate_token(Uuid::new_v4(), Some("admin@b.com"), UserRole::Admin)
            .unwrap();
        assert_eq!(user.expires_in, 604_800);
        assert_eq!(admin.expires_in, 86_400);

        let claims = jwt.verify_token(&admin.token).unwrap();
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_round_trip_keeps_subject() {
        let jwt = service();
        let id = Uuid::new_v4();
        let issued = jwt.generate_token(id, None, UserRole::User).unwrap();
        let claims = jwt.verify_token(&issued.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
        assert_eq!(claims.email, None);
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let issued = service()
            .generate_token(Uuid::new_v4(), None, UserRole::User)
            .unwrap();
        let other = JwtService::new("another-secret", 60, 60);
        assert!(other.verify_token(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // default validation leeway is 60 seconds
        let jwt = JwtService::new("test-secret", -120, -120);
        let issued = jwt
            .generate_token(Uuid::new_v4(), None, UserRole::User)
            .unwrap();
        assert!(jwt.verify_token(&issued.token).is_err());
    }
}
