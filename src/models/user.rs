use crate::entities::users::{self, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[schema(example = "parent@example.com")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    #[schema(example = "parent@example.com")]
    pub email: String,
    /// `false` registers a new account, `true` signs in an existing one
    #[serde(default)]
    pub is_sign_in: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMobileOtpRequest {
    #[schema(example = "9876543210")]
    pub mobile: String,
    #[serde(default)]
    pub is_sign_in: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[schema(example = "parent@example.com")]
    pub email: String,
    #[schema(example = "123456")]
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyMobileOtpRequest {
    #[schema(example = "9876543210")]
    pub mobile: String,
    #[schema(example = "123456")]
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    #[schema(example = "admin@school.edu")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub message: String,
    /// Seconds until the code expires
    pub expires_in: i64,
    /// Only echoed back in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub expires_at: i64,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            mobile: user.mobile,
            role: user.role,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}
