use crate::database::is_unique_violation;
use crate::entities::users::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::external::{EmailService, TwilioService};
use crate::models::*;
use crate::utils::*;
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

pub const OTP_TTL_MINUTES: i64 = 10;

/// Which identity an OTP was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OtpChannel {
    Email,
    Mobile,
}

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    email_service: EmailService,
    twilio_service: TwilioService,
    expose_otp: bool,
}

impl AuthService {
    /// `expose_otp` echoes generated codes in responses, development only
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        email_service: EmailService,
        twilio_service: TwilioService,
        expose_otp: bool,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            email_service,
            twilio_service,
            expose_otp,
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_mobile(&self, mobile: &str) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Mobile.eq(mobile))
            .one(&self.pool)
            .await?;
        Ok(user)
    }

    /// Registers an email without issuing an OTP
    pub async fn signup(&self, request: SignupRequest) -> AppResult<UserResponse> {
        let email = normalize_email(&request.email)?;
        if self.find_by_email(&email).await?.is_some() {
            return Err(email_taken());
        }

        let now = Utc::now();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(Some(email)),
            mobile: Set(None),
            password_hash: Set(None),
            role: Set(UserRole::User),
            otp: Set(None),
            otp_expires_at: Set(None),
            email_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken()
            } else {
                e.into()
            }
        })?;

        log::info!("User {} signed up by email", user.id);
        Ok(user.into())
    }

    pub async fn send_email_otp(&self, request: SendOtpRequest) -> AppResult<SendOtpResponse> {
        let email = normalize_email(&request.email)?;
        let existing = self.find_by_email(&email).await?;

        let (code, _) = self
            .issue_otp(existing, request.is_sign_in, OtpChannel::Email, &email)
            .await?;

        if let Err(e) = self.email_service.send_otp(&email, &code).await {
            if !self.expose_otp {
                return Err(e);
            }
            log::warn!("OTP email to {email} failed, returning the code in the response: {e}");
        }

        Ok(self.otp_response("OTP sent to your email", code))
    }

    pub async fn send_mobile_otp(
        &self,
        request: SendMobileOtpRequest,
    ) -> AppResult<SendOtpResponse> {
        let mobile = normalize_mobile(&request.mobile)?;
        let existing = self.find_by_mobile(&mobile).await?;

        let (code, _) = self
            .issue_otp(existing, request.is_sign_in, OtpChannel::Mobile, &mobile)
            .await?;

        self.twilio_service.send_otp(&mobile, &code).await?;

        Ok(self.otp_response("OTP sent to your mobile number", code))
    }

    fn otp_response(&self, message: &str, code: String) -> SendOtpResponse {
        SendOtpResponse {
            message: message.to_string(),
            expires_in: OTP_TTL_MINUTES * 60,
            otp: self.expose_otp.then_some(code),
        }
    }

    /// Stores a fresh code on the identity, creating the user on sign-up
    async fn issue_otp(
        &self,
        existing: Option<users::Model>,
        is_sign_in: bool,
        channel: OtpChannel,
        identity: &str,
    ) -> AppResult<(String, DateTime<Utc>)> {
        if existing.as_ref().is_some_and(|u| u.is_admin()) {
            return Err(AppError::Forbidden(
                "Admin accounts cannot use OTP login. Please use admin login.".to_string(),
            ));
        }

        match (&existing, is_sign_in) {
            (None, true) => {
                return Err(AppError::NotFound(
                    "Account not found. Please sign up first.".to_string(),
                ));
            }
            (Some(_), false) => {
                return Err(already_registered(channel));
            }
            _ => {}
        }

        let code = generate_six_digit_code();
        let now = Utc::now();
        let expires_at = now + Duration::minutes(OTP_TTL_MINUTES);

        match existing {
            Some(user) => {
                let mut active: users::ActiveModel = user.into();
                active.otp = Set(Some(code.clone()));
                active.otp_expires_at = Set(Some(expires_at));
                active.updated_at = Set(now);
                active.update(&self.pool).await?;
            }
            None => {
                let (email, mobile) = match channel {
                    OtpChannel::Email => (Some(identity.to_string()), None),
                    OtpChannel::Mobile => (None, Some(identity.to_string())),
                };
                users::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(email),
                    mobile: Set(mobile),
                    password_hash: Set(None),
                    role: Set(UserRole::User),
                    otp: Set(Some(code.clone())),
                    otp_expires_at: Set(Some(expires_at)),
                    email_verified: Set(false),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.pool)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        already_registered(channel)
                    } else {
                        e.into()
                    }
                })?;
            }
        }

        Ok((code, expires_at))
    }

    pub async fn verify_email_otp(&self, request: VerifyOtpRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email)?;
        let user = self.find_by_email(&email).await?;
        self.consume_otp(user, request.otp.trim(), OtpChannel::Email)
            .await
    }

    pub async fn verify_mobile_otp(
        &self,
        request: VerifyMobileOtpRequest,
    ) -> AppResult<AuthResponse> {
        let mobile = normalize_mobile(&request.mobile)?;
        let user = self.find_by_mobile(&mobile).await?;
        self.consume_otp(user, request.otp.trim(), OtpChannel::Mobile)
            .await
    }

    /// Accepts the code at most once: the clear happens in the same statement
    /// that checks code and expiry, so a concurrent second attempt matches no row.
    async fn consume_otp(
        &self,
        user: Option<users::Model>,
        otp: &str,
        channel: OtpChannel,
    ) -> AppResult<AuthResponse> {
        let invalid = || AppError::AuthError("Invalid or expired OTP".to_string());

        if otp.is_empty() {
            return Err(AppError::ValidationError("OTP is required".to_string()));
        }
        let user = match user {
            Some(u) if !u.is_admin() => u,
            _ => return Err(invalid()),
        };

        let now = Utc::now();
        let mut update = users::Entity::update_many()
            .col_expr(users::Column::Otp, Expr::value(Option::<String>::None))
            .col_expr(
                users::Column::OtpExpiresAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now));
        if channel == OtpChannel::Email {
            update = update.col_expr(users::Column::EmailVerified, Expr::value(true));
        }

        let result = update
            .filter(users::Column::Id.eq(user.id))
            .filter(users::Column::Otp.eq(otp))
            .filter(users::Column::OtpExpiresAt.gt(now))
            .exec(&self.pool)
            .await?;

        if result.rows_affected != 1 {
            log::warn!("Rejected OTP for user {}", user.id);
            return Err(invalid());
        }

        let user = users::Entity::find_by_id(user.id)
            .one(&self.pool)
            .await?
            .ok_or_else(invalid)?;

        log::info!("User {} verified by OTP", user.id);
        self.issue_session(user)
    }

    pub async fn admin_login(&self, request: AdminLoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::AuthError("Invalid credentials".to_string());

        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        let email = request.email.trim().to_lowercase();
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::Role.eq(UserRole::Admin))
            .one(&self.pool)
            .await?
            .ok_or_else(invalid)?;

        let hash = user.password_hash.clone().ok_or_else(invalid)?;
        let password = request.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Password check aborted: {e}")))??;

        if !matches {
            log::warn!("Failed admin login for {}", user.id);
            return Err(invalid());
        }

        log::info!("Admin {} logged in", user.id);
        self.issue_session(user)
    }

    fn issue_session(&self, user: users::Model) -> AppResult<AuthResponse> {
        let issued = self
            .jwt_service
            .generate_token(user.id, user.email.as_deref(), user.role)?;
        Ok(AuthResponse {
            token: issued.token,
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }

    /// Creates a password-authenticated admin; an existing email is rejected
    pub async fn create_admin(&self, email: &str, password: &str) -> AppResult<users::Model> {
        self.create_admin_with_cost(email, password, PASSWORD_HASH_COST)
            .await
    }

    pub async fn create_admin_with_cost(
        &self,
        email: &str,
        password: &str,
        cost: u32,
    ) -> AppResult<users::Model> {
        let email = normalize_email(email)?;
        validate_password(password)?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "A user with email {email} already exists"
            )));
        }

        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| AppError::InternalError(format!("Password hashing aborted: {e}")))??;

        let now = Utc::now();
        let admin = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(Some(email)),
            mobile: Set(None),
            password_hash: Set(Some(hash)),
            role: Set(UserRole::Admin),
            otp: Set(None),
            otp_expires_at: Set(None),
            email_verified: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Admin {} created", admin.id);
        Ok(admin)
    }
}

fn email_taken() -> AppError {
    AppError::ValidationError("Email already registered. Please sign in instead.".to_string())
}

fn already_registered(channel: OtpChannel) -> AppError {
    match channel {
        OtpChannel::Email => email_taken(),
        OtpChannel::Mobile => AppError::ValidationError(
            "Mobile number already registered. Please sign in instead.".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmailConfig, TwilioConfig};
    use crate::database::{create_pool, run_migrations};

    async fn service() -> AuthService {
        service_with(EmailConfig::default(), true).await
    }

    async fn service_with(email: EmailConfig, expose_otp: bool) -> AuthService {
        let pool = create_pool(&crate::config::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();

        AuthService::new(
            pool,
            JwtService::new("test-secret", 604_800, 86_400),
            EmailService::new(email).unwrap(),
            TwilioService::new(TwilioConfig::default()),
            expose_otp,
        )
    }

    // Nothing listens on port 1, so every delivery attempt fails
    fn unreachable_smtp() -> EmailConfig {
        EmailConfig {
            host: Some("127.0.0.1".to_string()),
            port: 1,
            username: Some("mailer".to_string()),
            password: Some("secret".to_string()),
            from: Some("admissions@school.edu".to_string()),
        }
    }

    #[tokio::test]
    async fn test_failed_email_delivery_is_reported() {
        let auth = service_with(unreachable_smtp(), false).await;
        let sent = auth.send_email_otp(sign_up("x@y.com")).await;
        assert!(matches!(sent, Err(AppError::MailError(_))));
    }

    #[tokio::test]
    async fn test_failed_email_delivery_still_returns_code_in_development() {
        let auth = service_with(unreachable_smtp(), true).await;
        let sent = auth.send_email_otp(sign_up("x@y.com")).await.unwrap();
        assert_eq!(sent.otp.map(|c| c.len()), Some(6));
    }

    #[tokio::test]
    async fn test_mobile_insert_race_reports_mobile_taken() {
        let auth = service().await;
        auth.issue_otp(None, false, OtpChannel::Mobile, "9876543210")
            .await
            .unwrap();

        // a second sign-up that missed the existence check hits the unique index
        let raced = auth
            .issue_otp(None, false, OtpChannel::Mobile, "9876543210")
            .await;
        match raced {
            Err(AppError::ValidationError(msg)) => assert!(msg.starts_with("Mobile number")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    fn sign_up(email: &str) -> SendOtpRequest {
        SendOtpRequest {
            email: email.to_string(),
            is_sign_in: false,
        }
    }

    #[tokio::test]
    async fn test_email_otp_is_single_use() {
        let auth = service().await;
        let sent = auth.send_email_otp(sign_up("Parent@Example.com")).await.unwrap();
        let code = sent.otp.unwrap();
        assert_eq!(sent.expires_in, 600);

        let session = auth
            .verify_email_otp(VerifyOtpRequest {
                email: "parent@example.com".to_string(),
                otp: code.clone(),
            })
            .await
            .unwrap();
        assert_eq!(session.expires_in, 604_800);
        assert!(session.user.email_verified);
        assert_eq!(session.user.email.as_deref(), Some("parent@example.com"));

        let again = auth
            .verify_email_otp(VerifyOtpRequest {
                email: "parent@example.com".to_string(),
                otp: code,
            })
            .await;
        assert!(matches!(again, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_wrong_code_leaves_otp_intact() {
        let auth = service().await;
        let code = auth
            .send_email_otp(sign_up("a@b.com"))
            .await
            .unwrap()
            .otp
            .unwrap();
        let wrong = if code == "999999" { "100000" } else { "999999" };

        let rejected = auth
            .verify_email_otp(VerifyOtpRequest {
                email: "a@b.com".to_string(),
                otp: wrong.to_string(),
            })
            .await;
        assert!(matches!(rejected, Err(AppError::AuthError(_))));

        let stored = auth.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.otp.as_deref(), Some(code.as_str()));
        assert!(!stored.email_verified);
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let auth = service().await;
        let code = auth
            .send_email_otp(sign_up("late@b.com"))
            .await
            .unwrap()
            .otp
            .unwrap();

        let user = auth.find_by_email("late@b.com").await.unwrap().unwrap();
        let mut active: users::ActiveModel = user.into();
        active.otp_expires_at = Set(Some(Utc::now() - Duration::seconds(1)));
        active.update(&auth.pool).await.unwrap();

        let rejected = auth
            .verify_email_otp(VerifyOtpRequest {
                email: "late@b.com".to_string(),
                otp: code,
            })
            .await;
        assert!(matches!(rejected, Err(AppError::AuthError(_))));
    }

    #[tokio::test]
    async fn test_intent_must_match_existence() {
        let auth = service().await;

        let missing = auth
            .send_email_otp(SendOtpRequest {
                email: "nobody@b.com".to_string(),
                is_sign_in: true,
            })
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        auth.send_email_otp(sign_up("twice@b.com")).await.unwrap();
        let duplicate = auth.send_email_otp(sign_up("twice@b.com")).await;
        assert!(matches!(duplicate, Err(AppError::ValidationError(_))));

        let sign_in = auth
            .send_email_otp(SendOtpRequest {
                email: "twice@b.com".to_string(),
                is_sign_in: true,
            })
            .await;
        assert!(sign_in.is_ok());
    }

    #[tokio::test]
    async fn test_mobile_otp_flow() {
        let auth = service().await;
        let sent = auth
            .send_mobile_otp(SendMobileOtpRequest {
                mobile: "98765-43210".to_string(),
                is_sign_in: false,
            })
            .await
            .unwrap();

        let session = auth
            .verify_mobile_otp(VerifyMobileOtpRequest {
                mobile: "9876543210".to_string(),
                otp: sent.otp.unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.mobile.as_deref(), Some("9876543210"));
        assert_eq!(session.user.email, None);
        assert!(!session.user.email_verified);

        let bad = auth
            .send_mobile_otp(SendMobileOtpRequest {
                mobile: "12345".to_string(),
                is_sign_in: false,
            })
            .await;
        assert!(matches!(bad, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_admins_use_passwords_only() {
        let auth = service().await;
        auth.create_admin_with_cost("admin@school.edu", "s3cure-pass", 4)
            .await
            .unwrap();

        let otp = auth
            .send_email_otp(SendOtpRequest {
                email: "admin@school.edu".to_string(),
                is_sign_in: true,
            })
            .await;
        assert!(matches!(otp, Err(AppError::Forbidden(_))));

        let wrong = auth
            .admin_login(AdminLoginRequest {
                email: "admin@school.edu".to_string(),
                password: "nope-nope".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::AuthError(_))));

        let session = auth
            .admin_login(AdminLoginRequest {
                email: "Admin@School.edu".to_string(),
                password: "s3cure-pass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.expires_in, 86_400);
        assert_eq!(session.user.role, UserRole::Admin);

        let claims = auth.jwt().verify_token(&session.token).unwrap();
        assert!(claims.is_admin());

        let duplicate = auth
            .create_admin_with_cost("admin@school.edu", "another-pass", 4)
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_user_cannot_password_login() {
        let auth = service().await;
        auth.signup(SignupRequest {
            email: "user@b.com".to_string(),
        })
        .await
        .unwrap();

        let attempt = auth
            .admin_login(AdminLoginRequest {
                email: "user@b.com".to_string(),
                password: "whatever1".to_string(),
            })
            .await;
        assert!(matches!(attempt, Err(AppError::AuthError(_))));
    }
}
