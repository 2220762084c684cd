use crate::config::AppConfig;
use crate::middlewares::{AUTH_COOKIE, require_claims};
use crate::models::*;
use crate::services::AuthService;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn session_cookie(token: &str, max_age: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token.to_string())
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age))
        .secure(secure)
        .finish()
}

/// Session token in the body plus the http-only cookie
fn logged_in(response: AuthResponse, app: &AppConfig, message: &str) -> HttpResponse {
    let cookie = session_cookie(&response.token, response.expires_in, !app.is_development());
    HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "data": response,
        "message": message
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid email or already registered", body = ErrorResponse)
    )
)]
pub async fn signup(
    auth_service: web::Data<AuthService>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    match auth_service.signup(request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user,
            "message": "Account created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/send-otp",
    tag = "auth",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = SendOtpResponse),
        (status = 400, description = "Invalid email or already registered", body = ErrorResponse),
        (status = 403, description = "Admin account", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    )
)]
pub async fn send_otp(
    auth_service: web::Data<AuthService>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.send_email_otp(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/send-mobile-otp",
    tag = "auth",
    request_body = SendMobileOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = SendOtpResponse),
        (status = 400, description = "Invalid mobile number or already registered", body = ErrorResponse),
        (status = 403, description = "Admin account", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 502, description = "SMS delivery failed", body = ErrorResponse)
    )
)]
pub async fn send_mobile_otp(
    auth_service: web::Data<AuthService>,
    request: web::Json<SendMobileOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.send_mobile_otp(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = AuthResponse),
        (status = 401, description = "Invalid or expired OTP", body = ErrorResponse)
    )
)]
pub async fn verify_otp(
    auth_service: web::Data<AuthService>,
    app: web::Data<AppConfig>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.verify_email_otp(request.into_inner()).await {
        Ok(response) => Ok(logged_in(response, &app, "Signed in")),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-mobile-otp",
    tag = "auth",
    request_body = VerifyMobileOtpRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = AuthResponse),
        (status = 401, description = "Invalid or expired OTP", body = ErrorResponse)
    )
)]
pub async fn verify_mobile_otp(
    auth_service: web::Data<AuthService>,
    app: web::Data<AppConfig>,
    request: web::Json<VerifyMobileOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.verify_mobile_otp(request.into_inner()).await {
        Ok(response) => Ok(logged_in(response, &app, "Signed in")),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    tag = "auth",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin signed in, session cookie set", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn admin_login(
    auth_service: web::Data<AuthService>,
    app: web::Data<AppConfig>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.admin_login(request.into_inner()).await {
        Ok(response) => Ok(logged_in(response, &app, "Admin signed in")),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> Result<HttpResponse> {
    let mut cookie = Cookie::build(AUTH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "Signed out"
    })))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current session", body = CurrentUserResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn me(req: HttpRequest) -> Result<HttpResponse> {
    match require_claims(&req) {
        Ok(claims) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CurrentUserResponse {
                id: claims.sub,
                email: claims.email,
                role: claims.role,
                expires_at: claims.exp,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .route("/send-otp", web::post().to(send_otp))
            .route("/send-mobile-otp", web::post().to(send_mobile_otp))
            .route("/verify-otp", web::post().to(verify_otp))
            .route("/verify-mobile-otp", web::post().to(verify_mobile_otp))
            .route("/admin/login", web::post().to(admin_login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc", 86_400, true);
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86_400)));
        assert_eq!(cookie.secure(), Some(true));

        let dev = session_cookie("abc", 60, false);
        assert_eq!(dev.secure(), Some(false));
    }
}
