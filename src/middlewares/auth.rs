use crate::error::{AppError, AppResult};
use crate::utils::{Claims, JwtService};
use actix_web::body::EitherBody;
use actix_web::http::Method;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Cookie set on successful login
pub const AUTH_COOKIE: &str = "auth-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

// Anything not listed is public; public routes still see the caller when a token is present
struct AccessRules {
    admin_prefixes: Vec<&'static str>,
    protected_exact: Vec<&'static str>,
    protected_prefixes: Vec<&'static str>,
}

impl AccessRules {
    fn new() -> Self {
        Self {
            admin_prefixes: vec!["/api/admin"],
            protected_exact: vec!["/api/auth/me", "/api/admissions/mine"],
            protected_prefixes: vec!["/api/upload/"],
        }
    }

    fn access_for(&self, path: &str) -> Access {
        if self.admin_prefixes.iter().any(|p| path.starts_with(p)) {
            return Access::Admin;
        }
        if self.protected_exact.contains(&path)
            || self.protected_prefixes.iter().any(|p| path.starts_with(p))
        {
            return Access::Authenticated;
        }
        Access::Public
    }
}

/// Bearer header first, then the session cookie
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        req.cookie(AUTH_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            rules: AccessRules::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    rules: AccessRules,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let access = self.rules.access_for(req.path());
        let token = extract_token(&req);
        let claims = token
            .as_deref()
            .map(|t| self.jwt_service.verify_token(t));

        let rejection = match (access, claims) {
            (_, Some(Ok(claims))) => {
                if access == Access::Admin && !claims.is_admin() {
                    Some(AppError::Forbidden("Admin access required".to_string()))
                } else {
                    req.extensions_mut().insert(claims);
                    None
                }
            }
            (Access::Public, _) => None,
            (_, Some(Err(_))) => Some(AppError::AuthError("Invalid or expired token".to_string())),
            (_, None) => Some(AppError::AuthError("Authentication required".to_string())),
        };

        match rejection {
            None => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Some(error) => {
                log::warn!("Rejected {} {}: {error}", req.method(), req.path());
                Box::pin(async move { Ok(req.error_response(error).map_into_right_body()) })
            }
        }
    }
}

/// Claims attached by the middleware, if the caller presented a valid token
pub fn current_claims(req: &HttpRequest) -> Option<Claims> {
    req.extensions().get::<Claims>().cloned()
}

pub fn require_claims(req: &HttpRequest) -> AppResult<Claims> {
    current_claims(req).ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::users::UserRole;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use uuid::Uuid;

    fn jwt() -> JwtService {
        JwtService::new("middleware-secret", 3600, 3600)
    }

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match current_claims(&req) {
            Some(claims) => HttpResponse::Ok().body(claims.sub),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn test_rules() {
        let rules = AccessRules::new();
        assert_eq!(rules.access_for("/api/admin/enquiries"), Access::Admin);
        assert_eq!(rules.access_for("/api/auth/admin/login"), Access::Public);
        assert_eq!(rules.access_for("/api/auth/me"), Access::Authenticated);
        assert_eq!(rules.access_for("/api/upload/image"), Access::Authenticated);
        assert_eq!(rules.access_for("/api/enquiry/submit"), Access::Public);
    }

    #[actix_web::test]
    async fn test_admin_routes_need_admin_role() {
        let jwt = jwt();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/api/admin/ping", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/admin/ping").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let user = jwt.generate_token(Uuid::new_v4(), None, UserRole::User).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/admin/ping")
            .insert_header((AUTHORIZATION, format!("Bearer {}", user.token)))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let admin = jwt.generate_token(Uuid::new_v4(), None, UserRole::Admin).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/admin/ping")
            .cookie(Cookie::new(AUTH_COOKIE, admin.token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_public_routes_see_optional_caller() {
        let jwt = jwt();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/api/enquiry/submit", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/enquiry/submit")
            .insert_header((AUTHORIZATION, "Bearer garbage"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous");

        let id = Uuid::new_v4();
        let token = jwt.generate_token(id, None, UserRole::User).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/enquiry/submit")
            .insert_header((AUTHORIZATION, format!("Bearer {}", token.token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, id.to_string());
    }
}
