#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use admissions_backend::entities::users;
use chrono::{Duration, Utc};
use common::*;
use sea_orm::sea_query::Expr;
use sea_orm::EntityTrait;
use serde_json::{Value, json};

#[actix_web::test]
async fn otp_signs_in_once_and_sets_cookie() {
    let ctx = setup().await;
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/auth/send-otp")
        .set_json(json!({"email": "Parent@Example.com", "isSignIn": false}))
        .to_request();
    let sent: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(sent["success"], true);
    let otp = sent["data"]["otp"].as_str().unwrap().to_string();
    assert_eq!(otp.len(), 6);

    let verify = || {
        test::TestRequest::post()
            .uri("/api/auth/verify-otp")
            .set_json(json!({"email": "parent@example.com", "otp": otp}))
            .to_request()
    };

    let resp = test::call_service(&app, verify()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "auth-token")
        .expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));
    let body: Value = test::read_body_json(resp).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["expiresIn"], 604_800);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["data"]["role"], "user");
    assert_eq!(me["data"]["email"], "parent@example.com");

    let second = test::call_service(&app, verify()).await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn expired_otp_is_rejected() {
    let ctx = setup().await;
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/auth/send-otp")
        .set_json(json!({"email": "late@example.com"}))
        .to_request();
    let sent: Value = test::call_and_read_body_json(&app, req).await;
    let otp = sent["data"]["otp"].as_str().unwrap().to_string();

    users::Entity::update_many()
        .col_expr(
            users::Column::OtpExpiresAt,
            Expr::value(Some(Utc::now() - Duration::seconds(1))),
        )
        .exec(&ctx.pool)
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/auth/verify-otp")
        .set_json(json!({"email": "late@example.com", "otp": otp}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Invalid or expired OTP");
}

#[actix_web::test]
async fn sign_in_requires_existing_account() {
    let ctx = setup().await;
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/auth/send-mobile-otp")
        .set_json(json!({"mobile": "98765 43210", "isSignIn": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/auth/send-mobile-otp")
        .set_json(json!({"mobile": "12345"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_uses_password_not_otp() {
    let ctx = setup().await;
    ctx.admin_token().await;
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/auth/send-otp")
        .set_json(json!({"email": ADMIN_EMAIL, "isSignIn": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/auth/admin/login")
        .set_json(json!({"email": ADMIN_EMAIL, "password": "wrong password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/admin/login")
        .set_json(json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert_eq!(body["data"]["expiresIn"], 86_400);
}

#[actix_web::test]
async fn me_requires_a_session() {
    let ctx = setup().await;
    let app = init_app!(ctx.state);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
