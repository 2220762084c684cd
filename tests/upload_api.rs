#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test;
use common::*;
use image::{ImageFormat, RgbImage};
use serde_json::Value;
use std::io::Cursor;

const BOUNDARY: &str = "----admissions-test-boundary";

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn multipart(category: &str, content_type: &str, file: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{category}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(token: Option<&str>, body: Vec<u8>) -> actix_web::test::TestRequest {
    let mut req = test::TestRequest::post()
        .uri("/api/upload/image")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body);
    if let Some(token) = token {
        req = req.insert_header(bearer(token));
    }
    req
}

#[actix_web::test]
async fn large_photo_is_served_within_bounds() {
    let ctx = setup().await;
    let token = ctx.user_token();
    let app = init_app!(ctx.state);

    let req = upload_request(Some(&token), multipart("students", "image/png", &png(1600, 1200)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/students/"));

    let req = test::TestRequest::get().uri(&url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let served = test::read_body(resp).await;

    let img = image::load_from_memory(&served).unwrap();
    assert!(img.width() <= 800 && img.height() <= 800);
    assert_eq!((img.width(), img.height()), (800, 600));
}

#[actix_web::test]
async fn upload_needs_session_and_image() {
    let ctx = setup().await;
    let token = ctx.user_token();
    let app = init_app!(ctx.state);

    let req = upload_request(None, multipart("students", "image/png", &png(10, 10))).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = upload_request(
        Some(&token),
        multipart("students", "application/pdf", b"%PDF-1.4"),
    )
    .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = upload_request(Some(&token), multipart("teachers", "image/png", &png(10, 10)))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn oversized_file_is_rejected_while_streaming() {
    let ctx = setup().await;
    let token = ctx.user_token();
    let app = init_app!(ctx.state);

    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let req = upload_request(Some(&token), multipart("students", "image/png", &oversized))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("File size must be less than")
    );
}
