use crate::error::{AppError, AppResult};
use crate::services::{UploadCategory, UploadService, UploadedImage};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, ResponseError, Result, web};
use futures_util::StreamExt;
use serde_json::json;
use utoipa::ToSchema;

/// Multipart body as documented in the API schema
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageForm {
    /// students (default), fathers or mothers
    category: Option<UploadCategory>,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// The `file` part, plus the optional `category` text part
struct ImageForm {
    category: UploadCategory,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_form(mut payload: Multipart, upload_service: &UploadService) -> AppResult<ImageForm> {
    let bad_form = |e: actix_multipart::MultipartError| {
        AppError::ValidationError(format!("Malformed upload: {e}"))
    };

    let mut form = ImageForm {
        category: UploadCategory::Students,
        content_type: None,
        bytes: Vec::new(),
    };

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(bad_form)?;
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some("file") => {
                form.content_type = field.content_type().map(|m| m.to_string());
                while let Some(chunk) = field.next().await {
                    form.bytes.extend_from_slice(&chunk.map_err(bad_form)?);
                    if form.bytes.len() > upload_service.max_bytes() {
                        return Err(upload_service.too_large());
                    }
                }
            }
            Some("category") | Some("type") => {
                let mut value = Vec::new();
                while let Some(chunk) = field.next().await {
                    value.extend_from_slice(&chunk.map_err(bad_form)?);
                }
                form.category = String::from_utf8_lossy(&value).parse()?;
            }
            _ => {
                // drain unknown parts
                while let Some(chunk) = field.next().await {
                    chunk.map_err(bad_form)?;
                }
            }
        }
    }

    Ok(form)
}

async fn store(upload_service: &UploadService, payload: Multipart) -> AppResult<UploadedImage> {
    let form = read_form(payload, upload_service).await?;
    upload_service
        .save_image(form.category, form.content_type.as_deref(), form.bytes)
        .await
}

#[utoipa::path(
    post,
    path = "/api/upload/image",
    tag = "upload",
    security(
        ("bearer_auth" = [])
    ),
    request_body(content = UploadImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored photo", body = UploadedImage),
        (status = 400, description = "Not an image, too large or undecodable", body = crate::models::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::models::ErrorResponse)
    )
)]
pub async fn upload_image(
    upload_service: web::Data<UploadService>,
    payload: Multipart,
) -> Result<HttpResponse> {
    match store(&upload_service, payload).await {
        Ok(image) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": image,
            "url": image.url,
            "message": "Image uploaded"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn upload_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/upload").route("/image", web::post().to(upload_image)));
}
