use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::utils::generate_file_suffix;
use chrono::Utc;
use image::GenericImageView;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use utoipa::ToSchema;

/// Longest edge a stored photo may have
pub const MAX_DIMENSION: u32 = 800;
pub const JPEG_QUALITY: u8 = 85;
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadCategory {
    Students,
    Fathers,
    Mothers,
}

impl UploadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::Students => "students",
            UploadCategory::Fathers => "fathers",
            UploadCategory::Mothers => "mothers",
        }
    }
}

impl FromStr for UploadCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "students" | "student" => Ok(UploadCategory::Students),
            "fathers" | "father" => Ok(UploadCategory::Fathers),
            "mothers" | "mother" => Ok(UploadCategory::Mothers),
            _ => Err(AppError::ValidationError(
                "Type must be one of: students, fathers, mothers".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadedImage {
    #[schema(example = "/uploads/students/1735689600000-k3j9x2m4q8wz.jpg")]
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone)]
pub struct UploadService {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            max_bytes: config.max_bytes,
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Checks the declared type and size before any decoding happens
    pub fn check(&self, content_type: Option<&str>, len: usize) -> AppResult<()> {
        if len == 0 {
            return Err(AppError::ValidationError("No file uploaded".to_string()));
        }
        if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
            return Err(AppError::ValidationError(
                "Only image files are allowed".to_string(),
            ));
        }
        if len > self.max_bytes {
            return Err(self.too_large());
        }
        Ok(())
    }

    pub fn too_large(&self) -> AppError {
        AppError::ValidationError(format!(
            "File size must be less than {}MB",
            self.max_bytes / (1024 * 1024)
        ))
    }

    pub async fn save_image(
        &self,
        category: UploadCategory,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> AppResult<UploadedImage> {
        self.check(content_type, bytes.len())?;

        let (encoded, width, height) = tokio::task::spawn_blocking(move || reencode(&bytes))
            .await
            .map_err(|e| AppError::InternalError(format!("Image task failed: {e}")))??;

        let folder = self.dir.join(category.as_str());
        tokio::fs::create_dir_all(&folder).await?;

        let file_name = format!(
            "{}-{}.jpg",
            Utc::now().timestamp_millis(),
            generate_file_suffix(12)
        );
        tokio::fs::write(folder.join(&file_name), encoded).await?;

        let url = format!("{PUBLIC_PREFIX}/{}/{file_name}", category.as_str());
        log::info!("Stored {width}x{height} image at {url}");
        Ok(UploadedImage { url, width, height })
    }
}

/// Decodes any supported format, shrinks it to fit the bounding box and writes a JPEG
fn reencode(bytes: &[u8]) -> AppResult<(Vec<u8>, u32, u32)> {
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        log::warn!("Rejected undecodable upload: {e}");
        AppError::ValidationError("Uploaded file is not a valid image".to_string())
    })?;

    let (w, h) = decoded.dimensions();
    let fitted = if w > MAX_DIMENSION || h > MAX_DIMENSION {
        decoded.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        decoded
    };

    let rgb = fitted.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;

    Ok((out, rgb.width(), rgb.height()))
}
