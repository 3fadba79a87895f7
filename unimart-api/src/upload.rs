use axum::extract::Multipart;
use serde_json::{Map, Value};

use unimart_core::{media::video_duration_warning, MediaUploader, VideoUpload};

use crate::error::AppError;

/// A multipart listing form split into its text fields and media parts.
pub struct ListingForm {
    pub fields: Map<String, Value>,
    pub images: Vec<(String, Vec<u8>)>,
    pub video: Option<(String, Vec<u8>)>,
}

/// Drain a multipart body. Parts named `image` (repeatable) and `video`
/// are media; everything else is treated as a text field.
pub async fn read_listing_form(mut multipart: Multipart) -> Result<ListingForm, AppError> {
    let mut fields = Map::new();
    let mut images = Vec::new();
    let mut video = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::ValidationError(e.to_string()))?;
                images.push((filename, bytes.to_vec()));
            }
            "video" => {
                let filename = field.file_name().unwrap_or("video").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::ValidationError(e.to_string()))?;
                video = Some((filename, bytes.to_vec()));
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::ValidationError(e.to_string()))?;
                if !text.is_empty() {
                    fields.insert(name, Value::String(text));
                }
            }
        }
    }

    Ok(ListingForm {
        fields,
        images,
        video,
    })
}

/// Upload every image; a single failure aborts listing creation before any
/// row is written.
pub async fn upload_images(
    uploader: &dyn MediaUploader,
    images: &[(String, Vec<u8>)],
) -> Result<Vec<String>, AppError> {
    let mut urls = Vec::with_capacity(images.len());
    for (filename, bytes) in images {
        urls.push(uploader.upload_image(filename, bytes).await?);
    }
    Ok(urls)
}

/// Upload the optional video. Outside the accepted duration window the
/// upload is dropped from the listing and the warning is surfaced instead;
/// creation itself proceeds.
pub async fn upload_video(
    uploader: &dyn MediaUploader,
    video: Option<(String, Vec<u8>)>,
) -> Result<(Option<VideoUpload>, Option<String>), AppError> {
    let Some((filename, bytes)) = video else {
        return Ok((None, None));
    };
    let upload = uploader.upload_video(&filename, &bytes).await?;
    match video_duration_warning(upload.duration_seconds) {
        None => Ok((Some(upload), None)),
        Some(warning) => {
            tracing::warn!(%filename, "video rejected: {}", warning);
            Ok((None, Some(warning)))
        }
    }
}
