use async_trait::async_trait;

/// Accepted video length window, in seconds. Outside the window the upload
/// is kept but the video is not attached, and the caller gets a warning.
pub const VIDEO_MIN_SECONDS: u32 = 30;
pub const VIDEO_MAX_SECONDS: u32 = 90;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub url: String,
    pub duration_seconds: u32,
}

/// External media host. Uploads are synchronous from the engine's point of
/// view; a failed required upload aborts listing creation before any row
/// is written.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload_image(&self, filename: &str, bytes: &[u8]) -> Result<String, MediaError>;

    async fn upload_video(&self, filename: &str, bytes: &[u8]) -> Result<VideoUpload, MediaError>;
}

/// Non-fatal duration check for uploaded videos.
pub fn video_duration_warning(duration_seconds: u32) -> Option<String> {
    if (VIDEO_MIN_SECONDS..=VIDEO_MAX_SECONDS).contains(&duration_seconds) {
        None
    } else {
        Some(format!(
            "video duration must be between {}-{} seconds, got {} seconds",
            VIDEO_MIN_SECONDS, VIDEO_MAX_SECONDS, duration_seconds
        ))
    }
}

/// Deterministic uploader for tests and local runs.
pub struct MockUploader {
    pub base_url: String,
    /// Duration reported for every video upload.
    pub video_duration_seconds: u32,
}

impl Default for MockUploader {
    fn default() -> Self {
        Self {
            base_url: "https://media.test".to_string(),
            video_duration_seconds: 45,
        }
    }
}

#[async_trait]
impl MediaUploader for MockUploader {
    async fn upload_image(&self, filename: &str, _bytes: &[u8]) -> Result<String, MediaError> {
        Ok(format!("{}/images/{}", self.base_url, filename))
    }

    async fn upload_video(&self, filename: &str, _bytes: &[u8]) -> Result<VideoUpload, MediaError> {
        Ok(VideoUpload {
            url: format!("{}/videos/{}", self.base_url, filename),
            duration_seconds: self.video_duration_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_window_is_inclusive() {
        assert!(video_duration_warning(30).is_none());
        assert!(video_duration_warning(90).is_none());
        assert!(video_duration_warning(29).is_some());
        assert!(video_duration_warning(91).is_some());
    }

    #[tokio::test]
    async fn mock_uploader_is_deterministic() {
        let uploader = MockUploader::default();
        let url = uploader.upload_image("front.jpg", b"...").await.unwrap();
        assert_eq!(url, "https://media.test/images/front.jpg");

        let video = uploader.upload_video("tour.mp4", b"...").await.unwrap();
        assert_eq!(video.duration_seconds, 45);
        assert!(video_duration_warning(video.duration_seconds).is_none());
    }
}
