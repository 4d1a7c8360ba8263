//! Gear picture upload backends.
//!
//! `set_pic` hands the member's image source to a [`PicUploader`] and only
//! stores the URL it returns. [`CloudinaryUploader`] pushes the image to a
//! Cloudinary unsigned upload preset; [`PassthroughUploader`] stores the
//! source URL as-is for deployments without an image host.

use async_trait::async_trait;
use gsbot_core::stats::validate_pic_url;
use serde::Deserialize;

use crate::error::UploadError;

/// Turns an image source into a durable public URL.
#[async_trait]
pub trait PicUploader: Send + Sync {
    async fn upload(&self, source: &str) -> Result<String, UploadError>;
}

// ---------------------------------------------------------------------------
// Passthrough
// ---------------------------------------------------------------------------

/// Accepts any http(s) URL and returns it unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughUploader;

#[async_trait]
impl PicUploader for PassthroughUploader {
    async fn upload(&self, source: &str) -> Result<String, UploadError> {
        validate_pic_url(source).map_err(|e| UploadError::InvalidSource(e.to_string()))?;
        Ok(source.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Cloudinary
// ---------------------------------------------------------------------------

const CLOUDINARY_API: &str = "https://api.cloudinary.com/v1_1";

/// Subset of the Cloudinary upload response we use.
#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Uploads through a Cloudinary unsigned preset, tagging each image.
pub struct CloudinaryUploader {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: String,
    tag: String,
}

impl CloudinaryUploader {
    pub fn new(cloud_name: &str, upload_preset: String, tag: String) -> Self {
        Self::with_client(reqwest::Client::new(), cloud_name, upload_preset, tag)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(
        client: reqwest::Client,
        cloud_name: &str,
        upload_preset: String,
        tag: String,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{CLOUDINARY_API}/{cloud_name}/image/upload"),
            upload_preset,
            tag,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PicUploader for CloudinaryUploader {
    async fn upload(&self, source: &str) -> Result<String, UploadError> {
        validate_pic_url(source).map_err(|e| UploadError::InvalidSource(e.to_string()))?;

        let form = [
            ("file", source.trim()),
            ("upload_preset", self.upload_preset.as_str()),
            ("tags", self.tag.as_str()),
        ];
        let response = self.client.post(&self.endpoint).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CloudinaryResponse = response.json().await?;
        parsed
            .secure_url
            .or(parsed.url)
            .ok_or(UploadError::MissingUrl)
    }
}
