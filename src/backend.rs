use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Response from the profile-image upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UploadedImage {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// HTTP client for the VidTube backend's profile surface.
///
/// On a successful upload the caller feeds the returned URL into
/// `SessionReconciler::update_avatar`.
pub struct BackendClient {
    base_url: Url,
    http: reqwest::Client,
}

impl BackendClient {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Upload a profile image as multipart form data with bearer
    /// authorization. Returns the CDN URL the backend stored it under.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, [`Error::Backend`] when
    /// the endpoint answers non-2xx or the endpoint URL cannot be built.
    pub async fn upload_profile_image(
        &self,
        bearer_token: &str,
        image: Vec<u8>,
        file_name: &str,
        mime_type: &str,
    ) -> Result<UploadedImage, Error> {
        let url = self.endpoint("upload-profile")?;

        let part = Part::bytes(image)
            .file_name(file_name.to_owned())
            .mime_str(mime_type)
            .map_err(|e| Error::Backend {
                operation: "profile image upload",
                status: None,
                detail: format!("invalid mime type: {e}"),
            })?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(url)
            .bearer_auth(bearer_token)
            .multipart(form)
            .send()
            .await?;

        let response = Self::ensure_success(response, "profile image upload").await?;
        response.json::<UploadedImage>().await.map_err(Into::into)
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(|e| Error::Backend {
            operation: "endpoint url",
            status: None,
            detail: e.to_string(),
        })
    }

    /// Checks HTTP response status; returns the response on success or an
    /// error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Backend {
            operation,
            status: Some(status),
            detail: body,
        })
    }
}
