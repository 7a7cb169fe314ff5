//! Review gateway: submit code as text or as an uploaded file.

use serde::Deserialize;

use crate::client::{ApiClient, MultipartPart, RequestBody, RequestOptions, ScopedClient};
use crate::domain::ApiResult;

/// Path prefix for the review endpoints.
pub const REVIEW_PREFIX: &str = "/review";

/// Review produced by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewResponse {
    /// Review text.
    pub review: String,
    /// Identifier the submitted code was stored under.
    pub code_id: String,
    /// Language the backend detected, for file submissions.
    #[serde(default)]
    pub detected_language: Option<String>,
    /// Frameworks the backend detected, for file submissions.
    #[serde(default)]
    pub detected_frameworks: Option<Vec<String>>,
}

/// Typed access to the `/review` endpoints.
#[derive(Debug, Clone)]
pub struct ReviewGateway {
    http: ScopedClient,
}

impl ReviewGateway {
    /// Gateway over `client`, scoped to [`REVIEW_PREFIX`].
    #[must_use]
    pub fn new(client: &ApiClient) -> Self {
        Self {
            http: client.endpoint(REVIEW_PREFIX),
        }
    }

    /// `POST /review/text` with multipart field `code`.
    ///
    /// # Errors
    /// Returns the normalised [`crate::domain::ApiError`].
    pub async fn review_code_text(&self, code: &str) -> ApiResult<ReviewResponse> {
        let parts = vec![MultipartPart::Text {
            name: "code".to_owned(),
            value: code.to_owned(),
        }];
        self.http
            .post("/text", RequestBody::Multipart(parts), RequestOptions::default())
            .await
    }

    /// `POST /review/file` with multipart file field `file`.
    ///
    /// # Errors
    /// Returns the normalised [`crate::domain::ApiError`]; unsupported file
    /// types arrive as a 400 request error.
    pub async fn review_code_file(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<ReviewResponse> {
        let parts = vec![MultipartPart::File {
            name: "file".to_owned(),
            file_name: file_name.to_owned(),
            bytes,
        }];
        self.http
            .post("/file", RequestBody::Multipart(parts), RequestOptions::default())
            .await
    }
}
