//! Client for the external face-verification service.
//!
//! Matching is entirely delegated: the service runs the recognition model
//! and shares the media volume with this app, so requests carry image paths
//! rather than image bytes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum FaceVerifyError {
    #[error("face service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("face service error ({status}): {message}")]
    Service { status: u16, message: String },
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    known_image: &'a str,
    candidate_image: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    verified: bool,
}

#[derive(Clone)]
pub struct FaceVerifyClient {
    http: reqwest::Client,
    base_url: String,
}

impl FaceVerifyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build face verify http client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Compare a stored face against a fresh capture. `Ok(true)` means the
    /// service judged them the same person.
    pub async fn verify(&self, known: &Path, candidate: &Path) -> Result<bool, FaceVerifyError> {
        let request = VerifyRequest {
            known_image: &known.to_string_lossy(),
            candidate_image: &candidate.to_string_lossy(),
        };

        let response = self
            .http
            .post(format!("{}/verify", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FaceVerifyError::Service { status, message });
        }

        let verdict = response.json::<VerifyResponse>().await?;
        Ok(verdict.verified)
    }
}
