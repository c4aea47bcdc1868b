//! Freepik generation provider.
//!
//! A thin reqwest client over the Freepik generation endpoints. Responses
//! may carry a result reference as `result_url` or `url`; anything else is a
//! typed failure, never a fabricated reference.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use crate::config::FreepikConfig;
use crate::providers::{GenerationProvider, ProviderError, Result, extract_result_url};

pub struct FreepikProvider {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: Url,
}

impl From<FreepikConfig> for FreepikProvider {
    fn from(config: FreepikConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url,
        }
    }
}

impl FreepikProvider {
    /// POST a generation request and normalize the response to a result URL
    #[instrument(skip(self, body), err)]
    async fn post_generation(&self, path: &str, body: serde_json::Value) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;

        let url = self
            .base_url
            .join(path)
            .map_err(|e| ProviderError::Api(format!("invalid endpoint path {path}: {e}")))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("provider returned {status}: {body}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("not valid JSON: {e}")))?;

        debug!("Provider response received from {path}");

        extract_result_url(&payload).ok_or_else(|| ProviderError::InvalidResponse(payload.to_string()))
    }
}

#[async_trait]
impl GenerationProvider for FreepikProvider {
    async fn text_to_video(&self, prompt: &str) -> Result<String> {
        self.post_generation("/v1/video/text-to-video", json!({ "prompt": prompt })).await
    }

    async fn image_to_video(&self, image_url: &str, prompt: &str) -> Result<String> {
        self.post_generation("/v1/video/image-to-video", json!({ "image_url": image_url, "prompt": prompt }))
            .await
    }

    async fn text_to_image(&self, prompt: &str) -> Result<String> {
        self.post_generation("/v1/image/text-to-image", json!({ "prompt": prompt })).await
    }
}
