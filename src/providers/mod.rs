//! Generation provider abstraction layer.
//!
//! This module defines the [`GenerationProvider`] trait which abstracts the
//! outbound media-generation API, one operation per model kind. The provider
//! is the only collaborator expected to block for non-trivial time; callers
//! must not hold database connections or locks across these calls.

use async_trait::async_trait;

use crate::config::ProviderConfig;

pub mod dummy;
pub mod freepik;

/// Create a generation provider from configuration.
///
/// This is the single point where we convert config into provider instances.
/// Adding a new provider requires adding a match arm here.
pub fn create_provider(config: ProviderConfig) -> Box<dyn GenerationProvider> {
    match config {
        ProviderConfig::Freepik(freepik_config) => Box::new(freepik::FreepikProvider::from(freepik_config)),
        ProviderConfig::Dummy(dummy_config) => Box::new(dummy::DummyProvider::from(dummy_config)),
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur during a provider call
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider API key is not configured")]
    NotConfigured,

    #[error("provider request timed out")]
    Timeout,

    #[error("provider API error: {0}")]
    Api(String),

    #[error("unrecognized provider response shape: {0}")]
    InvalidResponse(String),
}

/// Abstract generation provider interface.
///
/// Each operation takes a prompt (plus a source image reference for the
/// image-to-video case) and returns the result reference (a URL) or a typed
/// failure. Implementations normalize the provider's response; callers never
/// see provider-specific payloads.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a video from a text prompt
    async fn text_to_video(&self, prompt: &str) -> Result<String>;

    /// Animate a source image, guided by a text prompt
    async fn image_to_video(&self, image_url: &str, prompt: &str) -> Result<String>;

    /// Generate an image from a text prompt
    async fn text_to_image(&self, prompt: &str) -> Result<String>;
}

/// Extract the result reference from a provider response body.
///
/// Two response shapes are in the wild: a top-level `result_url` and a
/// top-level `url`, either of which may be nested under a `data` envelope.
/// Anything else is unrecognized and the caller must fail the generation
/// rather than invent a reference.
pub(crate) fn extract_result_url(body: &serde_json::Value) -> Option<String> {
    let candidates = [body, body.get("data").unwrap_or(&serde_json::Value::Null)];
    for value in candidates {
        for key in ["result_url", "url"] {
            if let Some(url) = value.get(key).and_then(|v| v.as_str()) {
                return Some(url.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_result_url_shapes() {
        assert_eq!(
            extract_result_url(&json!({"result_url": "https://cdn.example.com/a.mp4"})),
            Some("https://cdn.example.com/a.mp4".to_string())
        );
        assert_eq!(
            extract_result_url(&json!({"url": "https://cdn.example.com/b.jpg"})),
            Some("https://cdn.example.com/b.jpg".to_string())
        );
        assert_eq!(
            extract_result_url(&json!({"data": {"result_url": "https://cdn.example.com/c.mp4"}})),
            Some("https://cdn.example.com/c.mp4".to_string())
        );
        assert_eq!(
            extract_result_url(&json!({"data": {"url": "https://cdn.example.com/d.jpg"}})),
            Some("https://cdn.example.com/d.jpg".to_string())
        );
    }

    #[test]
    fn test_extract_result_url_prefers_result_url() {
        let body = json!({"result_url": "https://cdn.example.com/first.mp4", "url": "https://cdn.example.com/second.mp4"});
        assert_eq!(extract_result_url(&body), Some("https://cdn.example.com/first.mp4".to_string()));
    }

    #[test]
    fn test_extract_result_url_unrecognized_shapes() {
        assert_eq!(extract_result_url(&json!({})), None);
        assert_eq!(extract_result_url(&json!({"task_id": "abc123"})), None);
        assert_eq!(extract_result_url(&json!({"result_url": 42})), None);
        assert_eq!(extract_result_url(&json!(null)), None);
    }
}
