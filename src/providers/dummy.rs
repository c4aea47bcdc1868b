//! Dummy generation provider.
//!
//! Succeeds instantly with a configurable result URL, without calling any
//! external service. Useful for development and testing.

use async_trait::async_trait;
use tracing::info;

use crate::config::DummyProviderConfig;
use crate::providers::{GenerationProvider, Result};

pub struct DummyProvider {
    video_url: String,
    image_url: String,
}

impl From<DummyProviderConfig> for DummyProvider {
    fn from(config: DummyProviderConfig) -> Self {
        Self {
            video_url: config.video_url,
            image_url: config.image_url,
        }
    }
}

#[async_trait]
impl GenerationProvider for DummyProvider {
    async fn text_to_video(&self, prompt: &str) -> Result<String> {
        info!("Dummy provider serving text-to-video for prompt: {prompt}");
        Ok(self.video_url.clone())
    }

    async fn image_to_video(&self, image_url: &str, prompt: &str) -> Result<String> {
        info!("Dummy provider serving image-to-video for image {image_url}, prompt: {prompt}");
        Ok(self.video_url.clone())
    }

    async fn text_to_image(&self, prompt: &str) -> Result<String> {
        info!("Dummy provider serving text-to-image for prompt: {prompt}");
        Ok(self.image_url.clone())
    }
}
