use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::ImageProbeConfig;

/// Checks that a picture URL currently serves an image.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn is_live(&self, url: &str) -> bool;
}

/// Fetches the URL and accepts a `200 OK` with an `image/*` content type.
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new(config: &ImageProbeConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn is_live(&self, url: &str) -> bool {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "Image probe request failed");
                return false;
            }
        };

        let is_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("image/"));

        debug!(url, status = %response.status(), is_image, "Image probe finished");
        response.status() == StatusCode::OK && is_image
    }
}

/// Accepts every URL. Used when probing is disabled.
pub struct NoopImageProbe;

#[async_trait]
impl ImageProbe for NoopImageProbe {
    async fn is_live(&self, _url: &str) -> bool {
        true
    }
}
