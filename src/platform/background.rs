//! Background removal for profile photos
//!
//! Two service contracts exist:
//!
//! - native: JSON `{ "image": "data:image/jpeg;base64,..." }` answered by
//!   `{ "success": bool, "image": "<data url or http url>", "error": "..." }`
//! - web/desktop: multipart upload with field `image`, answered by PNG bytes
//!
//! Both refuse oversized uploads before touching the network and never retry.

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Returns the cut-out image bytes (usually PNG)
    async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>>;
}

#[cfg(feature = "remote")]
pub use remote::{DataUrlRemover, RembgServiceRemover};

#[cfg(feature = "remote")]
mod remote {
    use super::BackgroundRemover;
    use crate::loader::AssetLoader;
    use crate::{BackgroundRemovalConfig, Error, Result, StudioConfig};
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use reqwest::multipart::{Form, Part};
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Serialize)]
    struct DataUrlRequest {
        image: String,
    }

    #[derive(Deserialize)]
    struct DataUrlResponse {
        #[serde(default)]
        success: bool,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        error: Option<String>,
    }

    fn build_client(config: &StudioConfig) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))
    }

    fn endpoint(config: &BackgroundRemovalConfig) -> Result<String> {
        config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| Error::ConfigError("background_removal.endpoint is not set".into()))
    }

    fn check_size(image: &[u8], limit: usize) -> Result<()> {
        if image.is_empty() {
            return Err(Error::BackgroundRemovalError("empty image".into()));
        }
        if image.len() > limit {
            return Err(Error::BackgroundRemovalError(format!(
                "image is {} bytes, limit is {}",
                image.len(),
                limit
            )));
        }
        Ok(())
    }

    fn authorize(req: reqwest::RequestBuilder, token: &Option<String>) -> reqwest::RequestBuilder {
        match token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// JSON data-URL service; the result may point at a URL the loader then fetches
    pub struct DataUrlRemover {
        client: reqwest::Client,
        endpoint: String,
        settings: BackgroundRemovalConfig,
        loader: Arc<dyn AssetLoader>,
    }

    impl DataUrlRemover {
        pub fn new(config: &StudioConfig, loader: Arc<dyn AssetLoader>) -> Result<Self> {
            Ok(Self {
                client: build_client(config)?,
                endpoint: endpoint(&config.background_removal)?,
                settings: config.background_removal.clone(),
                loader,
            })
        }
    }

    #[async_trait]
    impl BackgroundRemover for DataUrlRemover {
        async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>> {
            check_size(image, self.settings.max_upload_bytes)?;
            let body = DataUrlRequest {
                image: format!("data:image/jpeg;base64,{}", STANDARD.encode(image)),
            };
            let req = self
                .client
                .post(&self.endpoint)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&body);
            let res = authorize(req, &self.settings.auth_token).send().await?;
            let status = res.status();
            let raw = res.bytes().await?;
            let parsed: DataUrlResponse = serde_json::from_slice(&raw).map_err(|e| {
                Error::BackgroundRemovalError(format!("unexpected response ({}): {}", status, e))
            })?;
            if !parsed.success {
                return Err(Error::BackgroundRemovalError(
                    parsed
                        .error
                        .unwrap_or_else(|| "Failed to remove background".to_string()),
                ));
            }
            let uri = parsed
                .image
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::BackgroundRemovalError("response carried no image".into()))?;
            log::debug!("background: result is {} chars", uri.len());
            self.loader.fetch(&uri).await
        }
    }

    /// Multipart upload to a rembg-style service returning PNG bytes
    pub struct RembgServiceRemover {
        client: reqwest::Client,
        endpoint: String,
        settings: BackgroundRemovalConfig,
    }

    impl RembgServiceRemover {
        pub fn new(config: &StudioConfig) -> Result<Self> {
            Ok(Self {
                client: build_client(config)?,
                endpoint: endpoint(&config.background_removal)?,
                settings: config.background_removal.clone(),
            })
        }
    }

    #[async_trait]
    impl BackgroundRemover for RembgServiceRemover {
        async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>> {
            check_size(image, self.settings.max_upload_bytes)?;
            let part = Part::bytes(image.to_vec())
                .file_name("image.jpg")
                .mime_str("image/jpeg")?;
            let form = Form::new().part("image", part);
            let req = self.client.post(&self.endpoint).multipart(form);
            let res = authorize(req, &self.settings.auth_token).send().await?;
            let status = res.status();
            if !status.is_success() {
                let text = res.text().await.unwrap_or_default();
                return Err(Error::BackgroundRemovalError(format!("service returned {}: {}", status, text)));
            }
            let bytes = res.bytes().await?.to_vec();
            if !bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
                return Err(Error::BackgroundRemovalError("service did not return a PNG".into()));
            }
            Ok(bytes)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::loader::DefaultAssetLoader;

        fn config(limit: usize) -> StudioConfig {
            let mut c = StudioConfig::default();
            c.background_removal.endpoint = Some("http://127.0.0.1:9/remove-bg".into());
            c.background_removal.max_upload_bytes = limit;
            c
        }

        #[test]
        fn missing_endpoint_is_a_config_error() {
            let c = StudioConfig::default();
            assert!(matches!(RembgServiceRemover::new(&c), Err(Error::ConfigError(_))));
        }

        #[tokio::test]
        async fn oversized_upload_is_refused_locally() {
            let c = config(4);
            let loader = Arc::new(DefaultAssetLoader::new(&c).unwrap());
            let remover = DataUrlRemover::new(&c, loader).unwrap();
            let err = remover.remove_background(&[0u8; 5]).await.unwrap_err();
            assert!(matches!(err, Error::BackgroundRemovalError(_)));

            let rembg = RembgServiceRemover::new(&c).unwrap();
            assert!(rembg.remove_background(&[]).await.is_err());
        }
    }
}
