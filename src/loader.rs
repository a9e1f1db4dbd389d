//! Asset loading for template images, profile photos and service responses
//!
//! Accepted URIs: `data:` (base64), `file://`, bare filesystem paths and,
//! with the `remote` feature, `http(s)://`.

use crate::{Error, Result, StudioConfig};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::PathBuf;
use url::Url;

#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Fetch the raw bytes behind `uri`
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>>;
}

/// Where an asset URI points
#[derive(Debug, Clone, PartialEq)]
pub enum AssetLocation {
    Data { mime: String, payload: String },
    File(PathBuf),
    Remote(Url),
}

/// Classify a URI without touching the filesystem or network
pub fn locate(uri: &str) -> Result<AssetLocation> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(Error::LoadError("empty asset uri".into()));
    }
    if let Some(rest) = uri.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::LoadError("malformed data uri".into()))?;
        let mime = meta.strip_suffix(";base64").ok_or_else(|| {
            Error::LoadError("only base64 data uris are supported".into())
        })?;
        return Ok(AssetLocation::Data {
            mime: mime.to_string(),
            payload: payload.to_string(),
        });
    }
    match Url::parse(uri) {
        Ok(url) => match url.scheme() {
            "file" => url
                .to_file_path()
                .map(AssetLocation::File)
                .map_err(|_| Error::LoadError(format!("invalid file url: {}", uri))),
            "http" | "https" => Ok(AssetLocation::Remote(url)),
            // Windows drive letters parse as a one-letter scheme
            s if s.len() == 1 => Ok(AssetLocation::File(PathBuf::from(uri))),
            other => Err(Error::LoadError(format!("unsupported scheme '{}' in {}", other, uri))),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(AssetLocation::File(PathBuf::from(uri))),
        Err(e) => Err(Error::LoadError(format!("invalid uri {}: {}", uri, e))),
    }
}

pub fn decode_data_payload(payload: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::DecodeError(format!("invalid base64 payload: {}", e)))
}

/// Loader used by every platform kind
pub struct DefaultAssetLoader {
    #[cfg(feature = "remote")]
    client: reqwest::Client,
}

impl DefaultAssetLoader {
    pub fn new(config: &StudioConfig) -> Result<Self> {
        #[cfg(feature = "remote")]
        {
            let client = reqwest::Client::builder()
                .timeout(std::time::Duration::from_millis(config.timeout_ms))
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;
            Ok(Self { client })
        }

        #[cfg(not(feature = "remote"))]
        {
            let _ = config;
            Ok(Self {})
        }
    }
}

#[async_trait]
impl AssetLoader for DefaultAssetLoader {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>> {
        match locate(uri)? {
            AssetLocation::Data { payload, .. } => decode_data_payload(&payload),
            AssetLocation::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e))),
            AssetLocation::Remote(url) => {
                #[cfg(feature = "remote")]
                {
                    let res = self.client.get(url.clone()).send().await?;
                    if !res.status().is_success() {
                        return Err(Error::NetworkError(format!("GET {} returned {}", url, res.status())));
                    }
                    Ok(res.bytes().await?.to_vec())
                }

                #[cfg(not(feature = "remote"))]
                {
                    Err(Error::LoadError(format!(
                        "remote assets need the `remote` feature: {}",
                        url
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_classifies_uris() {
        assert!(matches!(locate("https://example.com/a.jpg").unwrap(), AssetLocation::Remote(_)));
        assert_eq!(
            locate("/tmp/photo.png").unwrap(),
            AssetLocation::File(PathBuf::from("/tmp/photo.png"))
        );
        assert_eq!(
            locate("photos/me.jpg").unwrap(),
            AssetLocation::File(PathBuf::from("photos/me.jpg"))
        );
        match locate("data:image/png;base64,AAAA").unwrap() {
            AssetLocation::Data { mime, payload } => {
                assert_eq!(mime, "image/png");
                assert_eq!(payload, "AAAA");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn locate_rejects_garbage() {
        assert!(locate("").is_err());
        assert!(locate("ftp://example.com/a.png").is_err());
        assert!(locate("data:image/png,raw").is_err());
    }

    #[tokio::test]
    async fn fetch_data_and_file_uris() {
        let loader = DefaultAssetLoader::new(&StudioConfig::default()).unwrap();
        let bytes = loader.fetch("data:text/plain;base64,aGVsbG8=").await.unwrap();
        assert_eq!(bytes, b"hello");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asset.bin");
        std::fs::write(&path, b"abc").unwrap();
        let bytes = loader.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"abc");

        let missing = loader.fetch(dir.path().join("nope").to_str().unwrap()).await;
        assert!(matches!(missing, Err(Error::LoadError(_))));
    }
}
