//! Rasterization capability: turn the mounted composition view into an image file

use crate::rendering::CompositionView;
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// Lossless
    Png,
    Jpeg,
}

impl CaptureFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            CaptureFormat::Png => "png",
            CaptureFormat::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    pub format: CaptureFormat,
    /// 0.0..=1.0; only JPEG uses it
    pub quality: f32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            format: CaptureFormat::Png,
            quality: 1.0,
        }
    }
}

/// A rasterized poster on disk, owned by persistence until discarded
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedArtifact {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: CaptureFormat,
    /// Hex SHA-256 of the encoded file
    pub digest: String,
}

impl CapturedArtifact {
    /// Remove the temporary file
    pub fn discard(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::debug!("capture: could not remove {}: {}", self.path.display(), e);
        }
    }
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Capture the view; it must be mounted and laid out
    async fn capture(&self, view: &CompositionView, options: &CaptureOptions) -> Result<CapturedArtifact>;
}

/// Encode pixels in the requested format; the output carries no timestamps
pub fn encode(pixels: &RgbaImage, options: &CaptureOptions) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    match options.format {
        CaptureFormat::Png => pixels
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| Error::CaptureError(format!("png encoding failed: {}", e)))?,
        CaptureFormat::Jpeg => {
            let quality = (options.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, quality)
                .encode_image(&rgb)
                .map_err(|e| Error::CaptureError(format!("jpeg encoding failed: {}", e)))?;
        }
    }
    Ok(buf.into_inner())
}

pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// CPU rasterizer writing captures into a scratch directory
pub struct SoftwareRasterizer {
    output_dir: PathBuf,
    seq: AtomicU64,
}

impl SoftwareRasterizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn next_path(&self, format: CaptureFormat) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.output_dir
            .join(format!("poster-{}-{}.{}", millis, seq, format.extension()))
    }
}

#[async_trait]
impl Rasterizer for SoftwareRasterizer {
    async fn capture(&self, view: &CompositionView, options: &CaptureOptions) -> Result<CapturedArtifact> {
        if !view.is_mounted() {
            return Err(Error::CaptureError("composition view is not mounted".into()));
        }
        let pixels = view
            .render()
            .map_err(|e| Error::CaptureError(e.to_string()))?;
        let bytes = encode(&pixels, options)?;
        let digest = digest(&bytes);

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::CaptureError(format!("{}: {}", self.output_dir.display(), e)))?;
        let path = self.next_path(options.format);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| Error::CaptureError(format!("{}: {}", path.display(), e)))?;

        log::debug!(
            "capture: wrote {}x{} {} ({} bytes)",
            pixels.width(),
            pixels.height(),
            path.display(),
            bytes.len()
        );
        Ok(CapturedArtifact {
            path,
            width: pixels.width(),
            height: pixels.height(),
            format: options.format,
            digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PosterTemplate;
    use crate::session::CustomizationSession;
    use crate::CampaignText;

    fn mounted_view() -> CompositionView {
        let mut s = CustomizationSession::open(PosterTemplate::new("t", "Rally", "Events", 0, None), 1.5);
        s.set_name("Ramesh Yadav");
        s.set_role("Booth Adhyaksh");
        let mut view = CompositionView::new(240, CampaignText::default());
        view.update(&s);
        view
    }

    #[tokio::test]
    async fn captures_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let r = SoftwareRasterizer::new(dir.path());
        let view = mounted_view();
        let a = r.capture(&view, &CaptureOptions::default()).await.unwrap();
        let b = r.capture(&view, &CaptureOptions::default()).await.unwrap();
        assert_ne!(a.path, b.path);
        assert_eq!(a.digest, b.digest);
        assert_eq!(std::fs::read(&a.path).unwrap(), std::fs::read(&b.path).unwrap());
        assert_eq!((a.width, a.height), (240, 160 + 82));
    }

    #[tokio::test]
    async fn unmounted_view_is_a_capture_error() {
        let dir = tempfile::tempdir().unwrap();
        let r = SoftwareRasterizer::new(dir.path());
        let view = CompositionView::new(240, CampaignText::default());
        let err = r.capture(&view, &CaptureOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::CaptureError(_)));
    }

    #[tokio::test]
    async fn jpeg_capture_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let r = SoftwareRasterizer::new(dir.path().join("nested"));
        let opts = CaptureOptions {
            format: CaptureFormat::Jpeg,
            quality: 0.9,
        };
        let a = r.capture(&mounted_view(), &opts).await.unwrap();
        assert!(a.path.extension().is_some_and(|e| e == "jpg"));
        let bytes = std::fs::read(&a.path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        a.discard();
        assert!(!a.path.exists());
    }
}
