//! Template resolution: work out a template image's aspect ratio before layout
//!
//! Resolution is non-fatal. A failed probe leaves the session on its fallback
//! ratio, which still lays out a usable (if imperfectly proportioned) poster.

use crate::loader::AssetLoader;
use crate::session::{CustomizationSession, ResolutionTicket};
use crate::{Error, Result};
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::Arc;

/// Narrowest banner ratio a template may resolve to (1:5)
pub const MIN_ASPECT_RATIO: f64 = 0.2;
/// Widest banner ratio a template may resolve to (5:1)
pub const MAX_ASPECT_RATIO: f64 = 5.0;

/// Pixel size of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or None for degenerate sizes and for ratios
    /// outside `MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO`
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let ratio = self.width as f64 / self.height as f64;
        (MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO)
            .contains(&ratio)
            .then_some(ratio)
    }
}

/// Yields an image's dimensions without displaying it
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<Dimensions>;
}

/// Probe that fetches the bytes and reads only the image header
pub struct DecodingProbe {
    loader: Arc<dyn AssetLoader>,
}

impl DecodingProbe {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self { loader }
    }
}

/// Read width/height from an encoded image's header
pub fn probe_bytes(bytes: &[u8]) -> Result<Dimensions> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::DecodeError(e.to_string()))?;
    if reader.format().is_none() {
        return Err(Error::DecodeError("unrecognised image format".into()));
    }
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| Error::DecodeError(e.to_string()))?;
    Ok(Dimensions { width, height })
}

#[async_trait]
impl ImageProbe for DecodingProbe {
    async fn probe(&self, url: &str) -> Result<Dimensions> {
        let bytes = self.loader.fetch(url).await?;
        probe_bytes(&bytes)
    }
}

/// Outcome of resolving one ticket; hand it back to the owning session
#[derive(Debug)]
pub struct Resolution {
    pub ticket: ResolutionTicket,
    pub outcome: Result<Dimensions>,
}

#[derive(Clone)]
pub struct TemplateResolver {
    probe: Arc<dyn ImageProbe>,
}

impl TemplateResolver {
    pub fn new(probe: Arc<dyn ImageProbe>) -> Self {
        Self { probe }
    }

    pub async fn resolve(&self, ticket: ResolutionTicket) -> Resolution {
        let outcome = self.probe.probe(&ticket.url).await;
        match &outcome {
            Ok(dims) => log::debug!(
                "resolver: {} is {}x{}",
                ticket.url,
                dims.width,
                dims.height
            ),
            Err(e) => log::warn!(
                "resolver: could not size {} ({}); keeping fallback ratio",
                ticket.url,
                e
            ),
        }
        Resolution { ticket, outcome }
    }

    /// Resolve in the background; the view renders with the fallback meanwhile
    pub fn spawn(&self, ticket: ResolutionTicket) -> tokio::task::JoinHandle<Resolution> {
        let this = self.clone();
        tokio::spawn(async move { this.resolve(ticket).await })
    }

    /// Resolve the session's current template inline and apply the result.
    /// Returns true when the ratio changed.
    pub async fn refresh(&self, session: &mut CustomizationSession) -> bool {
        let Some(ticket) = session.pending_ticket() else {
            return false;
        };
        let resolution = self.resolve(ticket).await;
        session.apply_resolution(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::new(w, h);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn aspect_ratio_of_dimensions() {
        assert_eq!(Dimensions::new(300, 200).aspect_ratio(), Some(1.5));
        assert_eq!(Dimensions::new(300, 0).aspect_ratio(), None);
        assert_eq!(Dimensions::new(100, 500).aspect_ratio(), Some(0.2));
        assert_eq!(Dimensions::new(500, 100).aspect_ratio(), Some(5.0));
    }

    #[test]
    fn extreme_sizes_have_no_ratio() {
        assert_eq!(Dimensions::new(1, 60_000).aspect_ratio(), None);
        assert_eq!(Dimensions::new(1, 4_000_000).aspect_ratio(), None);
        assert_eq!(Dimensions::new(60_000, 1).aspect_ratio(), None);
    }

    #[test]
    fn probe_reads_png_header() {
        let dims = probe_bytes(&png_bytes(40, 50)).unwrap();
        assert_eq!(dims, Dimensions::new(40, 50));
    }

    #[test]
    fn probe_rejects_non_images() {
        assert!(matches!(probe_bytes(b"<html></html>"), Err(Error::DecodeError(_))));
    }
}
