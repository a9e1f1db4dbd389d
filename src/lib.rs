//! Poster Studio
//!
//! Compose campaign posters from a template image and a volunteer's details,
//! rasterize the composition and save it into a device photo album.
//!
//! # Features
//!
//! - **Template resolution**: the banner's aspect ratio is probed from the
//!   template image header, with a stale-result guard keyed on the template
//! - **Live composition**: a deterministic layout/paint/raster pipeline that
//!   renders exactly what gets exported
//! - **Capture and persist**: a re-entrant state machine over pluggable
//!   permission, rasterizer and media library capabilities
//! - **Remote backends** (default `remote` feature): HTTP assets, HTTP
//!   template catalog, background removal services
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use posterkit::catalog::{InMemoryCatalog, TemplateSource};
//! use posterkit::loader::DefaultAssetLoader;
//! use posterkit::resolver::{DecodingProbe, TemplateResolver};
//! use posterkit::rendering::CompositionView;
//! use posterkit::session::CustomizationSession;
//! use posterkit::StudioConfig;
//!
//! # async fn run() -> posterkit::Result<()> {
//! let config = StudioConfig::default();
//! let catalog = InMemoryCatalog::builtin();
//! let template = catalog.find("akhilesh-poster").expect("builtin template");
//!
//! let loader = Arc::new(DefaultAssetLoader::new(&config)?);
//! let resolver = TemplateResolver::new(Arc::new(DecodingProbe::new(loader.clone())));
//!
//! let mut session = CustomizationSession::open(template, config.fallback_aspect_ratio);
//! session.set_name("Ramesh Yadav");
//! session.set_role("Booth Adhyaksh");
//! resolver.refresh(&mut session).await;
//!
//! let mut view = CompositionView::new(config.canvas_width, config.campaign.clone());
//! view.load_assets(&session, loader.as_ref()).await;
//! view.update(&session);
//! let pixels = view.render()?;
//! println!("{}x{}", pixels.width(), pixels.height());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod catalog;
pub mod icon;
pub mod loader;
pub mod pipeline;
pub mod platform;
pub mod rendering;
pub mod resolver;
pub mod session;

pub use capture::{CaptureFormat, CaptureOptions, CapturedArtifact, Rasterizer, SoftwareRasterizer};
pub use catalog::{InMemoryCatalog, PosterTemplate, TemplateSource};
pub use pipeline::{CapturePipeline, PipelineOutcome, PipelineState};
pub use rendering::CompositionView;
pub use session::{CustomizationSession, CustomizationState};

/// Landscape ratio used until the template image's real size is known
pub const DEFAULT_ASPECT_RATIO: f64 = 1.5;

/// Album that saved posters are organised into
pub const DEFAULT_ALBUM_NAME: &str = "Samajwadi Posters";

/// Configuration for the poster studio
///
/// The defaults produce a full-resolution (1080px wide) lossless PNG, saved
/// under the user's pictures directory.
///
/// # Examples
///
/// ```
/// let cfg = posterkit::StudioConfig::default();
/// assert_eq!(cfg.fallback_aspect_ratio, 1.5);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Width of the rasterized poster in pixels
    pub canvas_width: u32,
    /// Banner ratio used before (or instead of) template resolution
    pub fallback_aspect_ratio: f64,
    /// Album saved posters are placed into
    pub album_name: String,
    /// Root of the on-disk media library (None => pictures dir)
    pub library_root: Option<PathBuf>,
    /// Where captured artifacts are written before persistence (None => temp dir)
    pub capture_dir: Option<PathBuf>,
    /// Timeout for remote fetches in milliseconds
    pub timeout_ms: u64,
    /// User agent string sent with remote fetches
    pub user_agent: String,
    /// Static campaign text printed on every banner
    pub campaign: CampaignText,
    /// Capture encoding
    pub capture: CaptureOptions,
    /// Remote background removal service
    pub background_removal: BackgroundRemovalConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1080,
            fallback_aspect_ratio: DEFAULT_ASPECT_RATIO,
            album_name: DEFAULT_ALBUM_NAME.to_string(),
            library_root: None,
            capture_dir: None,
            timeout_ms: 30000,
            user_agent: format!("posterkit/{}", env!("CARGO_PKG_VERSION")),
            campaign: CampaignText::default(),
            capture: CaptureOptions::default(),
            background_removal: BackgroundRemovalConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: StudioConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_width > rendering::layout::MAX_CANVAS_WIDTH {
            return Err(Error::ConfigError(format!(
                "canvas_width must be within 1..={}, got {}",
                rendering::layout::MAX_CANVAS_WIDTH,
                self.canvas_width
            )));
        }
        let ratios = resolver::MIN_ASPECT_RATIO..=resolver::MAX_ASPECT_RATIO;
        if !ratios.contains(&self.fallback_aspect_ratio) {
            return Err(Error::ConfigError(format!(
                "fallback_aspect_ratio must be within {:?}, got {}",
                ratios, self.fallback_aspect_ratio
            )));
        }
        if self.album_name.trim().is_empty() {
            return Err(Error::ConfigError("album_name must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.capture.quality) {
            return Err(Error::ConfigError("capture.quality must be within 0.0..=1.0".into()));
        }
        Ok(())
    }

    /// Library root, falling back to `<pictures>/posterkit`.
    pub fn library_root(&self) -> PathBuf {
        self.library_root.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(std::env::temp_dir)
                .join("posterkit")
        })
    }

    /// Capture directory, falling back to `<tmp>/posterkit-captures`.
    pub fn capture_dir(&self) -> PathBuf {
        self.capture_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("posterkit-captures"))
    }
}

/// Campaign text printed on the banner region of every poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignText {
    pub headline: String,
    pub tagline: String,
}

impl Default for CampaignText {
    fn default() -> Self {
        Self {
            headline: "SAMAJWADI PARTY".to_string(),
            tagline: "Samajwadi Tech Force".to_string(),
        }
    }
}

/// Contract for the remote background removal service
///
/// The service accepts one image per request. Uploads above
/// `max_upload_bytes` are refused locally; nothing is retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundRemovalConfig {
    /// Full endpoint URL (None => background removal disabled)
    pub endpoint: Option<String>,
    /// Largest image accepted for upload
    pub max_upload_bytes: usize,
    /// Optional bearer token sent as `Authorization`
    pub auth_token: Option<String>,
}

impl Default for BackgroundRemovalConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            max_upload_bytes: 10 * 1024 * 1024,
            auth_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.canvas_width, 1080);
        assert_eq!(config.album_name, "Samajwadi Posters");
        assert_eq!(config.capture.format, CaptureFormat::Png);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let config = StudioConfig {
            fallback_aspect_ratio: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let config = StudioConfig {
            fallback_aspect_ratio: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StudioConfig {
            fallback_aspect_ratio: 1.0 / 60_000.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_canvas_width() {
        for canvas_width in [0, 4097, u32::MAX] {
            let config = StudioConfig {
                canvas_width,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(Error::ConfigError(_))), "{}", canvas_width);
        }
        let config = StudioConfig {
            canvas_width: 4096,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: StudioConfig =
            serde_json::from_str(r#"{ "album_name": "Booth 42", "canvas_width": 720 }"#).unwrap();
        assert_eq!(cfg.album_name, "Booth 42");
        assert_eq!(cfg.canvas_width, 720);
        assert_eq!(cfg.fallback_aspect_ratio, DEFAULT_ASPECT_RATIO);
        assert_eq!(cfg.background_removal.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_explicit_dirs_win() {
        let cfg = StudioConfig {
            library_root: Some(PathBuf::from("/srv/posters")),
            capture_dir: Some(PathBuf::from("/srv/tmp")),
            ..Default::default()
        };
        assert_eq!(cfg.library_root(), PathBuf::from("/srv/posters"));
        assert_eq!(cfg.capture_dir(), PathBuf::from("/srv/tmp"));
    }
}
