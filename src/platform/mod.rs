//! Platform capabilities: storage permission, media library, user feedback,
//! background removal
//!
//! The pipeline only ever sees these traits. [`Platform::for_kind`] picks the
//! concrete implementations for native or web targets, and [`bootstrap`]
//! builds the process-wide instance once at startup.

pub mod background;
pub mod feedback;
pub mod media_library;
pub mod permission;

pub use background::BackgroundRemover;
#[cfg(feature = "remote")]
pub use background::{DataUrlRemover, RembgServiceRemover};
pub use feedback::{ConsoleFeedback, Feedback, FeedbackChannel, FeedbackKind, LogFeedback, RecordingFeedback};
pub use media_library::{Album, Asset, DirectoryMediaLibrary, MediaLibrary};
pub use permission::{FsWritePermission, PermissionScope, PermissionStatus, StaticPermission, StoragePermission};

use crate::capture::{Rasterizer, SoftwareRasterizer};
use crate::loader::{AssetLoader, DefaultAssetLoader};
use crate::{Error, Result, StudioConfig};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

/// Environment variable overriding [`PlatformKind::detect`]
pub const PLATFORM_ENV: &str = "POSTERKIT_PLATFORM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Native,
    Web,
}

impl PlatformKind {
    pub fn detect() -> Self {
        if let Ok(value) = std::env::var(PLATFORM_ENV) {
            match value.parse() {
                Ok(kind) => return kind,
                Err(_) => log::warn!("platform: ignoring {}={}", PLATFORM_ENV, value),
            }
        }
        if cfg!(target_arch = "wasm32") {
            PlatformKind::Web
        } else {
            PlatformKind::Native
        }
    }
}

impl FromStr for PlatformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "ios" | "android" => Ok(PlatformKind::Native),
            "web" | "desktop" => Ok(PlatformKind::Web),
            other => Err(Error::ConfigError(format!("unknown platform '{}'", other))),
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Native => f.write_str("native"),
            PlatformKind::Web => f.write_str("web"),
        }
    }
}

/// The capability set one platform provides
#[derive(Clone)]
pub struct Platform {
    pub kind: PlatformKind,
    pub loader: Arc<dyn AssetLoader>,
    pub permission: Arc<dyn StoragePermission>,
    pub rasterizer: Arc<dyn Rasterizer>,
    pub media_library: Arc<dyn MediaLibrary>,
    pub feedback: Arc<dyn FeedbackChannel>,
    /// None when no removal endpoint is configured
    pub background_remover: Option<Arc<dyn BackgroundRemover>>,
}

impl Platform {
    pub fn for_kind(kind: PlatformKind, config: &StudioConfig) -> Result<Self> {
        config.validate()?;
        let root = config.library_root();
        let loader: Arc<dyn AssetLoader> = Arc::new(DefaultAssetLoader::new(config)?);

        // browsers download without asking; devices need photo-library access
        let permission: Arc<dyn StoragePermission> = match kind {
            PlatformKind::Native => Arc::new(FsWritePermission::new(&root)),
            PlatformKind::Web => Arc::new(StaticPermission(PermissionStatus::Granted)),
        };
        let background_remover = background_remover(kind, config, loader.clone())?;

        log::debug!("platform: {} with library at {}", kind, root.display());
        Ok(Self {
            kind,
            loader,
            permission,
            rasterizer: Arc::new(SoftwareRasterizer::new(config.capture_dir())),
            media_library: Arc::new(DirectoryMediaLibrary::new(root)),
            feedback: Arc::new(LogFeedback),
            background_remover,
        })
    }

    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackChannel>) -> Self {
        self.feedback = feedback;
        self
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("kind", &self.kind)
            .field("background_remover", &self.background_remover.is_some())
            .finish()
    }
}

#[cfg(feature = "remote")]
fn background_remover(
    kind: PlatformKind,
    config: &StudioConfig,
    loader: Arc<dyn AssetLoader>,
) -> Result<Option<Arc<dyn BackgroundRemover>>> {
    if config.background_removal.endpoint.is_none() {
        return Ok(None);
    }
    let remover: Arc<dyn BackgroundRemover> = match kind {
        PlatformKind::Native => Arc::new(DataUrlRemover::new(config, loader)?),
        PlatformKind::Web => Arc::new(RembgServiceRemover::new(config)?),
    };
    Ok(Some(remover))
}

#[cfg(not(feature = "remote"))]
fn background_remover(
    _kind: PlatformKind,
    config: &StudioConfig,
    _loader: Arc<dyn AssetLoader>,
) -> Result<Option<Arc<dyn BackgroundRemover>>> {
    if config.background_removal.endpoint.is_some() {
        log::warn!("platform: background removal needs the `remote` feature");
    }
    Ok(None)
}

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// Build the process-wide platform for the detected kind. Later calls return
/// the first instance and ignore `config`.
pub fn bootstrap(config: &StudioConfig) -> Result<&'static Platform> {
    if let Some(existing) = PLATFORM.get() {
        return Ok(existing);
    }
    let platform = Platform::for_kind(PlatformKind::detect(), config)?;
    Ok(PLATFORM.get_or_init(|| platform))
}
