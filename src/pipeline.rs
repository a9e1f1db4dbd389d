//! Capture-and-persist workflow
//!
//! ```text
//! Idle -> Validating -> RequestingPermission -> Capturing -> Persisting -> Succeeded
//!            |                 |                   |             |
//!            v                 v                   v             v
//!          Idle       Failed(Permission)   Failed(Capture)  Failed(Persist)
//! ```
//!
//! `Succeeded` and `Failed` are left through [`CapturePipeline::acknowledge`].
//! Every step is awaited in order; nothing is retried.

use crate::capture::{CaptureOptions, CapturedArtifact, Rasterizer};
use crate::platform::{
    Album, Asset, Feedback, FeedbackChannel, FeedbackKind, MediaLibrary, PermissionScope, PermissionStatus,
    Platform, StoragePermission,
};
use crate::rendering::CompositionView;
use crate::session::{CustomizationSession, CustomizationState};
use crate::{Error, Result, StudioConfig};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Permission,
    Capture,
    Persist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Validating,
    RequestingPermission,
    Capturing,
    Persisting,
    Succeeded,
    Failed(FailureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Name,
    Role,
}

impl RequiredField {
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Role => "role",
        }
    }
}

/// Required fields that were empty (or whitespace) when download was pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<RequiredField>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.missing.iter().map(RequiredField::label).collect();
        write!(f, "Please enter your {}", labels.join(" and "))
    }
}

impl std::error::Error for ValidationError {}

pub fn validate(state: &CustomizationState) -> std::result::Result<(), ValidationError> {
    let mut missing = Vec::new();
    if state.name.trim().is_empty() {
        missing.push(RequiredField::Name);
    }
    if state.role.trim().is_empty() {
        missing.push(RequiredField::Role);
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

/// Where the saved asset ended up album-wise
#[derive(Debug, Clone, PartialEq)]
pub enum AlbumPlacement {
    Created(Album),
    Added(Album),
    /// The asset is saved but could not be organised
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedPoster {
    pub asset: Asset,
    pub album: AlbumPlacement,
    pub artifact_digest: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Saved(SavedPoster),
    Rejected(ValidationError),
    Failed(FailureKind),
    /// A previous run has not been acknowledged yet
    Busy,
}

pub struct CapturePipeline {
    permission: Arc<dyn StoragePermission>,
    rasterizer: Arc<dyn Rasterizer>,
    library: Arc<dyn MediaLibrary>,
    feedback: Arc<dyn FeedbackChannel>,
    album_name: String,
    options: CaptureOptions,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl CapturePipeline {
    pub fn new(
        permission: Arc<dyn StoragePermission>,
        rasterizer: Arc<dyn Rasterizer>,
        library: Arc<dyn MediaLibrary>,
        feedback: Arc<dyn FeedbackChannel>,
    ) -> Self {
        Self {
            permission,
            rasterizer,
            library,
            feedback,
            album_name: crate::DEFAULT_ALBUM_NAME.to_string(),
            options: CaptureOptions::default(),
            state: PipelineState::Idle,
            history: Vec::new(),
        }
    }

    pub fn from_platform(platform: &Platform, config: &StudioConfig) -> Self {
        Self::new(
            platform.permission.clone(),
            platform.rasterizer.clone(),
            platform.media_library.clone(),
            platform.feedback.clone(),
        )
        .with_album(&config.album_name)
        .with_options(config.capture)
    }

    pub fn with_album(mut self, name: &str) -> Self {
        self.album_name = name.to_string();
        self
    }

    pub fn with_options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered so far, oldest first
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Dismiss a finished run so the next download can start
    pub fn acknowledge(&mut self) {
        if matches!(self.state, PipelineState::Succeeded | PipelineState::Failed(_)) {
            self.enter(PipelineState::Idle);
        }
    }

    fn enter(&mut self, next: PipelineState) {
        log::debug!("pipeline: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn fail(&mut self, kind: FailureKind, feedback: Feedback) -> PipelineOutcome {
        self.enter(PipelineState::Failed(kind));
        self.feedback.alert(&feedback);
        PipelineOutcome::Failed(kind)
    }

    /// Validate, ask for permission, capture the view and save it into the
    /// configured album. The session is only read.
    pub async fn download(&mut self, session: &CustomizationSession, view: &CompositionView) -> PipelineOutcome {
        if self.state != PipelineState::Idle {
            log::debug!("pipeline: download ignored while {:?}", self.state);
            return PipelineOutcome::Busy;
        }

        self.enter(PipelineState::Validating);
        if let Err(invalid) = validate(session.state()) {
            self.enter(PipelineState::Idle);
            self.feedback
                .alert(&Feedback::new(FeedbackKind::Validation, "Missing details", invalid.to_string()));
            return PipelineOutcome::Rejected(invalid);
        }

        self.enter(PipelineState::RequestingPermission);
        let permission = self.permission.request_write_permission(PermissionScope::WriteOnly).await;
        match permission {
            Ok(PermissionStatus::Granted) => {}
            Ok(PermissionStatus::Denied) => {
                return self.fail(
                    FailureKind::Permission,
                    Feedback::new(
                        FeedbackKind::Permission,
                        "Permission needed",
                        "Please grant permission to save the poster.",
                    ),
                );
            }
            Err(e) => {
                log::warn!("pipeline: permission request failed: {}", e);
                return self.fail(
                    FailureKind::Permission,
                    Feedback::new(
                        FeedbackKind::Permission,
                        "Permission needed",
                        "Could not request access to your photos.",
                    ),
                );
            }
        }

        self.enter(PipelineState::Capturing);
        let captured = self.rasterizer.capture(view, &self.options).await;
        let artifact = match captured {
            Ok(a) => a,
            Err(e) => {
                log::warn!("pipeline: capture failed: {}", e);
                return self.fail(
                    FailureKind::Capture,
                    Feedback::new(FeedbackKind::Capture, "Error", "Failed to capture poster. Please try again."),
                );
            }
        };

        self.enter(PipelineState::Persisting);
        let persisted = self.persist(&artifact).await;
        artifact.discard();

        match persisted {
            Ok((asset, album)) => {
                self.enter(PipelineState::Succeeded);
                log::info!("pipeline: saved poster {} ({})", asset.filename, artifact.digest);
                self.feedback
                    .alert(&Feedback::new(FeedbackKind::Success, "Saved", "Poster saved to gallery!"));
                PipelineOutcome::Saved(SavedPoster {
                    asset,
                    album,
                    artifact_digest: artifact.digest,
                })
            }
            Err(e) => {
                log::warn!("pipeline: saving failed: {}", e);
                self.fail(
                    FailureKind::Persist,
                    Feedback::new(FeedbackKind::Persist, "Error", "Failed to save poster"),
                )
            }
        }
    }

    /// Only `create_asset` failing is fatal; album trouble is reported in the placement
    async fn persist(&self, artifact: &CapturedArtifact) -> Result<(Asset, AlbumPlacement)> {
        let asset = self.library.create_asset(&artifact.path).await?;
        let album = match self.place_in_album(&asset).await {
            Ok(placement) => placement,
            Err(e) => {
                log::warn!("pipeline: album '{}' not updated: {}", self.album_name, e);
                AlbumPlacement::Failed(e.to_string())
            }
        };
        Ok((asset, album))
    }

    async fn place_in_album(&self, asset: &Asset) -> Result<AlbumPlacement> {
        match self.library.get_album(&self.album_name).await? {
            Some(album) => {
                self.library
                    .add_assets_to_album(std::slice::from_ref(asset), &album)
                    .await?;
                Ok(AlbumPlacement::Added(album))
            }
            None => {
                let album = self.library.create_album(&self.album_name, asset).await?;
                Ok(AlbumPlacement::Created(album))
            }
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PosterTemplate;

    fn session(name: &str, role: &str) -> CustomizationSession {
        let mut s = CustomizationSession::open(PosterTemplate::new("t", "Rally", "Events", 0, None), 1.5);
        s.set_name(name);
        s.set_role(role);
        s
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let err = validate(session("   ", "\t").state()).unwrap_err();
        assert_eq!(err.missing, vec![RequiredField::Name, RequiredField::Role]);
        assert_eq!(err.to_string(), "Please enter your name and role");
    }

    #[test]
    fn filled_fields_validate() {
        assert!(validate(session("Ramesh Yadav", "Booth Adhyaksh").state()).is_ok());
        let err = validate(session("Ramesh Yadav", "").state()).unwrap_err();
        assert_eq!(err.missing, vec![RequiredField::Role]);
    }
}
