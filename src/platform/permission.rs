//! Storage permission capability

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// How much media-library access is being asked for. Saving posters only
/// ever needs `WriteOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionScope {
    WriteOnly,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[async_trait]
pub trait StoragePermission: Send + Sync {
    async fn request_write_permission(&self, scope: PermissionScope) -> Result<PermissionStatus>;
}

/// Always answers with the same status
pub struct StaticPermission(pub PermissionStatus);

#[async_trait]
impl StoragePermission for StaticPermission {
    async fn request_write_permission(&self, _scope: PermissionScope) -> Result<PermissionStatus> {
        Ok(self.0)
    }
}

/// Grants when the library root exists (or can be created) and is writable
pub struct FsWritePermission {
    root: PathBuf,
}

impl FsWritePermission {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StoragePermission for FsWritePermission {
    async fn request_write_permission(&self, scope: PermissionScope) -> Result<PermissionStatus> {
        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            log::warn!("permission: cannot create {}: {}", self.root.display(), e);
            return Ok(PermissionStatus::Denied);
        }
        let meta = tokio::fs::metadata(&self.root)
            .await
            .map_err(|e| Error::PermissionError(format!("{}: {}", self.root.display(), e)))?;
        if meta.permissions().readonly() {
            log::info!("permission: {} is read-only ({:?} denied)", self.root.display(), scope);
            return Ok(PermissionStatus::Denied);
        }
        Ok(PermissionStatus::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_permission_echoes() {
        let p = StaticPermission(PermissionStatus::Denied);
        assert_eq!(
            p.request_write_permission(PermissionScope::WriteOnly).await.unwrap(),
            PermissionStatus::Denied
        );
    }

    #[tokio::test]
    async fn fs_permission_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("library");
        let p = FsWritePermission::new(&root);
        assert_eq!(
            p.request_write_permission(PermissionScope::WriteOnly).await.unwrap(),
            PermissionStatus::Granted
        );
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn fs_permission_denies_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("occupied");
        std::fs::write(&root, b"x").unwrap();
        let p = FsWritePermission::new(&root);
        assert_eq!(
            p.request_write_permission(PermissionScope::WriteOnly).await.unwrap(),
            PermissionStatus::Denied
        );
    }
}
