//! Media library capability and a directory-backed implementation
//!
//! On-disk layout of [`DirectoryMediaLibrary`]:
//!
//! ```text
//! <root>/IMG_<millis>_<seq>.png     every saved asset
//! <root>/<album title>/...          copies of the album's assets
//! <root>/albums.json                album manifest
//! ```

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const MANIFEST: &str = "albums.json";
const MANIFEST_TMP: &str = "albums.json.tmp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub uri: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub asset_count: usize,
}

#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Save a file into the general library
    async fn create_asset(&self, file: &Path) -> Result<Asset>;
    async fn get_album(&self, name: &str) -> Result<Option<Album>>;
    /// Create an album with `asset` as its first member
    async fn create_album(&self, name: &str, asset: &Asset) -> Result<Album>;
    async fn add_assets_to_album(&self, assets: &[Asset], album: &Album) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    albums: Vec<AlbumEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AlbumEntry {
    id: String,
    title: String,
    assets: Vec<String>,
}

impl AlbumEntry {
    fn album(&self) -> Album {
        Album {
            id: self.id.clone(),
            title: self.title.clone(),
            asset_count: self.assets.len(),
        }
    }
}

pub struct DirectoryMediaLibrary {
    root: PathBuf,
    seq: AtomicU64,
    manifest_lock: Mutex<()>,
}

impl DirectoryMediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seq: AtomicU64::new(0),
            manifest_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST)
    }

    async fn read_manifest(&self) -> Result<Manifest> {
        match tokio::fs::read(self.manifest_path()).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|e| Error::MediaLibraryError(format!("corrupt {}: {}", MANIFEST, e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(media_err(&self.manifest_path(), e)),
        }
    }

    /// Write through a temp file and rename so a crash never leaves half a manifest
    async fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        let path = self.manifest_path();
        let tmp = self.root.join(MANIFEST_TMP);
        let raw = serde_json::to_vec_pretty(manifest)?;
        tokio::fs::write(&tmp, raw).await.map_err(|e| media_err(&tmp, e))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| media_err(&path, e))?;
        Ok(())
    }

    fn album_dir(&self, title: &str) -> Result<PathBuf> {
        let safe = title.trim();
        let reserved = [MANIFEST, MANIFEST_TMP].iter().any(|r| safe.eq_ignore_ascii_case(r));
        if safe.is_empty() || safe.contains(['/', '\\']) || safe == "." || safe == ".." || reserved {
            return Err(Error::MediaLibraryError(format!("invalid album name '{}'", title)));
        }
        Ok(self.root.join(safe))
    }

    async fn copy_into_album(&self, dir: &Path, asset: &Asset) -> Result<()> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| media_err(dir, e))?;
        let src = self.root.join(&asset.filename);
        let dst = dir.join(&asset.filename);
        tokio::fs::copy(&src, &dst).await.map_err(|e| media_err(&src, e))?;
        Ok(())
    }
}

fn media_err(path: &Path, e: std::io::Error) -> Error {
    Error::MediaLibraryError(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl MediaLibrary for DirectoryMediaLibrary {
    async fn create_asset(&self, file: &Path) -> Result<Asset> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| media_err(&self.root, e))?;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("png");
        let id = format!("{}_{}", millis, seq);
        let filename = format!("IMG_{}.{}", id, ext);
        let dst = self.root.join(&filename);
        tokio::fs::copy(file, &dst).await.map_err(|e| media_err(file, e))?;
        log::info!("media: saved {}", dst.display());
        Ok(Asset {
            id,
            uri: url::Url::from_file_path(&dst)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| dst.display().to_string()),
            filename,
        })
    }

    async fn get_album(&self, name: &str) -> Result<Option<Album>> {
        let _guard = self.manifest_lock.lock().await;
        let manifest = self.read_manifest().await?;
        Ok(manifest.albums.iter().find(|a| a.title == name).map(AlbumEntry::album))
    }

    async fn create_album(&self, name: &str, asset: &Asset) -> Result<Album> {
        let dir = self.album_dir(name)?;
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.read_manifest().await?;
        if manifest.albums.iter().any(|a| a.title == name) {
            return Err(Error::MediaLibraryError(format!("album '{}' already exists", name)));
        }
        self.copy_into_album(&dir, asset).await?;
        let entry = AlbumEntry {
            id: format!("album-{}", manifest.albums.len() + 1),
            title: name.to_string(),
            assets: vec![asset.id.clone()],
        };
        let album = entry.album();
        manifest.albums.push(entry);
        self.write_manifest(&manifest).await?;
        Ok(album)
    }

    async fn add_assets_to_album(&self, assets: &[Asset], album: &Album) -> Result<()> {
        let dir = self.album_dir(&album.title)?;
        let _guard = self.manifest_lock.lock().await;
        let mut manifest = self.read_manifest().await?;
        let pos = manifest
            .albums
            .iter()
            .position(|a| a.id == album.id)
            .ok_or_else(|| Error::MediaLibraryError(format!("no album with id {}", album.id)))?;
        for asset in assets {
            if manifest.albums[pos].assets.contains(&asset.id) {
                continue;
            }
            self.copy_into_album(&dir, asset).await?;
            manifest.albums[pos].assets.push(asset.id.clone());
        }
        self.write_manifest(&manifest).await
    }
}
