//! Scoped temporary files for rendered images.
//!
//! A [`RenderedArtifact`] owns its file: `release` deletes it and reports failures, and dropping an
//! unreleased handle deletes it best-effort.

use std::path::{ Path, PathBuf };

use uuid::Uuid;

use crate::enums::QualityTier;
use crate::error::Result;
use crate::qr::RenderedImage;

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `image` to a uniquely named PNG file and hand out its handle.
    pub async fn persist(&self, image: RenderedImage) -> Result<RenderedArtifact> {
        let path = self.dir.join(format!("{}.png", Uuid::new_v4()));
        tokio::fs::write(&path, &image.bytes).await?;

        tracing::debug!("Stored artifact {}", path.display());

        Ok(RenderedArtifact {
            path,
            width: image.width,
            height: image.height,
            quality: image.quality,
            logo_applied: image.logo_applied,
            released: false,
        })
    }
}

#[derive(Debug)]
pub struct RenderedArtifact {
    path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: QualityTier,
    pub logo_applied: bool,
    released: bool,
}

impl RenderedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Delete the file once delivery is done.
    pub async fn release(mut self) -> Result<()> {
        self.remove_file().await
    }

    /// The handle only counts as released once the file is gone, so a failed removal is retried
    /// on drop.
    async fn remove_file(&mut self) -> Result<()> {
        tokio::fs::remove_file(&self.path).await?;
        self.released = true;

        tracing::debug!("Released artifact {}", self.path.display());
        Ok(())
    }
}

impl Drop for RenderedArtifact {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove artifact {}: {}", self.path.display(), e);
            }
        }
    }
}
