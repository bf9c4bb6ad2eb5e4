//! Temporary on-disk staging for uploaded images.
//!
//! Each upload lives in its own file under the configured directory and is
//! removed when its [`StagedUpload`] is dropped, whichever way the request
//! ends.

use super::media::MediaError;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty staging file ready to receive upload chunks.
    pub async fn create(&self) -> Result<StagedUpload, MediaError> {
        let path = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.dir)
            .map_err(MediaError::Stage)?
            .into_temp_path();

        let file = OpenOptions::new()
            .write(true)
            .open(&path)
            .await
            .map_err(MediaError::Stage)?;

        Ok(StagedUpload {
            file: Some(file),
            path,
            size: 0,
        })
    }
}

/// An uploaded file on local storage, deleted on drop.
pub struct StagedUpload {
    // Dropped before `path` so the handle is closed ahead of deletion.
    file: Option<File>,
    path: TempPath,
    size: u64,
}

impl StagedUpload {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), MediaError> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(chunk).await.map_err(MediaError::Stage)?;
            self.size += chunk.len() as u64;
        }
        Ok(())
    }

    /// Flush and close the file. Further chunks are ignored.
    pub async fn finish(&mut self) -> Result<(), MediaError> {
        if let Some(mut file) = self.file.take() {
            file.flush().await.map_err(MediaError::Stage)?;
            file.sync_all().await.map_err(MediaError::Stage)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
