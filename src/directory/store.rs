//! Read/write access to the persisted proxy document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::directory::document::ProxyDocument;
use crate::directory::error::{DirectoryError, DirectoryResult};

/// Owns the path of the proxy configuration file.
///
/// Nothing is cached: every `load` reads the file again so edits made by
/// hand between requests are picked up.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document.
    pub async fn load(&self) -> DirectoryResult<ProxyDocument> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DirectoryError::ConfigMissing(self.path.clone()));
            }
            Err(e) => return Err(DirectoryError::Io(e)),
        };
        ProxyDocument::from_slice(&bytes)
    }

    /// Replace the document on disk.
    ///
    /// The new content goes to a sibling temp file which is synced and then
    /// renamed over the target, so readers see either the old or the new file.
    pub async fn save(&self, doc: &ProxyDocument) -> DirectoryResult<()> {
        let payload = doc.to_pretty_bytes()?;
        let temp_path = self.temp_path();

        if let Err(e) = write_synced(&temp_path, &payload).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(DirectoryError::Io(e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(DirectoryError::Io(e));
        }

        tracing::debug!(path = ?self.path, bytes = payload.len(), "Proxy config written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }
}

async fn write_synced(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(payload).await?;
    file.sync_all().await?;
    Ok(())
}
