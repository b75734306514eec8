use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use blobpack_core::error::BlobPackError;
use blobpack_core::manifest::serialization::{from_json, to_json};
use blobpack_core::manifest::Manifest;
use blobpack_core::traits::sink::ManifestSink;

/// Manifest persisted as indented JSON at a fixed path.
pub struct JsonManifestFile {
    path: PathBuf,
}

impl JsonManifestFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a manifest written by an earlier run.
    pub async fn load(&self) -> Result<Manifest, BlobPackError> {
        if !self.path.exists() {
            return Err(BlobPackError::Storage(format!(
                "manifest not found: {}",
                self.path.display()
            )));
        }

        let data = fs::read(&self.path)
            .await
            .map_err(|e| BlobPackError::Storage(format!("read manifest failed: {e}")))?;

        let manifest = from_json(&data)?;
        debug!("Loaded manifest with {} blobs", manifest.len());
        Ok(manifest)
    }
}

#[async_trait]
impl ManifestSink for JsonManifestFile {
    async fn persist(&self, manifest: &Manifest) -> Result<(), BlobPackError> {
        let data = to_json(manifest)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobPackError::Storage(format!("create manifest dir failed: {e}")))?;
        }

        fs::write(&self.path, &data)
            .await
            .map_err(|e| BlobPackError::Storage(format!("write manifest failed: {e}")))?;

        debug!(
            "Wrote manifest {} ({} bytes)",
            self.path.display(),
            data.len()
        );
        Ok(())
    }
}
