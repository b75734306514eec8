use async_trait::async_trait;

use crate::error::BlobPackError;
use crate::manifest::Manifest;

/// Persists the finished manifest of a run.
#[async_trait]
pub trait ManifestSink {
    async fn persist(&self, manifest: &Manifest) -> Result<(), BlobPackError>;
}
