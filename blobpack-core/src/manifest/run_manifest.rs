use serde::{Deserialize, Serialize};

use crate::manifest::blob::Blob;

/// Ordered blob records produced by one run. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Manifest {
    pub blobs: Vec<Blob>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished blob; manifest order is serialization order.
    pub fn push(&mut self, blob: Blob) {
        self.blobs.push(blob);
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blob> {
        self.blobs.iter()
    }

    pub fn chunk_count(&self) -> usize {
        self.blobs.iter().map(|b| b.chunks.len()).sum()
    }

    /// Sum of the original file sizes.
    pub fn total_bytes(&self) -> u64 {
        self.blobs.iter().map(Blob::total_size).sum()
    }

    pub fn find(&self, file_name: &str) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.file_name == file_name)
    }
}
