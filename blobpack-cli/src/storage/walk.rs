use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use blobpack_core::error::BlobPackError;
use blobpack_core::traits::enumerator::FileEnumerator;

/// Recursive walk yielding regular files in traversal order.
///
/// Entries within a directory are visited sorted by name so repeated runs see
/// the same order.
pub struct WalkDirEnumerator {
    root: PathBuf,
}

impl WalkDirEnumerator {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl FileEnumerator for WalkDirEnumerator {
    fn enumerate(&self) -> Result<Vec<PathBuf>, BlobPackError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|e| BlobPackError::Enumeration {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone()),
                source: io::Error::from(e),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        debug!("Enumerated {} files under {}", files.len(), self.root.display());
        Ok(files)
    }
}
