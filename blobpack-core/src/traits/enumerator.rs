use std::path::PathBuf;

use crate::error::BlobPackError;

/// Supplies the ordered list of input files for a run.
pub trait FileEnumerator {
    fn enumerate(&self) -> Result<Vec<PathBuf>, BlobPackError>;
}

/// A fixed list, used as-is.
impl FileEnumerator for Vec<PathBuf> {
    fn enumerate(&self) -> Result<Vec<PathBuf>, BlobPackError> {
        Ok(self.clone())
    }
}
