use sha2::{Digest, Sha256};

use crate::manifest::blob::{Blob, Chunk};

/// Digest of a file's content version.
///
/// SHA-256 over the chunk checksum strings concatenated in list order.
/// A blob with no chunks hashes the empty string.
pub fn compute_version(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.checksum.as_bytes());
    }
    hex::encode(hasher.finalize())
}

impl Blob {
    /// Set `version` from the current chunk list.
    ///
    /// Call only once every chunk of the file has been admitted.
    pub fn seal(&mut self) {
        self.version = compute_version(&self.chunks);
    }
}
