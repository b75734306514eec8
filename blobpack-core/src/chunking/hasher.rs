use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Checksum recorded for a chunk. Callers pass only the bytes actually read.
pub fn chunk_checksum(data: &[u8]) -> String {
    digest_hex(data)
}
