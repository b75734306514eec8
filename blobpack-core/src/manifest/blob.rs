use serde::{Deserialize, Serialize};

use crate::constants::LENGTH_PREFIX_LEN;

/// One slice of a file plus its identity and placement in the output stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub id: u64,
    /// Hex-encoded SHA-256 of the chunk bytes.
    pub checksum: String,
    pub size: u32,
    /// Offset of this chunk's length-prefixed record in its container.
    pub position: u64,
    /// Raw bytes, held only until the chunk is serialized.
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Chunk {
    /// Bytes this chunk occupies in a container, prefix included.
    pub fn record_len(&self) -> u64 {
        LENGTH_PREFIX_LEN + self.size as u64
    }
}

/// Per-file record: ordered chunks and the derived content version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Blob {
    pub file_name: String,
    pub chunks: Vec<Chunk>,
    pub version: String,
}

impl Blob {
    /// Create an empty record; chunks are appended while the file is read.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            chunks: Vec::new(),
            version: String::new(),
        }
    }

    pub fn add_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Ordered chunk checksums, the input of the version digest.
    pub fn chunk_checksums(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.checksum.as_str()).collect()
    }

    /// Size of the original file in bytes.
    pub fn total_size(&self) -> u64 {
        self.chunks.iter().map(|c| c.size as u64).sum()
    }

    /// Bytes the blob's records take up in a container.
    pub fn record_bytes(&self) -> u64 {
        self.chunks.iter().map(Chunk::record_len).sum()
    }

    pub fn is_sealed(&self) -> bool {
        !self.version.is_empty()
    }

    /// Whether every chunk still carries its raw bytes.
    pub fn has_data(&self) -> bool {
        self.chunks.iter().all(|c| c.data.len() == c.size as usize)
    }

    /// Drop raw chunk bytes once they have been written out.
    pub fn release_data(&mut self) {
        for chunk in &mut self.chunks {
            chunk.data = Vec::new();
        }
    }
}
