use std::path::PathBuf;

use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_COMBINED_NAME, DEFAULT_OUTPUT_DIR};
use crate::error::{BlobPackError, Result};

/// How chunk records are grouped into container files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerMode {
    /// One `<stem>.blob` per input file.
    PerFile,
    /// A single container holding every blob in manifest order.
    Combined { name: String },
}

impl ContainerMode {
    pub fn combined() -> Self {
        ContainerMode::Combined {
            name: DEFAULT_COMBINED_NAME.to_string(),
        }
    }

    pub fn is_combined(&self) -> bool {
        matches!(self, ContainerMode::Combined { .. })
    }
}

/// Settings for one packing run.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Nominal block size in bytes.
    pub chunk_size: usize,
    /// Directory the containers are written into.
    pub output_dir: PathBuf,
    pub mode: ContainerMode,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            mode: ContainerMode::PerFile,
        }
    }
}

impl PackConfig {
    pub fn new(output_dir: impl Into<PathBuf>, mode: ContainerMode) -> Self {
        Self {
            output_dir: output_dir.into(),
            mode,
            ..Self::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Reject settings the container format cannot represent.
    ///
    /// Chunk sizes must be non-zero and fit the `u32` length prefix.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BlobPackError::Config("chunk size must be non-zero".into()));
        }
        if self.chunk_size as u64 > u32::MAX as u64 {
            return Err(BlobPackError::Config(format!(
                "chunk size {} exceeds the 4-byte length prefix",
                self.chunk_size
            )));
        }
        if let ContainerMode::Combined { name } = &self.mode {
            if name.is_empty() {
                return Err(BlobPackError::Config(
                    "combined container name must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}
