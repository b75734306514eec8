use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobPackError {
    #[error("Enumeration error at {path}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A genuine read failure. Clean end of input never produces this.
    #[error("Read error in {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Naming error: {0}")]
    Naming(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Coordinator error: {0}")]
    Coordinator(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BlobPackError>;
