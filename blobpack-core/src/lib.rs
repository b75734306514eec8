//! Fixed-size file chunking with SHA-256 checksums, per-file version digests
//! and length-prefixed binary blob containers.
//!
//! The core is platform independent apart from blocking file reads; directory
//! walking and manifest persistence are supplied by callers through the
//! traits in [`traits`].

pub mod error;
pub mod constants;
pub mod config;
pub mod traits;
pub mod chunking;
pub mod manifest;
pub mod container;
pub mod pipeline;

pub use error::{BlobPackError, Result};
