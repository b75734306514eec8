//! In-memory manifest model: blob records, their chunks and version digests.

pub mod blob;
pub mod run_manifest;
pub mod version;
pub mod serialization;

pub use blob::{Blob, Chunk};
pub use run_manifest::Manifest;
