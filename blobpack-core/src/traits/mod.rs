//! Seams for the collaborators around the core: file discovery and manifest
//! persistence.

pub mod enumerator;
pub mod sink;
