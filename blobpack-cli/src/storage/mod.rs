//! Native collaborators: directory walker and JSON manifest file.

pub mod manifest_file;
pub mod walk;

pub use manifest_file::JsonManifestFile;
pub use walk::WalkDirEnumerator;
