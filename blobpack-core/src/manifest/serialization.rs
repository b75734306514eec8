use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::BlobPackError;
use crate::manifest::run_manifest::Manifest;

/// Encode the manifest as tab-indented JSON.
pub fn to_json(manifest: &Manifest) -> Result<Vec<u8>, BlobPackError> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    manifest
        .serialize(&mut serializer)
        .map_err(|e| BlobPackError::Serialization(e.to_string()))?;
    Ok(out)
}

pub fn from_json(data: &[u8]) -> Result<Manifest, BlobPackError> {
    serde_json::from_slice(data).map_err(|e| BlobPackError::Serialization(e.to_string()))
}
