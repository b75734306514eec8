//! Blob serializer: lays out and writes length-prefixed chunk records.
//!
//! A container is a flat stream of `[u32 LE length][length bytes]` records
//! with no markers between chunks or files. Chunk boundaries are recovered
//! only through the manifest's `size` and `position` fields, so positions are
//! assigned here, in manifest order, immediately before anything is written.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::PackConfig;
use crate::constants::{BLOB_EXTENSION, LENGTH_PREFIX_LEN};
use crate::error::{BlobPackError, Result};
use crate::manifest::blob::Blob;
use crate::manifest::run_manifest::Manifest;

pub use crate::config::ContainerMode;

/// Write one record and return the number of bytes it occupies.
pub fn encode_record<W: Write>(out: &mut W, data: &[u8]) -> io::Result<u64> {
    let len = u32::try_from(data.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "record exceeds u32 length"))?;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(data)?;
    Ok(LENGTH_PREFIX_LEN + data.len() as u64)
}

/// Per-file container name: the base name with its last extension replaced.
pub fn container_name(file_name: &str) -> Result<String> {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => Ok(format!("{}.{}", &file_name[..idx], BLOB_EXTENSION)),
        _ => Err(BlobPackError::Naming(format!(
            "unable to derive a container name from '{file_name}': no extension"
        ))),
    }
}

/// Set every chunk's `position` to its record offset in the container it
/// will be written to.
///
/// Positions restart at zero for each blob in per-file mode and run across
/// the whole manifest in combined mode. Returns the length of the longest
/// container, which in combined mode is the length of the only one.
pub fn assign_positions(manifest: &mut Manifest, mode: &ContainerMode) -> u64 {
    let mut offset = 0u64;
    let mut longest = 0u64;
    for blob in &mut manifest.blobs {
        if !mode.is_combined() {
            offset = 0;
        }
        for chunk in &mut blob.chunks {
            chunk.position = offset;
            offset += chunk.record_len();
        }
        longest = longest.max(offset);
    }
    longest
}

fn storage_err(action: &str, path: &Path, e: io::Error) -> BlobPackError {
    BlobPackError::Storage(format!("{action} {}: {e}", path.display()))
}

fn write_blob_records<W: Write>(out: &mut W, blob: &Blob, offset: &mut u64) -> Result<()> {
    for chunk in &blob.chunks {
        if chunk.position != *offset {
            return Err(BlobPackError::InvalidData(format!(
                "chunk {} of {} is recorded at {} but would be written at {}",
                chunk.id, blob.file_name, chunk.position, offset
            )));
        }
        if chunk.data.len() != chunk.size as usize {
            return Err(BlobPackError::InvalidData(format!(
                "chunk {} of {} holds {} bytes, expected {}",
                chunk.id,
                blob.file_name,
                chunk.data.len(),
                chunk.size
            )));
        }
        *offset += encode_record(out, &chunk.data)
            .map_err(|e| BlobPackError::Storage(format!("write chunk {}: {e}", chunk.id)))?;
    }
    Ok(())
}

fn write_container(path: &Path, blobs: &[Blob]) -> Result<u64> {
    let file = File::create(path).map_err(|e| storage_err("create container", path, e))?;
    let mut out = BufWriter::new(file);
    let mut offset = 0u64;
    for blob in blobs {
        write_blob_records(&mut out, blob, &mut offset)?;
    }
    out.flush().map_err(|e| storage_err("flush container", path, e))?;
    info!(container = %path.display(), bytes = offset, "wrote container");
    Ok(offset)
}

/// Per-file container names for every blob, rejecting collisions up front.
fn per_file_names(manifest: &Manifest) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(manifest.len());
    for blob in manifest.iter() {
        let name = container_name(&blob.file_name)?;
        if !seen.insert(name.clone()) {
            return Err(BlobPackError::Naming(format!(
                "'{}' maps to container '{name}', which another file already uses",
                blob.file_name
            )));
        }
        names.push(name);
    }
    Ok(names)
}

/// Write the manifest's chunks to container files under `config.output_dir`.
///
/// Positions must already match the layout for `config.mode` (see
/// [`assign_positions`]). Chunk data is released once everything is on disk.
/// Returns the container paths in write order.
pub fn write_containers(manifest: &mut Manifest, config: &PackConfig) -> Result<Vec<PathBuf>> {
    let dir = &config.output_dir;
    fs::create_dir_all(dir).map_err(|e| storage_err("create output dir", dir, e))?;

    let written = match &config.mode {
        ContainerMode::Combined { name } => {
            let path = dir.join(name);
            if path.exists() {
                warn!(container = %path.display(), "removing existing combined container");
                fs::remove_file(&path).map_err(|e| storage_err("remove container", &path, e))?;
            }
            write_container(&path, &manifest.blobs)?;
            vec![path]
        }
        ContainerMode::PerFile => {
            let names = per_file_names(manifest)?;
            let mut paths = Vec::with_capacity(names.len());
            for (blob, name) in manifest.blobs.iter().zip(names) {
                let path = dir.join(name);
                write_container(&path, std::slice::from_ref(blob))?;
                paths.push(path);
            }
            paths
        }
    };

    for blob in &mut manifest.blobs {
        blob.release_data();
    }
    Ok(written)
}
