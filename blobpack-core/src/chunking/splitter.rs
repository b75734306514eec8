use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::info;

use crate::chunking::coordinator::{ChunkCoordinator, ChunkDraft};
use crate::chunking::hasher::chunk_checksum;
use crate::error::{BlobPackError, Result};
use crate::manifest::blob::Blob;

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Returns the number of bytes placed in `buf`; `0` means the input is
/// exhausted. Interrupted reads are retried, any other error is returned.
pub fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Base name recorded in the manifest for `path`.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Chunk everything `reader` yields into a new blob named `file_name`.
pub fn chunk_reader<R: Read>(
    reader: R,
    file_name: &str,
    block_size: usize,
    coordinator: &ChunkCoordinator,
) -> Result<Blob> {
    chunk_stream(reader, file_name, Path::new(file_name), block_size, coordinator)
}

/// Open `path` and chunk its whole content.
pub fn chunk_file(path: &Path, block_size: usize, coordinator: &ChunkCoordinator) -> Result<Blob> {
    let file = File::open(path).map_err(|source| BlobPackError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let blob = chunk_stream(file, &file_name_of(path), path, block_size, coordinator)?;
    info!(
        file = %path.display(),
        chunks = blob.chunks.len(),
        bytes = blob.total_size(),
        "chunked file"
    );
    Ok(blob)
}

fn chunk_stream<R: Read>(
    mut reader: R,
    file_name: &str,
    source_path: &Path,
    block_size: usize,
    coordinator: &ChunkCoordinator,
) -> Result<Blob> {
    if block_size == 0 {
        return Err(BlobPackError::Config("chunk size must be non-zero".into()));
    }

    let mut blob = Blob::new(file_name);
    let mut buf = vec![0u8; block_size];

    loop {
        let n = read_block(&mut reader, &mut buf).map_err(|source| BlobPackError::Read {
            path: source_path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }

        let data = buf[..n].to_vec();
        let checksum = chunk_checksum(&data);
        coordinator.admit(&mut blob, ChunkDraft { checksum, data })?;

        if n < block_size {
            break;
        }
    }

    Ok(blob)
}
