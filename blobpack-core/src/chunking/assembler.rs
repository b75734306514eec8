use crate::constants::LENGTH_PREFIX_LEN;
use crate::error::{BlobPackError, Result};
use crate::manifest::blob::{Blob, Chunk};

/// Borrow the bytes of `chunk` from a container using its manifest entry.
///
/// The record's length prefix must agree with `chunk.size`. Checksums are not
/// verified.
pub fn read_chunk<'a>(container: &'a [u8], chunk: &Chunk) -> Result<&'a [u8]> {
    let start = usize::try_from(chunk.position)
        .map_err(|_| BlobPackError::InvalidData(format!("position {} out of range", chunk.position)))?;
    let prefix_end = start
        .checked_add(LENGTH_PREFIX_LEN as usize)
        .ok_or_else(|| BlobPackError::InvalidData(format!("position {} out of range", chunk.position)))?;
    let prefix = container.get(start..prefix_end).ok_or_else(|| {
        BlobPackError::InvalidData(format!(
            "chunk {} prefix at {} past end of container ({} bytes)",
            chunk.id,
            start,
            container.len()
        ))
    })?;

    let mut len = [0u8; 4];
    len.copy_from_slice(prefix);
    let recorded = u32::from_le_bytes(len);
    if recorded != chunk.size {
        return Err(BlobPackError::InvalidData(format!(
            "chunk {} at {}: container records {} bytes, manifest says {}",
            chunk.id, start, recorded, chunk.size
        )));
    }

    container
        .get(prefix_end..)
        .and_then(|rest| rest.get(..recorded as usize))
        .ok_or_else(|| {
            BlobPackError::InvalidData(format!("chunk {} truncated at {}", chunk.id, container.len()))
        })
}

/// Rebuild a file's original bytes from its container.
pub fn reassemble_blob(container: &[u8], blob: &Blob) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(blob.total_size() as usize);
    for chunk in &blob.chunks {
        result.extend_from_slice(read_chunk(container, chunk)?);
    }
    Ok(result)
}

/// Walk a container front to back, returning each record's payload.
pub fn split_records(container: &[u8]) -> Result<Vec<&[u8]>> {
    let mut records = Vec::new();
    let mut offset = 0usize;
    while offset < container.len() {
        let prefix_end = offset + LENGTH_PREFIX_LEN as usize;
        let prefix = container
            .get(offset..prefix_end)
            .ok_or_else(|| BlobPackError::InvalidData(format!("dangling bytes at {offset}")))?;
        let mut len = [0u8; 4];
        len.copy_from_slice(prefix);
        let end = prefix_end + u32::from_le_bytes(len) as usize;
        let payload = container
            .get(prefix_end..end)
            .ok_or_else(|| BlobPackError::InvalidData(format!("record at {offset} truncated")))?;
        records.push(payload);
        offset = end;
    }
    Ok(records)
}
