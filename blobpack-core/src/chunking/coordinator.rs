use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::constants::{FIRST_CHUNK_ID, LENGTH_PREFIX_LEN};
use crate::error::{BlobPackError, Result};
use crate::manifest::blob::{Blob, Chunk};

/// Id and provisional stream offset handed to an admitted chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub id: u64,
    pub position: u64,
}

/// A hashed chunk waiting for its id.
#[derive(Debug, Clone)]
pub struct ChunkDraft {
    pub checksum: String,
    pub data: Vec<u8>,
}

/// Counter values at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorState {
    pub next_chunk_id: u64,
    pub stream_position: u64,
}

#[derive(Debug)]
struct Counters {
    next_chunk_id: u64,
    stream_position: u64,
}

/// Run-wide chunk id and stream position counters.
///
/// Both counters live behind one lock so an id and its stream reservation are
/// always taken together. One coordinator is shared (via `Arc`) by every
/// chunking task of a run.
#[derive(Debug)]
pub struct ChunkCoordinator {
    first_id: u64,
    counters: Mutex<Counters>,
}

impl Default for ChunkCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkCoordinator {
    pub fn new() -> Self {
        Self::starting_at(FIRST_CHUNK_ID)
    }

    pub fn starting_at(first_id: u64) -> Self {
        Self {
            first_id,
            counters: Mutex::new(Counters {
                next_chunk_id: first_id,
                stream_position: 0,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Counters>> {
        self.counters
            .lock()
            .map_err(|_| BlobPackError::Coordinator("counter lock poisoned".into()))
    }

    fn reserve(counters: &mut Counters, size: u32) -> Allocation {
        let allocation = Allocation {
            id: counters.next_chunk_id,
            position: counters.stream_position,
        };
        counters.next_chunk_id += 1;
        counters.stream_position += LENGTH_PREFIX_LEN + size as u64;
        allocation
    }

    /// Take the next id and reserve `4 + size` bytes of stream.
    pub fn allocate(&self, size: u32) -> Result<Allocation> {
        let mut counters = self.lock()?;
        Ok(Self::reserve(&mut counters, size))
    }

    /// Allocate for `draft` and append it to `blob` while holding the lock.
    pub fn admit(&self, blob: &mut Blob, draft: ChunkDraft) -> Result<Allocation> {
        let size = u32::try_from(draft.data.len()).map_err(|_| {
            BlobPackError::InvalidData(format!(
                "chunk of {} bytes does not fit a 4-byte length prefix",
                draft.data.len()
            ))
        })?;

        let mut counters = self.lock()?;
        let allocation = Self::reserve(&mut counters, size);
        blob.add_chunk(Chunk {
            id: allocation.id,
            checksum: draft.checksum,
            size,
            position: allocation.position,
            data: draft.data,
        });
        drop(counters);

        debug!(
            file = %blob.file_name,
            id = allocation.id,
            size,
            position = allocation.position,
            "admitted chunk"
        );
        Ok(allocation)
    }

    pub fn snapshot(&self) -> Result<CoordinatorState> {
        let counters = self.lock()?;
        Ok(CoordinatorState {
            next_chunk_id: counters.next_chunk_id,
            stream_position: counters.stream_position,
        })
    }

    /// Number of chunks admitted so far.
    pub fn allocated(&self) -> Result<u64> {
        Ok(self.snapshot()?.next_chunk_id - self.first_id)
    }
}
