//! File chunking: hash, allocate ids under the shared coordinator, reassemble.

pub mod hasher;
pub mod coordinator;
pub mod splitter;
pub mod assembler;

pub use coordinator::{Allocation, ChunkCoordinator, ChunkDraft, CoordinatorState};
