//! Storage error types.

use thiserror::Error;

/// Storage error type.
///
/// A full chunk is not an error: [`Chunk::add`](crate::Chunk::add) reports it
/// as `None` and the archetype reacts by appending a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The global allocator could not provide a column buffer.
    #[error("allocation of {bytes} bytes (align {align}) failed")]
    AllocationFailed {
        /// Requested buffer size.
        bytes: usize,
        /// Requested buffer alignment.
        align: usize,
    },

    /// A requested capacity does not fit in the address space.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// Row index past the live range of a store or chunk.
    #[error("row {index} out of bounds (len {len})")]
    RowOutOfBounds {
        /// Offending row index.
        index: usize,
        /// Number of live rows.
        len: usize,
    },

    /// Chunk index past the chunks of an archetype.
    #[error("chunk {index} out of bounds ({count} chunks)")]
    ChunkOutOfBounds {
        /// Offending chunk index.
        index: usize,
        /// Number of chunks.
        count: usize,
    },

    /// Chunks must hold at least one row.
    #[error("chunk capacity must be non-zero")]
    ZeroCapacity,
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
