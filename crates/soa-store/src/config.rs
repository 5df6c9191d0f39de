//! Archetype configuration.

use crate::{
    component::ColumnLayout,
    error::{StoreError, StoreResult},
    row::Row,
};

/// Rows per chunk when nothing else is configured.
pub const DEFAULT_CHUNK_CAPACITY: usize = 1024;

/// Settings for an [`Archetype`](crate::Archetype).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchetypeConfig {
    /// Fixed number of rows every chunk holds.
    pub chunk_capacity: usize,
}

impl Default for ArchetypeConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
        }
    }
}

impl ArchetypeConfig {
    /// Config with an explicit chunk capacity.
    #[must_use]
    pub const fn new(chunk_capacity: usize) -> Self {
        Self { chunk_capacity }
    }

    /// Size chunks so their row data fits in roughly `bytes`.
    ///
    /// Only element sizes are counted; the per-column cache-line padding is
    /// not. Always yields at least one row. Rows made only of zero-sized
    /// components fall back to [`DEFAULT_CHUNK_CAPACITY`].
    #[must_use]
    pub fn for_chunk_bytes<R: Row>(bytes: usize) -> Self {
        let row_bytes: usize = R::layouts().iter().map(ColumnLayout::size).sum();
        let chunk_capacity = if row_bytes == 0 {
            DEFAULT_CHUNK_CAPACITY
        } else {
            (bytes / row_bytes).max(1)
        };
        Self { chunk_capacity }
    }

    /// Reject settings no archetype can run with.
    pub fn validate(&self) -> StoreResult<()> {
        if self.chunk_capacity == 0 {
            return Err(StoreError::ZeroCapacity);
        }
        Ok(())
    }
}
