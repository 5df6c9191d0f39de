//! Archetype storage - an unbounded table built from fixed-size chunks.
//!
//! All chunks share one column signature `R`. Rows are addressed by a
//! [`Location`] (`chunk_index`, `element_index`). Chunks are appended one at
//! a time when every existing chunk is full, never reordered, and only freed
//! when the archetype is dropped.
//!
//! Removal swap-removes inside the addressed chunk, so it may move the last
//! row of that chunk. The returned [`Removal`] names the moved row; whoever
//! maps entities to locations must apply it.

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use tracing::debug;

use crate::{
    chunk::Chunk,
    config::ArchetypeConfig,
    error::{StoreError, StoreResult},
    row::{ColumnAt, Row},
    store::Removal,
};

/// Where a row lives inside an archetype.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    chunk_index: usize,
    element_index: usize,
}

impl Location {
    /// Create a location from its parts.
    #[must_use]
    pub const fn new(chunk_index: usize, element_index: usize) -> Self {
        Self {
            chunk_index,
            element_index,
        }
    }

    /// Index of the chunk, in creation order.
    #[must_use]
    pub const fn chunk_index(self) -> usize {
        self.chunk_index
    }

    /// Index of the row inside its chunk.
    #[must_use]
    pub const fn element_index(self) -> usize {
        self.element_index
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({}:{})", self.chunk_index, self.element_index)
    }
}

/// An archetype - chunked storage for rows with the same columns.
pub struct Archetype<R: Row> {
    /// Chunks in creation order.
    chunks: Vec<Chunk<R>>,
    /// Rows per chunk.
    chunk_capacity: usize,
    /// Sum of all chunk lengths.
    len: usize,
    /// Every chunk before this index is full.
    first_open: usize,
}

impl<R: Row> Default for Archetype<R> {
    fn default() -> Self {
        Self::from_valid_config(ArchetypeConfig::default())
    }
}

impl<R: Row> Archetype<R> {
    /// Create an empty archetype whose chunks hold `chunk_capacity` rows.
    pub fn new(chunk_capacity: usize) -> StoreResult<Self> {
        Self::with_config(ArchetypeConfig::new(chunk_capacity))
    }

    /// Create an empty archetype from a config.
    pub fn with_config(config: ArchetypeConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ArchetypeConfig) -> Self {
        Self {
            chunks: Vec::new(),
            chunk_capacity: config.chunk_capacity,
            len: 0,
            first_open: 0,
        }
    }

    /// Add a row to the first chunk (in creation order) with a free slot,
    /// appending a new chunk if all are full.
    pub fn add(&mut self, row: R) -> StoreResult<Location> {
        for (chunk_index, chunk) in self.chunks.iter_mut().enumerate().skip(self.first_open) {
            if let Some(element_index) = chunk.add(row) {
                self.first_open = chunk_index;
                self.len += 1;
                return Ok(Location::new(chunk_index, element_index));
            }
        }

        let mut chunk = Chunk::new(self.chunk_capacity)?;
        let chunk_index = self.chunks.len();
        debug!(
            chunk = chunk_index,
            capacity = self.chunk_capacity,
            rows = self.len,
            "appending archetype chunk"
        );

        // A fresh chunk has at least one free slot
        let element_index = chunk.add(row).ok_or(StoreError::ZeroCapacity)?;
        self.chunks.push(chunk);
        self.first_open = chunk_index;
        self.len += 1;
        Ok(Location::new(chunk_index, element_index))
    }

    /// Swap-remove the row at `location`.
    ///
    /// If `relocated_from` is set on the result, the row previously at that
    /// location now lives at `location`.
    pub fn remove(&mut self, location: Location) -> StoreResult<Removal<R, Location>> {
        let chunk_index = location.chunk_index;
        let removal = self.chunk_entry(chunk_index)?.remove(location.element_index)?;

        self.len -= 1;
        self.first_open = self.first_open.min(chunk_index);
        Ok(removal.map_index(|element_index| Location::new(chunk_index, element_index)))
    }

    /// Get one component of the row at `location`.
    pub fn get<const I: usize>(&self, location: Location) -> StoreResult<&<R as ColumnAt<I>>::Type>
    where
        R: ColumnAt<I>,
    {
        self.chunk(location.chunk_index)?
            .get::<I>(location.element_index)
    }

    /// Mutably get one component of the row at `location`.
    pub fn get_mut<const I: usize>(
        &mut self,
        location: Location,
    ) -> StoreResult<&mut <R as ColumnAt<I>>::Type>
    where
        R: ColumnAt<I>,
    {
        self.chunk_entry(location.chunk_index)?
            .get_mut::<I>(location.element_index)
    }

    /// Copy out the row at `location`.
    pub fn get_row(&self, location: Location) -> StoreResult<R> {
        self.chunk(location.chunk_index)?
            .get_row(location.element_index)
    }

    /// Overwrite the row at `location`.
    pub fn set_row(&mut self, location: Location, row: R) -> StoreResult<()> {
        self.chunk_entry(location.chunk_index)?
            .set_row(location.element_index, row)
    }

    /// Check if `location` addresses a live row.
    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        self.chunks
            .get(location.chunk_index)
            .is_some_and(|chunk| location.element_index < chunk.len())
    }

    /// Call `f` on every chunk, in creation order.
    ///
    /// Row counts are re-read afterwards, so `f` may add or remove rows.
    pub fn for_each_chunk(&mut self, mut f: impl FnMut(&mut Chunk<R>)) {
        for chunk in self.chunks_mut().iter_mut() {
            f(chunk);
        }
    }

    /// Iterate over chunks, in creation order.
    pub fn iter_chunks(&self) -> std::slice::Iter<'_, Chunk<R>> {
        self.chunks.iter()
    }

    /// All chunks, in creation order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk<R>] {
        &self.chunks
    }

    /// Mutable access to all chunks at once, e.g. to hand disjoint chunks to
    /// worker threads.
    ///
    /// Row counts are re-read when the returned guard is dropped.
    pub fn chunks_mut(&mut self) -> ChunksMut<'_, R> {
        ChunksMut { archetype: self }
    }

    /// Get a chunk by index.
    pub fn chunk(&self, index: usize) -> StoreResult<&Chunk<R>> {
        self.chunks.get(index).ok_or(StoreError::ChunkOutOfBounds {
            index,
            count: self.chunks.len(),
        })
    }

    /// Get a mutable chunk by index.
    ///
    /// Rows may be added or removed through the returned guard; the
    /// archetype's row total is fixed up when it is dropped.
    pub fn chunk_mut(&mut self, index: usize) -> StoreResult<ChunkMut<'_, R>> {
        let len_before = self.chunk(index)?.len();
        Ok(ChunkMut {
            archetype: self,
            index,
            len_before,
        })
    }

    /// Chunk access for operations that keep `len` and `first_open` in step
    /// themselves.
    fn chunk_entry(&mut self, index: usize) -> StoreResult<&mut Chunk<R>> {
        let count = self.chunks.len();
        self.chunks
            .get_mut(index)
            .ok_or(StoreError::ChunkOutOfBounds { index, count })
    }

    /// Remove every row. Chunks stay allocated.
    pub fn clear(&mut self) {
        for chunk in &mut self.chunks {
            chunk.clear();
        }
        self.len = 0;
        self.first_open = 0;
    }

    /// Get the total number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the archetype holds no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Get the fixed row capacity of each chunk.
    #[must_use]
    pub const fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    /// Get the number of rows the allocated chunks can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.chunk_capacity
    }

    /// Account for rows added or removed through one chunk.
    fn resync_chunk(&mut self, index: usize, len_before: usize) {
        let chunk = &self.chunks[index];
        self.len = self.len - len_before + chunk.len();

        if !chunk.is_full() {
            self.first_open = self.first_open.min(index);
        } else if index == self.first_open {
            self.first_open = self.chunks[index..]
                .iter()
                .position(|chunk| !chunk.is_full())
                .map_or(self.chunks.len(), |offset| index + offset);
        }
    }

    fn resync(&mut self) {
        self.len = self.chunks.iter().map(Chunk::len).sum();
        self.first_open = self
            .chunks
            .iter()
            .position(|chunk| !chunk.is_full())
            .unwrap_or(self.chunks.len());
    }
}

impl<R: Row> fmt::Debug for Archetype<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("len", &self.len)
            .field("chunk_count", &self.chunks.len())
            .field("chunk_capacity", &self.chunk_capacity)
            .finish()
    }
}

/// Mutable view of an archetype's chunks.
///
/// Dereferences to `[Chunk<R>]`. Dropping it recomputes the archetype's
/// row total, so rows may be added or removed through the chunks.
pub struct ChunksMut<'a, R: Row> {
    archetype: &'a mut Archetype<R>,
}

impl<R: Row> Deref for ChunksMut<'_, R> {
    type Target = [Chunk<R>];

    fn deref(&self) -> &Self::Target {
        &self.archetype.chunks
    }
}

impl<R: Row> DerefMut for ChunksMut<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.archetype.chunks
    }
}

impl<R: Row> Drop for ChunksMut<'_, R> {
    fn drop(&mut self) {
        self.archetype.resync();
    }
}

/// Mutable view of a single chunk.
///
/// Dereferences to [`Chunk<R>`]. Dropping it folds the chunk's new row
/// count back into the archetype.
pub struct ChunkMut<'a, R: Row> {
    archetype: &'a mut Archetype<R>,
    index: usize,
    len_before: usize,
}

impl<R: Row> Deref for ChunkMut<'_, R> {
    type Target = Chunk<R>;

    fn deref(&self) -> &Self::Target {
        &self.archetype.chunks[self.index]
    }
}

impl<R: Row> DerefMut for ChunkMut<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.archetype.chunks[self.index]
    }
}

impl<R: Row> Drop for ChunkMut<'_, R> {
    fn drop(&mut self) {
        self.archetype.resync_chunk(self.index, self.len_before);
    }
}
