// Allow unsafe code - columns are manually allocated, type-erased buffers
#![allow(unsafe_code)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::ptr_as_ptr)]
#![allow(clippy::cast_ptr_alignment)]
#![allow(clippy::float_cmp)]

//! Chunked struct-of-arrays storage for archetype tables.
//!
//! Stores large homogeneous collections of per-entity data in contiguous,
//! cache-line aligned columns, one column per component type.
//!
//! # Layers
//!
//! - **[`ColumnarStore`]**: growable table of `n` aligned columns with a
//!   shared row count. Amortized O(1) push, O(1) swap-remove.
//! - **[`Chunk`]**: a store pre-sized to a fixed capacity that never grows,
//!   plus a version counter bumped on every add/remove.
//! - **[`Archetype`]**: an unbounded sequence of chunks sharing one column
//!   signature, addressed by [`Location`].
//!
//! Data flows strictly downward: the archetype picks a chunk, the chunk
//! delegates to its store.
//!
//! # Column signatures
//!
//! The columns are a compile-time list of [`Component`] types, expressed as
//! a [`Row`]: a tuple, or a struct with `#[derive(Row)]`. Columns are
//! addressed by position, `column::<I>()`.
//!
//! ```ignore
//! use soa_store::{Archetype, Row};
//!
//! #[derive(Clone, Copy, Row)]
//! struct Particle { position: [f32; 3], velocity: [f32; 3] }
//!
//! let mut particles = Archetype::<Particle>::new(1024)?;
//! let at = particles.add(Particle { position: [0.0; 3], velocity: [1.0; 3] })?;
//!
//! particles.for_each_chunk(|chunk| {
//!     let n = chunk.len();
//!     for i in 0..n {
//!         let v = chunk.column::<1>()[i];
//!         let p = &mut chunk.column_mut::<0>()[i];
//!         for axis in 0..3 { p[axis] += v[axis]; }
//!     }
//! });
//! ```
//!
//! # Threading
//!
//! Nothing here locks or spawns. Mutate from one thread; once mutation is
//! done, disjoint chunks from [`Archetype::chunks_mut`] can be processed on
//! separate workers.
//!
//! # Stale locations
//!
//! Removal moves the last row of the affected chunk into the hole. The
//! [`Removal`] returned by [`Archetype::remove`] names that row's old
//! location; callers tracking entity locations must rewrite it.

mod archetype;
mod chunk;
mod column;
mod component;
mod config;
mod error;
pub mod row;
mod store;

pub use archetype::{Archetype, ChunkMut, ChunksMut, Location};
pub use chunk::Chunk;
pub use column::AlignedColumn;
pub use component::{CACHE_LINE, ColumnLayout, Component};
pub use config::{ArchetypeConfig, DEFAULT_CHUNK_CAPACITY};
pub use error::{StoreError, StoreResult};
pub use row::{ColumnAt, Row};
pub use soa_store_derive::Row;
pub use store::{ColumnarStore, INITIAL_CAPACITY, Removal};

#[doc(hidden)]
pub mod __private {
    pub use smallvec::SmallVec;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Archetype, Chunk, ColumnAt, ColumnarStore, Component, Location, Row};
}
