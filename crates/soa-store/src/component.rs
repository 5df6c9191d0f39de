//! Component bounds and per-column layout metadata.
//!
//! A component is one field of a row. Every component type gets its own
//! column, described at runtime by a [`ColumnLayout`].

use std::{alloc::Layout, any::TypeId, fmt};

use bytemuck::Zeroable;

use crate::error::{StoreError, StoreResult};

/// Alignment every column buffer is raised to, so that each column starts
/// on its own cache line.
pub const CACHE_LINE: usize = 64;

/// Marker trait for types that can be stored in a column.
///
/// Columns move rows with plain byte copies when they grow, shrink or
/// swap-remove, so components must be `Copy`: no drop glue, no
/// self-references. `Zeroable` lets [`ColumnarStore::resize`] expose
/// new rows as all-zero values instead of uninitialized memory.
///
/// [`ColumnarStore::resize`]: crate::ColumnarStore::resize
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Copy, Zeroable)]
/// struct Position { x: f32, y: f32, z: f32 }
/// ```
pub trait Component: Copy + Send + Sync + Zeroable + 'static {}

// Blanket implementation for all suitable types
impl<T: Copy + Send + Sync + Zeroable + 'static> Component for T {}

/// Runtime description of one column.
#[derive(Clone, Copy)]
pub struct ColumnLayout {
    /// Type name for debugging.
    name: &'static str,
    /// Layout of a single element.
    item: Layout,
    /// Alignment of the column buffer (never below [`CACHE_LINE`]).
    storage_align: usize,
    /// Rust TypeId for debug type checks.
    type_id: TypeId,
}

impl ColumnLayout {
    /// Describe the column for a concrete component type.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        let item = Layout::new::<T>();
        Self {
            name: std::any::type_name::<T>(),
            item,
            storage_align: item.align().max(CACHE_LINE),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Get the component type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Get the element size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.item.size()
    }

    /// Get the natural alignment of the element type.
    #[must_use]
    pub const fn align(&self) -> usize {
        self.item.align()
    }

    /// Get the alignment the column buffer is allocated with.
    #[must_use]
    pub const fn storage_align(&self) -> usize {
        self.storage_align
    }

    /// Check if the column stores values of type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Layout of a buffer holding `count` elements.
    pub fn array(&self, count: usize) -> StoreResult<Layout> {
        let bytes = self
            .size()
            .checked_mul(count)
            .ok_or(StoreError::CapacityOverflow)?;
        Layout::from_size_align(bytes, self.storage_align).map_err(|_| StoreError::CapacityOverflow)
    }
}

impl fmt::Debug for ColumnLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnLayout")
            .field("name", &self.name)
            .field("size", &self.item.size())
            .field("align", &self.item.align())
            .field("storage_align", &self.storage_align)
            .finish()
    }
}
