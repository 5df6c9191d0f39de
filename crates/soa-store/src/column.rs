//! Aligned column buffers - type-erased, separately allocated arrays.
//!
//! Each column owns exactly one allocation sized for `capacity` elements of
//! its component type, aligned to [`ColumnLayout::storage_align`]. The column
//! does not track how many elements are live; its owning store does.

use std::{
    alloc::{self, Layout},
    fmt,
    ptr::{self, NonNull},
};

use crate::{
    component::ColumnLayout,
    error::{StoreError, StoreResult},
};

/// A column of components of a single type.
///
/// Memory is zero-initialized on allocation and released on drop.
/// Zero-sized components never allocate.
pub struct AlignedColumn {
    /// Pointer to the data array (dangling while nothing is allocated).
    data: NonNull<u8>,
    /// Allocated capacity (in number of components).
    capacity: usize,
    /// Component layout.
    layout: ColumnLayout,
}

// SAFETY: Columns only ever hold `Component` values, which are Send + Sync,
// and the buffer is exclusively owned.
unsafe impl Send for AlignedColumn {}
unsafe impl Sync for AlignedColumn {}

impl AlignedColumn {
    /// Create a new empty column for the given layout.
    #[must_use]
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            data: dangling(layout.storage_align()),
            capacity: 0,
            layout,
        }
    }

    /// Create a column with room for `capacity` components.
    pub fn with_capacity(layout: ColumnLayout, capacity: usize) -> StoreResult<Self> {
        let data = allocate(&layout, capacity)?;
        Ok(Self {
            data,
            capacity,
            layout,
        })
    }

    /// Get the capacity (in number of components).
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the column layout.
    #[must_use]
    pub const fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Get a pointer to the start of the data array.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Copy the first `count` elements of `src` into this column.
    ///
    /// # Safety
    ///
    /// - `src` must store the same component type.
    /// - `count` must not exceed either column's capacity.
    pub unsafe fn copy_prefix_from(&mut self, src: &Self, count: usize) {
        debug_assert_eq!(self.layout.size(), src.layout.size());
        debug_assert!(count <= self.capacity && count <= src.capacity);
        // SAFETY: Caller ensures matching types and bounds; two columns never
        // share an allocation
        unsafe {
            ptr::copy_nonoverlapping(
                src.data.as_ptr(),
                self.data.as_ptr(),
                count * self.layout.size(),
            );
        }
    }

    /// Free the buffer and drop back to zero capacity.
    pub fn release(&mut self) {
        self.free();
        self.data = dangling(self.layout.storage_align());
        self.capacity = 0;
    }

    /// Get a raw pointer to the component slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than `capacity`.
    #[must_use]
    pub unsafe fn ptr_at(&self, index: usize) -> *mut u8 {
        debug_assert!(index < self.capacity);
        // SAFETY: Caller ensures index is within the allocation
        unsafe { self.data.as_ptr().add(index * self.layout.size()) }
    }

    /// Swap the components at `a` and `b`.
    ///
    /// # Safety
    ///
    /// Both indices must be less than `capacity`.
    pub unsafe fn swap(&mut self, a: usize, b: usize) {
        if a == b || self.layout.size() == 0 {
            return;
        }
        // SAFETY: Caller ensures both slots are in bounds; distinct slots never overlap
        unsafe {
            ptr::swap_nonoverlapping(self.ptr_at(a), self.ptr_at(b), self.layout.size());
        }
    }

    /// Zero the slots in `start..end`.
    ///
    /// # Safety
    ///
    /// `start <= end <= capacity`.
    pub unsafe fn zero(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.capacity);
        let size = self.layout.size();
        // SAFETY: Caller ensures the range is inside the allocation
        unsafe {
            ptr::write_bytes(self.data.as_ptr().add(start * size), 0, (end - start) * size);
        }
    }

    /// View the first `len` elements as a typed slice.
    ///
    /// # Safety
    ///
    /// - `T` must match the column's component type.
    /// - `len` must not exceed `capacity`.
    #[must_use]
    pub unsafe fn as_slice<T: 'static>(&self, len: usize) -> &[T] {
        debug_assert!(self.layout.is::<T>(), "Type mismatch in AlignedColumn::as_slice");
        debug_assert!(len <= self.capacity);
        // SAFETY: Caller ensures type and length; the buffer is aligned for T and zero-initialized
        unsafe { std::slice::from_raw_parts(self.data.as_ptr().cast::<T>(), len) }
    }

    /// View the first `len` elements as a mutable typed slice.
    ///
    /// # Safety
    ///
    /// - `T` must match the column's component type.
    /// - `len` must not exceed `capacity`.
    #[must_use]
    pub unsafe fn as_mut_slice<T: 'static>(&mut self, len: usize) -> &mut [T] {
        debug_assert!(self.layout.is::<T>(), "Type mismatch in AlignedColumn::as_mut_slice");
        debug_assert!(len <= self.capacity);
        // SAFETY: Caller ensures type and length; &mut self guarantees exclusivity
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr().cast::<T>(), len) }
    }

    fn free(&mut self) {
        if self.capacity == 0 || self.layout.size() == 0 {
            return;
        }
        if let Ok(layout) = self.layout.array(self.capacity) {
            // SAFETY: data was allocated with this exact layout
            unsafe { alloc::dealloc(self.data.as_ptr(), layout) };
        }
    }
}

impl Drop for AlignedColumn {
    fn drop(&mut self) {
        self.free();
    }
}

impl fmt::Debug for AlignedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedColumn")
            .field("layout", &self.layout)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Well-aligned placeholder pointer for empty and zero-sized columns.
fn dangling(align: usize) -> NonNull<u8> {
    // SAFETY: alignments are powers of two, never zero
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) }
}

fn allocate(layout: &ColumnLayout, capacity: usize) -> StoreResult<NonNull<u8>> {
    if capacity == 0 || layout.size() == 0 {
        return Ok(dangling(layout.storage_align()));
    }

    let array: Layout = layout.array(capacity)?;
    // SAFETY: array has non-zero size
    let ptr = unsafe { alloc::alloc_zeroed(array) };

    NonNull::new(ptr).ok_or(StoreError::AllocationFailed {
        bytes: array.size(),
        align: array.align(),
    })
}
