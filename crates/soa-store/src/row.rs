//! Column signatures - the fixed, ordered list of component types a store holds.
//!
//! A [`Row`] is one logical entity's worth of data: one value per column.
//! Tuples of up to twelve components are rows out of the box, and
//! `#[derive(Row)]` turns a plain struct into one (a column per field, in
//! declaration order).
//!
//! [`ColumnAt`] maps a column position to its component type so that
//! `store.column::<1>()` is resolved at compile time.

use smallvec::{SmallVec, smallvec};

use crate::{
    column::AlignedColumn,
    component::{ColumnLayout, Component},
};

/// A fixed, ordered set of component columns.
///
/// # Safety
///
/// - `layouts()` must return exactly `COLUMNS` entries, one per component,
///   in column order.
/// - `write` and `read` must access column `i` only as the type described by
///   `layouts()[i]`.
pub unsafe trait Row: Copy + Send + Sync + 'static {
    /// Number of columns.
    const COLUMNS: usize;

    /// Layout of every column, in column order.
    fn layouts() -> SmallVec<[ColumnLayout; 8]>;

    /// Scatter this row into slot `index` of each column.
    ///
    /// # Safety
    ///
    /// `columns` must have been built from `Self::layouts()` and `index` must
    /// be below their capacity.
    unsafe fn write(self, columns: &mut [AlignedColumn], index: usize);

    /// Gather the row stored at slot `index`.
    ///
    /// # Safety
    ///
    /// Same as [`Row::write`].
    unsafe fn read(columns: &[AlignedColumn], index: usize) -> Self;
}

/// Compile-time lookup of the component type stored in column `I`.
///
/// # Safety
///
/// `Type` must be the component type described by `Self::layouts()[I]`.
/// Typed column views are built from this type without a runtime check.
pub unsafe trait ColumnAt<const I: usize>: Row {
    /// Component type of column `I`.
    type Type: Component;
}

/// Write one component into its column.
///
/// # Safety
///
/// `column` must store `T` and `index` must be below its capacity.
#[inline]
pub unsafe fn write_column<T: Component>(column: &mut AlignedColumn, index: usize, value: T) {
    debug_assert!(column.layout().is::<T>(), "Type mismatch in write_column");
    // SAFETY: Caller ensures type and bounds; column buffers are aligned for T
    unsafe { column.ptr_at(index).cast::<T>().write(value) }
}

/// Read one component out of its column.
///
/// # Safety
///
/// `column` must store `T` and `index` must be below its capacity.
#[inline]
#[must_use]
pub unsafe fn read_column<T: Component>(column: &AlignedColumn, index: usize) -> T {
    debug_assert!(column.layout().is::<T>(), "Type mismatch in read_column");
    // SAFETY: Caller ensures type and bounds; slots are always initialized (zeroed on allocation)
    unsafe { column.ptr_at(index).cast::<T>().read() }
}

macro_rules! impl_column_at {
    ($generics:tt; $($idx:tt => $ty:ident),+) => {
        $( impl_column_at!(@one $generics $idx $ty); )+
    };
    (@one [$($gen:ident),+] $idx:tt $ty:ident) => {
        // SAFETY: element `$idx` of the tuple is column `$idx`
        unsafe impl<$($gen: Component),+> ColumnAt<$idx> for ($($gen,)+) {
            type Type = $ty;
        }
    };
}

macro_rules! impl_row_for_tuple {
    ($($idx:tt => $ty:ident),+) => {
        // SAFETY: one layout per tuple element, and write/read touch column
        // `$idx` only as `$ty`
        unsafe impl<$($ty: Component),+> Row for ($($ty,)+) {
            const COLUMNS: usize = [$($idx),+].len();

            fn layouts() -> SmallVec<[ColumnLayout; 8]> {
                smallvec![$(ColumnLayout::of::<$ty>()),+]
            }

            #[inline]
            unsafe fn write(self, columns: &mut [AlignedColumn], index: usize) {
                debug_assert_eq!(columns.len(), Self::COLUMNS);
                // SAFETY: forwarded from the caller
                unsafe {
                    $( write_column::<$ty>(&mut columns[$idx], index, self.$idx); )+
                }
            }

            #[inline]
            unsafe fn read(columns: &[AlignedColumn], index: usize) -> Self {
                debug_assert_eq!(columns.len(), Self::COLUMNS);
                // SAFETY: forwarded from the caller
                unsafe { ($( read_column::<$ty>(&columns[$idx], index), )+) }
            }
        }

        impl_column_at!([$($ty),+]; $($idx => $ty),+);
    };
}

impl_row_for_tuple!(0 => A);
impl_row_for_tuple!(0 => A, 1 => B);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I);
impl_row_for_tuple!(0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J);
impl_row_for_tuple!(
    0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J, 10 => K
);
impl_row_for_tuple!(
    0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H, 8 => I, 9 => J, 10 => K,
    11 => L
);
