//! Test that tuple structs become one column per field.

use soa_store::{ColumnarStore, Row};

#[derive(Clone, Copy, Row)]
struct Edge(u32, u32, f32);

fn main() {
    let mut store = ColumnarStore::<Edge>::new();
    store.push_row(Edge(0, 1, 0.5)).unwrap();

    let weights: &[f32] = store.column::<2>();
    assert_eq!(weights, &[0.5]);
    assert_eq!(<Edge as Row>::COLUMNS, 3);
}
