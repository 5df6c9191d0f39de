//! Test that a row needs at least one column.

use soa_store::Row;

#[derive(Clone, Copy, Row)]
struct Marker;

#[derive(Clone, Copy, Row)]
struct Empty {}

fn main() {}
