//! Test that unions cannot be rows.

use soa_store::Row;

#[derive(Clone, Copy, Row)]
union Bits {
    int: u32,
    float: f32,
}

fn main() {}
