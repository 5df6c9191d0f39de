//! Test that column types cannot be declared from safe code.

use soa_store::{ColumnAt, Row};

#[derive(Clone, Copy, Row)]
struct Byte(u8);

impl ColumnAt<1> for Byte {
    type Type = [u64; 8];
}

fn main() {}
