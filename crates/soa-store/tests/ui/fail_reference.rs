//! Test that references are forbidden in rows.

use soa_store::Row;

#[derive(Clone, Copy, Row)]
struct Named {
    id: u32,
    name: &'static str,
}

fn main() {}
