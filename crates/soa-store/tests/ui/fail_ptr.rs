//! Test that raw pointers are forbidden in rows.

use soa_store::Row;

#[derive(Clone, Copy, Row)]
struct Link {
    weight: f32,
    next: *const Link,
}

fn main() {}
