//! Test that PhantomData is forbidden in rows.

use std::marker::PhantomData;

use soa_store::Row;

#[derive(Clone, Copy, Row)]
struct Tagged {
    value: u64,
    tag: PhantomData<u8>,
}

fn main() {}
