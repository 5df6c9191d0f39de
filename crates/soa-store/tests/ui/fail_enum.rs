//! Test that enums cannot be rows.

use soa_store::Row;

#[derive(Clone, Copy, Row)]
enum Shape {
    Circle(f32),
    Square(f32),
}

fn main() {}
