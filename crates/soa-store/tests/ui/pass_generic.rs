//! Test that generic structs derive rows for any component parameter.

use bytemuck::Zeroable;
use soa_store::{Archetype, Row};

#[derive(Clone, Copy, Zeroable)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Row)]
struct Sample<T, const N: usize> {
    value: T,
    history: [T; N],
    position: Vec3,
}

fn main() {
    let mut archetype = Archetype::<Sample<u16, 4>>::new(8).unwrap();
    let at = archetype
        .add(Sample {
            value: 3,
            history: [1, 2, 3, 0],
            position: Vec3 { x: 0.0, y: 1.0, z: 2.0 },
        })
        .unwrap();

    let history: &[u16; 4] = archetype.get::<1>(at).unwrap();
    assert_eq!(history, &[1, 2, 3, 0]);
}
