//! Integration tests for soa-store

use bytemuck::Zeroable;
use rayon::prelude::*;
use soa_store::prelude::*;
use soa_store::{ArchetypeConfig, INITIAL_CAPACITY, StoreError};

// ============================================================================
// Test Rows
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Zeroable)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Zeroable)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Row)]
struct Body {
    position: Position,
    velocity: Velocity,
    mass: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Row)]
struct Edge(u32, u32);

fn body(i: u32) -> Body {
    let f = i as f32;
    Body {
        position: Position { x: f, y: 0.0, z: 0.0 },
        velocity: Velocity { x: 1.0, y: f, z: 0.0 },
        mass: f * 2.0,
    }
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_two_int_columns_scenario() {
    let mut archetype = Archetype::<(i32, i32)>::new(4).unwrap();
    for (a, b) in [(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)] {
        archetype.add((a, b)).unwrap();
    }

    assert_eq!(archetype.chunk_count(), 2);
    let lens: Vec<usize> = archetype.iter_chunks().map(Chunk::len).collect();
    assert_eq!(lens, vec![4, 1]);
    assert_eq!(archetype.get_row(Location::new(0, 1)).unwrap(), (2, 20));

    let version_before = archetype.chunk(0).unwrap().version();
    archetype.remove(Location::new(0, 1)).unwrap();

    assert_eq!(archetype.get_row(Location::new(0, 1)).unwrap(), (4, 40));
    assert_eq!(archetype.chunk(0).unwrap().len(), 3);
    assert_eq!(archetype.chunk(0).unwrap().version(), version_before + 1);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_round_trip_through_locations() {
    let mut archetype = Archetype::<Body>::new(16).unwrap();
    let locations: Vec<Location> = (0..100).map(|i| archetype.add(body(i)).unwrap()).collect();

    for (i, &location) in locations.iter().enumerate() {
        let expected = body(i as u32);
        assert_eq!(archetype.get_row(location).unwrap(), expected);
        assert_eq!(*archetype.get::<0>(location).unwrap(), expected.position);
        assert_eq!(*archetype.get::<1>(location).unwrap(), expected.velocity);
        assert_eq!(*archetype.get::<2>(location).unwrap(), expected.mass);
    }
}

#[test]
fn test_swap_remove_moves_last_row() {
    let mut chunk = Chunk::<Edge>::new(8).unwrap();
    for i in 0..6 {
        chunk.add(Edge(i, i + 100));
    }

    let last = chunk.get_row(5).unwrap();
    let removal = chunk.remove(2).unwrap();

    assert_eq!(removal.removed, Edge(2, 102));
    assert_eq!(removal.relocated_from, Some(5));
    assert_eq!(chunk.get_row(2).unwrap(), last);
    assert_eq!(chunk.len(), 5);
}

#[test]
fn test_chunk_capacity_ceiling() {
    const N: usize = 32;
    let mut chunk = Chunk::<(u64,)>::new(N).unwrap();

    let accepted = (0..N as u64 + 10).filter(|&i| chunk.add((i,)).is_some()).count();

    assert_eq!(accepted, N);
    assert!(chunk.is_full());
}

#[test]
fn test_archetype_grows_one_chunk_at_a_time() {
    const N: usize = 10;
    let mut archetype = Archetype::<Edge>::new(N).unwrap();

    for i in 0..(2 * N + 1) as u32 {
        archetype.add(Edge(i, i)).unwrap();
    }

    let lens: Vec<usize> = archetype.iter_chunks().map(Chunk::len).collect();
    assert_eq!(lens, vec![N, N, 1]);
    assert_eq!(archetype.len(), 2 * N + 1);
}

#[test]
fn test_version_moves_by_one_per_mutation() {
    let mut archetype = Archetype::<(u32,)>::new(8).unwrap();
    let mut expected = 0;

    for i in 0..5 {
        let location = archetype.add((i,)).unwrap();
        expected += 1;
        assert_eq!(archetype.chunk(location.chunk_index()).unwrap().version(), expected);
    }

    archetype.remove(Location::new(0, 0)).unwrap();
    expected += 1;
    assert_eq!(archetype.chunk(0).unwrap().version(), expected);

    let mut seen = Vec::new();
    archetype.for_each_chunk(|chunk| seen.push(chunk.version()));
    assert_eq!(seen, vec![expected]);
    assert_eq!(archetype.chunk(0).unwrap().version(), expected);
}

#[test]
fn test_growth_reallocations_are_logarithmic() {
    const M: u32 = 100_000;
    let mut store = ColumnarStore::<(u32, f32)>::new();
    let mut reallocations = 0;
    let mut capacity = store.capacity();

    for i in 0..M {
        store.push_row((i, i as f32)).unwrap();
        if store.capacity() != capacity {
            assert!(capacity == 0 || store.capacity() == capacity * 2);
            capacity = store.capacity();
            reallocations += 1;
        }
    }

    // 16 << 13 = 131072 is the first capacity above M
    assert_eq!(capacity, INITIAL_CAPACITY << 13);
    assert_eq!(reallocations, 14);
}

// ============================================================================
// Derived Rows
// ============================================================================

#[test]
fn test_derived_row_columns() {
    assert_eq!(Body::COLUMNS, 3);
    assert_eq!(Edge::COLUMNS, 2);

    let mut store = ColumnarStore::<Body>::new();
    store.push_row(body(1)).unwrap();
    store.push_row(body(2)).unwrap();

    let masses: &[f32] = store.column::<2>();
    assert_eq!(masses, &[2.0, 4.0]);

    for velocity in store.column_mut::<1>() {
        velocity.z = 9.0;
    }
    assert_eq!(store.get_row(1).unwrap().velocity.z, 9.0);
}

#[test]
fn test_derived_row_column_alignment() {
    let mut store = ColumnarStore::<Body>::new();
    store.push_row(body(0)).unwrap();

    assert_eq!(store.column::<0>().as_ptr() as usize % soa_store::CACHE_LINE, 0);
    assert_eq!(store.column::<1>().as_ptr() as usize % soa_store::CACHE_LINE, 0);
    assert_eq!(store.column::<2>().as_ptr() as usize % soa_store::CACHE_LINE, 0);
}

// ============================================================================
// Entity Registry Contract
// ============================================================================

#[test]
fn test_registry_fixup_from_removal() {
    // Minimal registry: entity id -> location, plus location -> entity id per chunk
    let mut archetype = Archetype::<(u32,)>::new(4).unwrap();
    let mut locations: Vec<Option<Location>> = Vec::new();
    let mut occupants: Vec<Vec<u32>> = Vec::new();

    for entity in 0..10u32 {
        let location = archetype.add((entity,)).unwrap();
        if occupants.len() <= location.chunk_index() {
            occupants.push(Vec::new());
        }
        occupants[location.chunk_index()].push(entity);
        locations.push(Some(location));
    }

    for entity in [1u32, 4, 0, 9, 5] {
        let location = locations[entity as usize].take().unwrap();
        let removal = archetype.remove(location).unwrap();
        assert_eq!(removal.removed, (entity,));

        let slots = &mut occupants[location.chunk_index()];
        if let Some(from) = removal.relocated_from {
            let moved = slots[from.element_index()];
            slots[location.element_index()] = moved;
            locations[moved as usize] = Some(location);
        }
        slots.pop();
    }

    for (entity, location) in locations.iter().enumerate() {
        if let Some(location) = location {
            assert_eq!(archetype.get_row(*location).unwrap(), (entity as u32,));
        }
    }
    assert_eq!(archetype.len(), 5);
}

// ============================================================================
// Parallel Chunk Processing
// ============================================================================

#[test]
fn test_disjoint_chunks_in_parallel() {
    let mut archetype =
        Archetype::<Body>::with_config(ArchetypeConfig::for_chunk_bytes::<Body>(1024)).unwrap();
    for i in 0..1000 {
        archetype.add(body(i)).unwrap();
    }
    assert!(archetype.chunk_count() > 1);

    {
        let mut chunks = archetype.chunks_mut();
        chunks[..].par_iter_mut().for_each(|chunk| {
            let velocities: Vec<Velocity> = chunk.column::<1>().to_vec();
            for (position, velocity) in chunk.column_mut::<0>().iter_mut().zip(velocities) {
                position.x += velocity.x;
                position.y += velocity.y;
            }
        });
    }

    for i in 0..1000u32 {
        let per_chunk = archetype.chunk_capacity();
        let location = Location::new(i as usize / per_chunk, i as usize % per_chunk);
        let position = archetype.get::<0>(location).unwrap();
        assert_eq!(position.x, i as f32 + 1.0);
        assert_eq!(position.y, i as f32);
    }
    assert_eq!(archetype.len(), 1000);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_out_of_range_is_an_error_everywhere() {
    let mut store = ColumnarStore::<(u8,)>::new();
    assert_eq!(
        store.get_row(0),
        Err(StoreError::RowOutOfBounds { index: 0, len: 0 })
    );
    assert!(store.swap_rows(0, 1).is_err());

    let mut chunk = Chunk::<(u8,)>::new(1).unwrap();
    assert!(chunk.remove(0).is_err());
    assert_eq!(chunk.version(), 0);

    let mut archetype = Archetype::<(u8,)>::new(1).unwrap();
    assert_eq!(
        archetype.get_row(Location::new(0, 0)),
        Err(StoreError::ChunkOutOfBounds { index: 0, count: 0 })
    );
    assert!(archetype.remove(Location::new(3, 0)).is_err());
    assert!(archetype.is_empty());
}
