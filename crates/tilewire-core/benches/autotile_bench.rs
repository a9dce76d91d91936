//! Criterion benchmarks for wire autotiling and overlay lookup.
//!
//! Two benchmark groups:
//! - `resolver`: the sixteen-case table, direct and through an adjacency query
//! - `overlay`: registry overlay lookup for wires (per-shape) and levers (static)

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tilewire_core::autotile::*;
use tilewire_core::catalog;
use tilewire_core::components::Entity;
use tilewire_core::geometry::{Direction, GridPosition};
use tilewire_core::id::VariantId;
use tilewire_core::test_utils::{StaticConnectivity, all_patterns};

// ===========================================================================
// Resolver
// ===========================================================================

fn bench_resolver(c: &mut Criterion) {
    let patterns = all_patterns();
    let mut group = c.benchmark_group("resolver");

    group.bench_function("all_patterns", |b| {
        b.iter(|| {
            for pattern in &patterns {
                black_box(compute_optimal_shape_and_rotation(black_box(*pattern)));
            }
        })
    });

    // A 64x64 field where every tile is connected left and right.
    let mut field = StaticConnectivity::default();
    let straight = ConnectivityPattern::new(false, true, false, true);
    for x in 0..64 {
        for y in 0..64 {
            let tile = GridPosition::new(x, y);
            for edge in Direction::all() {
                if straight.is_connected(edge) {
                    field.connect(tile, ConductiveClass::First, edge);
                }
            }
        }
    }

    group.bench_function("resolve_at_64x64", |b| {
        b.iter(|| {
            for x in 0..64 {
                for y in 0..64 {
                    black_box(resolve_at(
                        &field,
                        GridPosition::new(x, y),
                        ConductiveClass::First,
                    ));
                }
            }
        })
    });

    group.finish();
}

// ===========================================================================
// Overlay lookup
// ===========================================================================

fn bench_overlay(c: &mut Criterion) {
    let registry = catalog::standard_registry().expect("standard catalog is valid");
    let wire = registry.building_id(catalog::WIRE).expect("wire registered");
    let lever = registry.building_id(catalog::LEVER).expect("lever registered");
    let default = VariantId::default_variant();
    let entity = Entity::new();

    let mut group = c.benchmark_group("overlay");

    group.bench_function("wire_per_shape", |b| {
        b.iter(|| {
            for rotation_variant in 0..4 {
                for degrees in [0, 90, 180, 270] {
                    black_box(
                        registry
                            .overlay_render_matrix(
                                wire,
                                degrees,
                                rotation_variant,
                                &default,
                                None,
                            )
                            .expect("valid lookup"),
                    );
                }
            }
        })
    });

    group.bench_function("lever_static", |b| {
        b.iter(|| {
            for degrees in [0, 90, 180, 270] {
                black_box(
                    registry
                        .overlay_render_matrix(lever, degrees, 0, &default, Some(&entity))
                        .expect("valid lookup"),
                );
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_resolver, bench_overlay);
criterion_main!(benches);
