// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{UnitQuaternion, Vector3};
use polycsg::{do_csg_operation, CsgOperation, FaceProperties, Mesh, Primitive};

const OPERATIONS: [CsgOperation; 4] = [
    CsgOperation::Union,
    CsgOperation::Intersect,
    CsgOperation::Subtract,
    CsgOperation::PaintIntersect,
];

fn cube(id: u32, offset: Vector3<f64>) -> Mesh {
    let mut mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh(id, FaceProperties::new(id));
    mesh.translate(offset);
    mesh
}

fn prism(id: u32, sides: u32) -> Mesh {
    let mut mesh = Primitive::prism(20.0, 4.0, sides).to_mesh(id, FaceProperties::new(id));
    mesh.translate(Vector3::new(2.0, -10.0, 1.0));
    mesh.rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.25);
    mesh
}

fn bench_cube_cube(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_cube");

    let a = cube(1, Vector3::zeros());
    let b = cube(2, Vector3::new(5.0, 5.0, 2.5));
    for operation in OPERATIONS {
        group.bench_with_input(BenchmarkId::new(format!("{operation:?}"), ""), &operation, |bench, &op| {
            bench.iter(|| do_csg_operation(black_box(&a), black_box(&b), op));
        });
    }

    group.finish();
}

fn bench_cube_prism(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_prism");

    let a = cube(1, Vector3::zeros());
    for sides in [8, 32] {
        let b = prism(2, sides);
        for operation in OPERATIONS {
            group.bench_with_input(BenchmarkId::new(format!("{operation:?}"), sides), &operation, |bench, &op| {
                bench.iter(|| do_csg_operation(black_box(&a), black_box(&b), op));
            });
        }
    }

    group.finish();
}

fn bench_disjoint(c: &mut Criterion) {
    let a = cube(1, Vector3::zeros());
    let b = cube(2, Vector3::new(100.0, 0.0, 0.0));

    c.bench_function("disjoint_union", |bench| {
        bench.iter(|| do_csg_operation(black_box(&a), black_box(&b), CsgOperation::Union));
    });
}

criterion_group!(benches, bench_cube_cube, bench_cube_prism, bench_disjoint);
criterion_main!(benches);
