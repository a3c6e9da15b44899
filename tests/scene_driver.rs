// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Brush edits applied to a scene of meshes

mod common;

use approx::assert_relative_eq;
use common::{cube, signed_volume};
use nalgebra::Vector3;
use polycsg::{csg_mesh_from_model, CsgOperation, MeshIndex, Model, SceneModel};

fn row_of_cubes() -> SceneModel {
    let mut model = SceneModel::new();
    for (id, x) in [(1, 0.0), (2, 2.0), (3, 4.0)] {
        model.insert(cube(id, 1.0, Vector3::new(x, 0.0, 0.0)));
    }
    model
}

#[test]
fn test_brush_carves_every_overlapping_mesh() {
    let mut model = row_of_cubes();
    let index = MeshIndex::from_model(&model);
    // Spans the gap between cubes 1 and 2
    let brush = cube(10, 2.0, Vector3::new(1.0, 0.0, 0.0));

    assert!(csg_mesh_from_model(&mut model, &index, &brush, CsgOperation::Subtract));
    assert_eq!(model.len(), 3);
    assert_relative_eq!(signed_volume(model.mesh(1).unwrap()), 0.5, epsilon = 1e-6);
    assert_relative_eq!(signed_volume(model.mesh(2).unwrap()), 0.5, epsilon = 1e-6);
    assert_relative_eq!(signed_volume(model.mesh(3).unwrap()), 1.0, epsilon = 1e-12);
}

#[test]
fn test_intersect_brush_removes_untouched_part() {
    let mut model = row_of_cubes();
    let index = MeshIndex::from_model(&model);
    let brush = cube(10, 1.0, Vector3::new(4.5, 0.0, 0.0));

    assert!(csg_mesh_from_model(&mut model, &index, &brush, CsgOperation::Intersect));
    let kept = model.mesh(3).unwrap();
    assert_relative_eq!(signed_volume(kept), 0.5, epsilon = 1e-6);
    assert!(kept.bounds().min.x >= 4.0 - 1e-9);

    // Meshes away from the brush are left alone
    let before = row_of_cubes();
    assert_eq!(model.len(), 3);
    for id in [1, 2] {
        assert_unchanged(model.mesh(id).unwrap(), before.mesh(id).unwrap());
    }
}

#[test]
fn test_union_brush_touches_only_its_neighbor() {
    let mut model = row_of_cubes();
    let index = MeshIndex::from_model(&model);
    let brush = cube(10, 1.0, Vector3::new(4.5, 0.0, 0.0));

    assert!(csg_mesh_from_model(&mut model, &index, &brush, CsgOperation::Union));
    assert_eq!(model.len(), 3);
    assert_relative_eq!(signed_volume(model.mesh(3).unwrap()), 1.5, epsilon = 1e-6);

    let before = row_of_cubes();
    for id in [1, 2] {
        assert_unchanged(model.mesh(id).unwrap(), before.mesh(id).unwrap());
    }
}

fn assert_unchanged(after: &polycsg::Mesh, before: &polycsg::Mesh) {
    assert_eq!(after.id, before.id);
    assert_eq!(after.offset, before.offset);
    assert_eq!(after.vertices, before.vertices);
    assert_eq!(after.faces, before.faces);
}

#[test]
fn test_split_brush_adds_new_meshes() {
    let mut model = row_of_cubes();
    let index = MeshIndex::from_model(&model);
    let brush = cube(10, 2.0, Vector3::new(1.0, 0.0, 0.0));

    assert!(csg_mesh_from_model(&mut model, &index, &brush, CsgOperation::Split));
    // Cubes 1 and 2 each become two meshes
    assert_eq!(model.len(), 5);
    let total: f64 = model.meshes().map(signed_volume).sum();
    assert_relative_eq!(total, 3.0, epsilon = 1e-6);
    assert!(model.meshes().all(|m| m.validate().is_ok()));
}

#[test]
fn test_brush_in_empty_space_changes_nothing() {
    let mut model = row_of_cubes();
    let index = MeshIndex::from_model(&model);
    let brush = cube(10, 1.0, Vector3::new(0.0, 0.0, 8.0));

    assert!(!csg_mesh_from_model(&mut model, &index, &brush, CsgOperation::Union));
    assert_eq!(model.len(), 3);
    assert_eq!(model.generate_mesh_id(), 4);
}
