// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared fixtures for integration tests

#![allow(dead_code)]

use nalgebra::{Point3, UnitQuaternion, Vector3};
use polycsg::csg::validate::polygon_defect;
use polycsg::{FaceProperties, Mesh, MeshId, Primitive};

/// Centered cube of edge `size`, translated by `offset`
pub fn cube(id: MeshId, size: f64, offset: Vector3<f64>) -> Mesh {
    cube_with_material(id, id, size, offset)
}

pub fn cube_with_material(id: MeshId, material: u32, size: f64, offset: Vector3<f64>) -> Mesh {
    let mut mesh = Primitive::cube(Vector3::repeat(size), true).to_mesh(id, FaceProperties::new(material));
    mesh.translate(offset);
    mesh
}

/// Prism standing on the XZ plane, rotated about Y by `angle` radians
pub fn prism(id: MeshId, h: f64, r: f64, sides: u32, angle: f64) -> Mesh {
    let mut mesh = Primitive::prism(h, r, sides).to_mesh(id, FaceProperties::new(id));
    mesh.rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle);
    mesh
}

/// Enclosed volume in model space; positive for outward-facing windings
pub fn signed_volume(mesh: &Mesh) -> f64 {
    let mut volume = 0.0;
    for face in &mesh.faces {
        let p0 = mesh.vertex_position_in_model_coords(face.vertex_ids[0]).coords;
        for pair in face.vertex_ids[1..].windows(2) {
            let p1 = mesh.vertex_position_in_model_coords(pair[0]).coords;
            let p2 = mesh.vertex_position_in_model_coords(pair[1]).coords;
            volume += p0.dot(&p1.cross(&p2));
        }
    }
    volume / 6.0
}

pub fn total_volume(meshes: &[Mesh]) -> f64 {
    meshes.iter().map(signed_volume).sum()
}

/// Tolerance the kernel uses for roughly unit-sized operands
pub const OPERATION_EPSILON: f64 = 1e-4;

/// Every result mesh is non-empty, structurally valid, and has no face with
/// a colinear triple, short edge or near-duplicate vertex at the operation
/// tolerance
pub fn assert_valid(meshes: &[Mesh]) {
    for mesh in meshes {
        assert!(!mesh.is_empty(), "mesh {} is empty", mesh.id);
        if let Err(err) = mesh.validate() {
            panic!("mesh {} is invalid: {err}", mesh.id);
        }
        for (face_id, face) in mesh.faces.iter().enumerate() {
            let points: Vec<Point3<f64>> = face
                .vertex_ids
                .iter()
                .map(|&v| mesh.vertex_position_in_model_coords(v))
                .collect();
            if let Some(defect) = polygon_defect(&points, OPERATION_EPSILON) {
                panic!("mesh {} face {face_id}: {defect}", mesh.id);
            }
        }
    }
}
