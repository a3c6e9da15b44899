// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::{FaceProperties, Mesh, MeshId};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Prism { h: f64, r: f64, sides: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    /// Regular n-sided prism along +Y, base centered on the origin
    pub fn prism(h: f64, r: f64, sides: u32) -> Self {
        Self::Prism {
            h,
            r,
            sides: sides.max(3),
        }
    }

    pub fn to_mesh(&self, id: MeshId, properties: FaceProperties) -> Mesh {
        match self {
            Self::Cube { size, center } => generate_cube_mesh(id, *size, *center, properties),
            Self::Prism { h, r, sides } => generate_prism_mesh(id, *h, *r, *sides, properties),
        }
    }
}

fn generate_cube_mesh(id: MeshId, size: Vector3<f64>, center: bool, properties: FaceProperties) -> Mesh {
    let mut mesh = Mesh::new(id);

    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    // 8 corners, bottom ring then top ring (z)
    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    for position in positions {
        mesh.add_vertex(position);
    }

    // Counter-clockwise seen from outside
    let faces = [
        [4, 5, 6, 7], // z+
        [1, 0, 3, 2], // z-
        [5, 1, 2, 6], // x+
        [0, 4, 7, 3], // x-
        [7, 6, 2, 3], // y+
        [0, 1, 5, 4], // y-
    ];
    for face in faces {
        mesh.add_face(face.to_vec(), properties);
    }

    mesh
}

fn generate_prism_mesh(id: MeshId, height: f64, radius: f64, sides: u32, properties: FaceProperties) -> Mesh {
    let mut mesh = Mesh::new(id);
    let n = sides as usize;

    for ring in [0.0, height] {
        for i in 0..n {
            let theta = 2.0 * PI * i as f64 / n as f64;
            mesh.add_vertex(Point3::new(radius * theta.cos(), ring, radius * theta.sin()));
        }
    }

    // Bottom cap faces -Y, top cap faces +Y
    mesh.add_face((0..n).collect(), properties);
    mesh.add_face((n..2 * n).rev().collect(), properties);

    for i in 0..n {
        let j = (i + 1) % n;
        mesh.add_face(vec![i, i + n, j + n, j], properties);
    }

    mesh
}
