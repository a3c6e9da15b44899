// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygonal mesh representation
//!
//! A [`Mesh`] stores vertex positions in mesh space together with a
//! per-mesh offset and rotation that place it in model space. Faces are
//! ordered vertex-index loops wound counter-clockwise when seen from
//! outside the solid.

use super::BoundingBox;
use crate::error::MeshError;
use crate::utils::math::newell_normal;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a mesh within a model
pub type MeshId = u32;

/// Opaque per-face properties carried through boolean operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FaceProperties {
    pub material_id: u32,
}

impl FaceProperties {
    pub fn new(material_id: u32) -> Self {
        Self { material_id }
    }
}

/// A planar polygonal face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Indices into the owning mesh's vertex list, counter-clockwise from outside
    pub vertex_ids: Vec<usize>,
    pub properties: FaceProperties,
}

impl Face {
    pub fn new(vertex_ids: Vec<usize>, properties: FaceProperties) -> Self {
        Self {
            vertex_ids,
            properties,
        }
    }
}

/// Polygonal mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub id: MeshId,
    /// Position of the mesh in model space
    pub offset: Vector3<f64>,
    /// Rotation of the mesh in model space
    pub rotation: UnitQuaternion<f64>,
    /// Mesh-space vertex positions
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<Face>,
    /// Provenance tags, merged by boolean operations
    pub remix_ids: Option<BTreeSet<String>>,
}

impl Mesh {
    pub fn new(id: MeshId) -> Self {
        Self {
            id,
            offset: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            vertices: Vec::new(),
            faces: Vec::new(),
            remix_ids: None,
        }
    }

    pub fn with_transform(id: MeshId, offset: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            offset,
            rotation,
            ..Self::new(id)
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    /// Add a face and return its index
    pub fn add_face(&mut self, vertex_ids: Vec<usize>, properties: FaceProperties) -> usize {
        let index = self.faces.len();
        self.faces.push(Face::new(vertex_ids, properties));
        index
    }

    /// Position of a vertex after applying the mesh's rotation and offset
    pub fn vertex_position_in_model_coords(&self, vertex_id: usize) -> Point3<f64> {
        self.model_position(&self.vertices[vertex_id])
    }

    fn model_position(&self, position: &Point3<f64>) -> Point3<f64> {
        self.rotation * position + self.offset
    }

    /// All vertex positions in model space
    pub fn model_positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices.iter().map(|p| self.model_position(p))
    }

    /// Model-space bounding box
    pub fn bounds(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for position in self.model_positions() {
            bbox.expand_to_include(&position);
        }
        bbox
    }

    /// Model-space unit normal of a face (Newell's method)
    pub fn face_normal(&self, face: &Face) -> Vector3<f64> {
        let points: Vec<Point3<f64>> = face
            .vertex_ids
            .iter()
            .map(|&id| self.vertex_position_in_model_coords(id))
            .collect();
        let normal = newell_normal(&points);
        normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Translate the mesh in model space
    pub fn translate(&mut self, delta: Vector3<f64>) {
        self.offset += delta;
    }

    /// Copy of this mesh under a different id
    pub fn clone_with_new_id(&self, id: MeshId) -> Mesh {
        Mesh { id, ..self.clone() }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Structural validity: every face has at least three in-range, distinct
    /// vertex indices, every coordinate is finite and no face has zero area.
    pub fn validate(&self) -> Result<(), MeshError> {
        if let Some(vertex_id) = self
            .vertices
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex { vertex_id });
        }

        for (face_id, face) in self.faces.iter().enumerate() {
            if face.vertex_ids.len() < 3 {
                return Err(MeshError::TooFewVertices {
                    face_id,
                    count: face.vertex_ids.len(),
                });
            }
            if let Some(&vertex_id) = face.vertex_ids.iter().find(|&&id| id >= self.vertices.len()) {
                return Err(MeshError::DanglingVertex { face_id, vertex_id });
            }
            let distinct: BTreeSet<usize> = face.vertex_ids.iter().copied().collect();
            if distinct.len() != face.vertex_ids.len() {
                return Err(MeshError::RepeatedVertex { face_id });
            }
            let points: Vec<Point3<f64>> = face.vertex_ids.iter().map(|&id| self.vertices[id]).collect();
            if newell_normal(&points).norm() <= f64::EPSILON {
                return Err(MeshError::DegenerateFace { face_id });
            }
        }

        Ok(())
    }
}
