// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types

use crate::geometry::MeshId;
use thiserror::Error;

/// Structural problems found by [`Mesh::validate`](crate::geometry::Mesh::validate)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("vertex {vertex_id} has a non-finite coordinate")]
    NonFiniteVertex { vertex_id: usize },

    #[error("face {face_id} has {count} vertices (need at least 3)")]
    TooFewVertices { face_id: usize, count: usize },

    #[error("face {face_id} references missing vertex {vertex_id}")]
    DanglingVertex { face_id: usize, vertex_id: usize },

    #[error("face {face_id} uses the same vertex more than once")]
    RepeatedVertex { face_id: usize },

    #[error("face {face_id} has zero area")]
    DegenerateFace { face_id: usize },
}

/// Failures reported by the scene-level CSG driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsgError {
    #[error("mesh {0} is not present in the model")]
    MissingMesh(MeshId),

    #[error("result mesh {mesh_id} was rejected by the model")]
    RejectedResult { mesh_id: MeshId },

    #[error("brush does not intersect any mesh")]
    NoIntersection,
}
