// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Conversion between meshes and CSG objects

use super::context::{CsgContext, VertexId};
use super::object::CsgObject;
use super::polygon::CsgPolygon;
use crate::geometry::{Mesh, MeshId};
use crate::utils::math::newell_normal;
use ahash::AHashMap;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::collections::BTreeSet;
use tracing::warn;

/// Import a mesh, mapping model-space positions through
/// `(position + offset) * scale` and the context's vertex unification.
///
/// Faces with fewer than three distinct vertices, dangling indices or no
/// area are dropped with a warning.
pub fn to_csg(ctx: &mut CsgContext, mesh: &Mesh, offset: Vector3<f64>, scale: f64) -> CsgObject {
    let id_to_vertex: Vec<VertexId> = mesh
        .model_positions()
        .map(|p| ctx.create_or_get_vertex_at(Point3::from((p.coords + offset) * scale)))
        .collect();

    let mut polygons = Vec::with_capacity(mesh.faces.len());
    for (face_id, face) in mesh.faces.iter().enumerate() {
        if face.vertex_ids.len() < 3 {
            warn!(
                mesh = mesh.id,
                face = face_id,
                vertices = face.vertex_ids.len(),
                "dropping face with fewer than 3 vertices"
            );
            continue;
        }

        let Some(mut vertices) = face
            .vertex_ids
            .iter()
            .map(|&id| id_to_vertex.get(id).copied())
            .collect::<Option<Vec<VertexId>>>()
        else {
            warn!(mesh = mesh.id, face = face_id, "dropping face with dangling vertex index");
            continue;
        };

        // Input vertices closer than epsilon collapse onto one context vertex
        vertices.dedup();
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let points: Vec<Point3<f64>> = vertices.iter().map(|&v| ctx.position(v)).collect();
        let epsilon = ctx.epsilon();
        if vertices.len() < 3 || newell_normal(&points).norm() * 0.5 < epsilon * epsilon {
            warn!(mesh = mesh.id, face = face_id, "dropping degenerate face");
            continue;
        }

        polygons.push(CsgPolygon::new(ctx, vertices, face.properties));
    }

    CsgObject::new(polygons, id_to_vertex)
}

/// Export polygons as a mesh.
///
/// Context positions map back through
/// `rotation⁻¹ * ((position / scale - csg_offset) - offset)`; each context
/// vertex becomes exactly one mesh vertex. The mesh carries `id`, `offset`
/// and `rotation`.
#[allow(clippy::too_many_arguments)]
pub fn from_polys(
    ctx: &CsgContext,
    id: MeshId,
    offset: Vector3<f64>,
    rotation: UnitQuaternion<f64>,
    polygons: &[CsgPolygon],
    csg_offset: Vector3<f64>,
    scale: f64,
    remix_ids: Option<BTreeSet<String>>,
) -> Mesh {
    let mut mesh = Mesh::with_transform(id, offset, rotation);
    mesh.remix_ids = remix_ids;

    let inverse = rotation.inverse();
    let mut vertex_to_id: AHashMap<VertexId, usize> = AHashMap::new();
    for poly in polygons {
        let vertex_ids = poly
            .vertices
            .iter()
            .map(|&vertex| {
                *vertex_to_id.entry(vertex).or_insert_with(|| {
                    let p = ctx.position(vertex);
                    let model = p.coords / scale - csg_offset;
                    mesh.add_vertex(Point3::from(inverse * (model - offset)))
                })
            })
            .collect();
        mesh.add_face(vertex_ids, poly.face_properties);
    }

    mesh
}
