// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-operation vertex unification and adaptive tolerances
//!
//! A [`CsgContext`] owns every vertex created during one boolean operation.
//! Positions that land within `epsilon` of an existing vertex resolve to that
//! vertex, so both operands share vertex identity wherever they touch.

use crate::config::CsgConfig;
use crate::geometry::BoundingBox;
use ahash::{AHashMap, AHashSet};
use nalgebra::Point3;
use tracing::info;

/// Index of a vertex owned by a [`CsgContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Classification state of a vertex with respect to the other operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexStatus {
    Unknown,
    Inside,
    Outside,
    /// Lies on the other operand's surface
    Boundary,
}

/// A unified vertex
#[derive(Debug, Clone)]
pub struct CsgVertex {
    pub position: Point3<f64>,
    /// Undirected edge neighbors, filled in during classification
    pub neighbors: AHashSet<VertexId>,
    pub status: VertexStatus,
}

impl CsgVertex {
    fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            neighbors: AHashSet::new(),
            status: VertexStatus::Unknown,
        }
    }
}

/// Integer cell of the lookup grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GridKey {
    x: i64,
    y: i64,
    z: i64,
}

impl GridKey {
    fn from_point(p: &Point3<f64>, cell_size: f64) -> Self {
        Self {
            x: (p.x / cell_size).floor() as i64,
            y: (p.y / cell_size).floor() as i64,
            z: (p.z / cell_size).floor() as i64,
        }
    }

    fn offset(&self, dx: i64, dy: i64, dz: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

/// Vertex store and tolerances for one boolean operation
#[derive(Debug)]
pub struct CsgContext {
    epsilon: f64,
    geometry_scale: f64,
    vertex_merge_factor: f64,
    coplanar_factor: f64,
    vertices: Vec<CsgVertex>,
    grid: AHashMap<GridKey, Vec<VertexId>>,
    next_polygon_id: u64,
}

impl CsgContext {
    /// Build a context whose epsilons are sized to `bounds`
    pub fn new(bounds: &BoundingBox, config: &CsgConfig) -> Self {
        let geometry_scale = if bounds.is_empty() { 0.0 } else { bounds.extents().norm() };
        let epsilon = config.epsilon_for_scale(geometry_scale);

        info!(geometry_scale, epsilon, "CSG context created");

        Self {
            epsilon,
            geometry_scale,
            vertex_merge_factor: config.vertex_merge_factor,
            coplanar_factor: config.coplanar_factor,
            vertices: Vec::new(),
            grid: AHashMap::new(),
            next_polygon_id: 0,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn coplanar_epsilon(&self) -> f64 {
        self.epsilon * self.coplanar_factor
    }

    pub fn vertex_merge_epsilon(&self) -> f64 {
        self.epsilon * self.vertex_merge_factor
    }

    pub fn geometry_scale(&self) -> f64 {
        self.geometry_scale
    }

    pub fn vertex(&self, id: VertexId) -> &CsgVertex {
        &self.vertices[id.0]
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> &mut CsgVertex {
        &mut self.vertices[id.0]
    }

    pub fn position(&self, id: VertexId) -> Point3<f64> {
        self.vertices[id.0].position
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Fresh identity for a polygon created in this context
    pub fn next_polygon_id(&mut self) -> u64 {
        let id = self.next_polygon_id;
        self.next_polygon_id += 1;
        id
    }

    /// Return the closest existing vertex within `epsilon` of `position`,
    /// or register a new one there.
    pub fn create_or_get_vertex_at(&mut self, position: Point3<f64>) -> VertexId {
        if let Some(existing) = self.find_vertex_near(&position) {
            return existing;
        }

        let id = VertexId(self.vertices.len());
        self.vertices.push(CsgVertex::new(position));
        let key = GridKey::from_point(&position, self.vertex_merge_epsilon());
        self.grid.entry(key).or_default().push(id);
        id
    }

    fn find_vertex_near(&self, position: &Point3<f64>) -> Option<VertexId> {
        let cell = GridKey::from_point(position, self.vertex_merge_epsilon());
        let mut closest: Option<(VertexId, f64)> = None;

        // Cells are one lookup radius wide, so the 3x3x3 block covers it
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = self.grid.get(&cell.offset(dx, dy, dz)) else {
                        continue;
                    };
                    for &candidate in candidates {
                        let d = (self.vertices[candidate.0].position - position).norm();
                        let closer = closest.map_or(true, |(_, best)| d < best);
                        if d < self.epsilon && closer {
                            closest = Some((candidate, d));
                        }
                    }
                }
            }
        }

        closest.map(|(id, _)| id)
    }
}
