// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! One operand of a boolean operation

use super::context::VertexId;
use super::polygon::{CsgPolygon, PolygonStatus};
use crate::geometry::{BoundingBox, BVH};
use std::collections::BTreeSet;

/// Polygons of one operand plus every vertex they reference
#[derive(Debug, Clone)]
pub struct CsgObject {
    pub polygons: Vec<CsgPolygon>,
    pub vertices: BTreeSet<VertexId>,
    pub bounds: BoundingBox,
}

impl CsgObject {
    pub fn new(polygons: Vec<CsgPolygon>, vertices: impl IntoIterator<Item = VertexId>) -> Self {
        let bounds = polygons
            .iter()
            .fold(BoundingBox::empty(), |acc, poly| acc.union(&poly.bounds));
        Self {
            polygons,
            vertices: vertices.into_iter().collect(),
            bounds,
        }
    }

    /// Replace the polygon at `index` with `pieces`, keeping them in its slot
    pub fn replace_polygon(&mut self, index: usize, pieces: Vec<CsgPolygon>) {
        for piece in &pieces {
            self.vertices.extend(piece.vertices.iter().copied());
        }
        self.polygons.splice(index..=index, pieces);
    }

    /// Broad-phase index over polygon bounds
    pub fn polygon_index(&self) -> BVH {
        BVH::build(
            self.polygons
                .iter()
                .enumerate()
                .map(|(i, poly)| (i, poly.bounds))
                .collect(),
        )
    }

    pub fn count_with_status(&self, status: PolygonStatus) -> usize {
        self.polygons.iter().filter(|p| p.status == status).count()
    }
}
