// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon sanity checks
//!
//! None of these run unconditionally on the hot path. The splitter uses
//! [`polygon_defect`] to reject degenerate pieces; the rest exist for tests
//! and debugging.

use super::context::{CsgContext, VertexId};
use super::polygon::CsgPolygon;
use crate::utils::math::newell_normal;
use ahash::AHashSet;
use nalgebra::Point3;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a polygon loop is unusable
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PolygonDefect {
    #[error("polygon has {0} vertices")]
    TooFewVertices(usize),

    #[error("polygon area {area:e} is below {minimum:e}")]
    ZeroArea { area: f64, minimum: f64 },

    #[error("edge starting at vertex {index} has length {length:e}")]
    ShortEdge { index: usize, length: f64 },

    #[error("vertices starting at {index} are colinear")]
    Colinear { index: usize },

    #[error("vertices {first} and {second} coincide")]
    DuplicateVertex { first: usize, second: usize },
}

/// First defect of a polygon loop under `epsilon`, if any
pub fn polygon_defect(points: &[Point3<f64>], epsilon: f64) -> Option<PolygonDefect> {
    let n = points.len();
    if n < 3 {
        return Some(PolygonDefect::TooFewVertices(n));
    }

    let area = newell_normal(points).norm() * 0.5;
    let minimum = epsilon * epsilon;
    if area < minimum {
        return Some(PolygonDefect::ZeroArea { area, minimum });
    }

    for i in 0..n {
        let v0 = points[i];
        let v1 = points[(i + 1) % n];
        let v2 = points[(i + 2) % n];
        let edge1 = v1 - v0;
        let edge2 = v2 - v1;
        let (len1, len2) = (edge1.norm(), edge2.norm());

        if len1 < epsilon {
            return Some(PolygonDefect::ShortEdge { index: i, length: len1 });
        }
        if len2 < epsilon {
            return Some(PolygonDefect::ShortEdge {
                index: (i + 1) % n,
                length: len2,
            });
        }
        if edge1.cross(&edge2).norm() < epsilon * len1 * len2 {
            return Some(PolygonDefect::Colinear { index: i });
        }
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if (points[i] - points[j]).norm() < epsilon {
                return Some(PolygonDefect::DuplicateVertex { first: i, second: j });
            }
        }
    }

    None
}

/// Area, edge length, colinearity and duplicate-vertex checks
pub fn is_valid_polygon(ctx: &CsgContext, polygon: &CsgPolygon, epsilon: f64) -> bool {
    polygon_defect(&polygon.positions(ctx), epsilon).is_none()
}

/// Same checks as [`is_valid_polygon`], logging the defect found
pub fn validate_polygon_with_diagnostics(
    ctx: &CsgContext,
    polygon: &CsgPolygon,
    epsilon: f64,
    label: &str,
) -> bool {
    match polygon_defect(&polygon.positions(ctx), epsilon) {
        None => true,
        Some(defect) => {
            warn!(
                polygon = polygon.id,
                vertices = polygon.vertices.len(),
                epsilon,
                label,
                %defect,
                "invalid polygon"
            );
            false
        }
    }
}

fn directed_edges(polygon: &CsgPolygon) -> AHashSet<(VertexId, VertexId)> {
    let n = polygon.vertices.len();
    (0..n)
        .map(|i| (polygon.vertices[i], polygon.vertices[(i + 1) % n]))
        .collect()
}

/// Consistency of a polygon split:
/// all pieces keep the original normal, every original vertex survives,
/// every piece shares a reversed edge with another piece, no directed edge
/// or per-piece vertex repeats, and every original edge survives except the
/// `split_edges` that were cut.
pub fn is_valid_polygon_split(initial: &CsgPolygon, pieces: &[CsgPolygon], split_edges: usize) -> bool {
    let mut piece_vertices = Vec::with_capacity(pieces.len());
    let mut piece_edges = Vec::with_capacity(pieces.len());

    for piece in pieces {
        if (initial.plane.normal - piece.plane.normal).norm() > 1e-3 {
            debug!(initial = ?initial.plane.normal, piece = ?piece.plane.normal, "normals do not match");
            return false;
        }
        piece_vertices.push(piece.vertices.iter().copied().collect::<AHashSet<_>>());
        piece_edges.push(directed_edges(piece));
    }

    if !initial
        .vertices
        .iter()
        .all(|v| piece_vertices.iter().any(|set| set.contains(v)))
    {
        debug!("vertex from original polygon is missing from split polygons");
        return false;
    }

    for (i, edges) in piece_edges.iter().enumerate() {
        let shares_edge = piece_edges
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .any(|(_, other)| edges.iter().any(|&(a, b)| other.contains(&(b, a))));
        if !shares_edge {
            debug!(piece = i, "split polygon shares no edge with the others");
            return false;
        }
    }

    let mut all_edges = AHashSet::new();
    let mut edge_total = 0;
    for edges in &piece_edges {
        edge_total += edges.len();
        all_edges.extend(edges.iter().copied());
    }
    if edge_total != all_edges.len() {
        debug!("found duplicate edges");
        return false;
    }

    for (set, piece) in piece_vertices.iter().zip(pieces) {
        if set.len() != piece.vertices.len() {
            debug!(polygon = piece.id, "found duplicate vertex");
            return false;
        }
    }

    let initial_edges = directed_edges(initial);
    let surviving = initial_edges.iter().filter(|e| all_edges.contains(e)).count();
    if initial_edges.len() != surviving + split_edges {
        debug!(surviving, split_edges, "edges from initial polygon are missing");
        return false;
    }

    true
}
