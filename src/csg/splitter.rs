// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon splitting
//!
//! A polygon of one operand is cut by the plane of a polygon of the other
//! operand only when the two polygons actually cross: each must reach the
//! other's plane, and their intersection segments along the common line must
//! overlap with positive length. The cut runs along the full line and yields
//! two convex pieces lying on the original plane.

use super::context::{CsgContext, VertexId};
use super::object::CsgObject;
use super::polygon::CsgPolygon;
use super::retry::{bounded_retry, RetryOutcome};
use super::validate::polygon_defect;
use crate::config::CsgConfig;
use crate::geometry::{Plane, PlaneSide};
use crate::utils::math::lerp;
use ahash::AHashSet;
use nalgebra::{Point3, Vector3};
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Outcome of cutting one polygon in two
#[derive(Debug, Clone)]
pub struct PolygonCut {
    /// Piece in front of the cutting plane, then the piece behind it
    pub pieces: [CsgPolygon; 2],
    /// Number of original edges that received a new vertex
    pub split_edges: usize,
}

/// Split `to_split` by the planes of `split_by` until a full scan finds
/// nothing left to split or the pass ceiling is reached.
///
/// Each pass performs at most one split and then restarts the scan; polygons
/// already tested are not tested again. The returned value is the number of
/// splits performed.
pub fn split_object(
    ctx: &mut CsgContext,
    to_split: &mut CsgObject,
    split_by: &CsgObject,
    config: &CsgConfig,
) -> RetryOutcome<usize> {
    let index = split_by.polygon_index();
    let mut attempted: AHashSet<u64> = AHashSet::new();
    let mut splits = 0;

    let outcome = bounded_retry(config.max_split_passes, |_| {
        for i in 0..to_split.polygons.len() {
            let poly = &to_split.polygons[i];
            if !attempted.insert(poly.id) {
                continue;
            }
            if !poly.bounds.intersects(&split_by.bounds) {
                continue;
            }

            let bounds = poly.bounds;
            let plane = poly.plane;
            for candidate in index.query(&bounds) {
                let splitter = &split_by.polygons[candidate];
                if plane.is_coplanar_with(&splitter.plane, config.coplanar_plane_eps) {
                    continue;
                }
                if split_polys(ctx, to_split, i, splitter) {
                    splits += 1;
                    return ControlFlow::Continue(splits);
                }
            }
        }
        ControlFlow::Break(splits)
    });

    match &outcome {
        RetryOutcome::Converged { value, attempts } => {
            debug!(splits = value, passes = attempts, "split converged");
        }
        RetryOutcome::GaveUpAfter { value, attempts } => {
            warn!(
                splits = value,
                passes = attempts,
                "split pass ceiling reached, continuing with partial split"
            );
        }
    }

    outcome
}

/// Split the polygon at `index` of `object` by `splitter`'s plane, replacing
/// it with its two pieces. Returns whether a split happened.
pub fn split_polys(ctx: &mut CsgContext, object: &mut CsgObject, index: usize, splitter: &CsgPolygon) -> bool {
    match split_polygon(ctx, &object.polygons[index], splitter) {
        Some(cut) => {
            object.replace_polygon(index, cut.pieces.into());
            true
        }
        None => false,
    }
}

/// Cut `poly` along `splitter`'s plane if the two polygons cross.
pub fn split_polygon(ctx: &mut CsgContext, poly: &CsgPolygon, splitter: &CsgPolygon) -> Option<PolygonCut> {
    let epsilon = ctx.epsilon();
    let points = poly.positions(ctx);
    let distances: Vec<f64> = points.iter().map(|p| splitter.plane.signed_distance(p)).collect();
    let sides: Vec<PlaneSide> = distances.iter().map(|&d| side_of(d, epsilon)).collect();

    let straddles = sides.contains(&PlaneSide::Front) && sides.contains(&PlaneSide::Back);
    if !straddles {
        return None;
    }

    let direction = poly.plane.normal.cross(&splitter.plane.normal);
    if direction.norm() < epsilon {
        return None;
    }

    let own = crossing_interval(&points, &splitter.plane, &direction, epsilon)?;
    let other = crossing_interval(&splitter.positions(ctx), &poly.plane, &direction, epsilon)?;
    let overlap = own.1.min(other.1) - own.0.max(other.0);
    if overlap <= epsilon {
        return None;
    }

    cut_polygon(ctx, poly, &points, &distances, &sides)
}

fn side_of(distance: f64, epsilon: f64) -> PlaneSide {
    if distance > epsilon {
        PlaneSide::Front
    } else if distance < -epsilon {
        PlaneSide::Back
    } else {
        PlaneSide::On
    }
}

/// Extent, measured along `direction`, of where a polygon loop meets `plane`.
/// `None` when the loop does not reach the plane.
fn crossing_interval(
    points: &[Point3<f64>],
    plane: &Plane,
    direction: &Vector3<f64>,
    epsilon: f64,
) -> Option<(f64, f64)> {
    let n = points.len();
    let distances: Vec<f64> = points.iter().map(|p| plane.signed_distance(p)).collect();
    let mut interval: Option<(f64, f64)> = None;
    let mut include = |p: Point3<f64>| {
        let t = direction.dot(&p.coords);
        interval = Some(match interval {
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
            None => (t, t),
        });
    };

    for i in 0..n {
        let j = (i + 1) % n;
        let (si, sj) = (side_of(distances[i], epsilon), side_of(distances[j], epsilon));
        if si == PlaneSide::On {
            include(points[i]);
        }
        if is_crossing(si, sj) {
            let t = distances[i] / (distances[i] - distances[j]);
            include(lerp(&points[i], &points[j], t));
        }
    }

    interval
}

fn is_crossing(a: PlaneSide, b: PlaneSide) -> bool {
    matches!(
        (a, b),
        (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
    )
}

fn cut_polygon(
    ctx: &mut CsgContext,
    poly: &CsgPolygon,
    points: &[Point3<f64>],
    distances: &[f64],
    sides: &[PlaneSide],
) -> Option<PolygonCut> {
    let n = poly.vertices.len();
    let mut front: Vec<VertexId> = Vec::with_capacity(n + 2);
    let mut back: Vec<VertexId> = Vec::with_capacity(n + 2);
    let mut cut_points = 0;
    let mut split_edges = 0;

    for i in 0..n {
        let j = (i + 1) % n;
        let vertex = poly.vertices[i];
        match sides[i] {
            PlaneSide::Front => front.push(vertex),
            PlaneSide::Back => back.push(vertex),
            PlaneSide::On => {
                front.push(vertex);
                back.push(vertex);
                cut_points += 1;
            }
        }

        if is_crossing(sides[i], sides[j]) {
            let t = distances[i] / (distances[i] - distances[j]);
            let crossing = ctx.create_or_get_vertex_at(lerp(&points[i], &points[j], t));
            push_distinct(&mut front, crossing);
            push_distinct(&mut back, crossing);
            cut_points += 1;
            split_edges += 1;
        }
    }

    // A convex polygon meets a crossing plane in exactly two points
    if cut_points != 2 {
        debug!(polygon = poly.id, cut_points, "rejected non-convex split");
        return None;
    }

    dedup_loop(&mut front);
    dedup_loop(&mut back);

    let epsilon = ctx.epsilon();
    for piece in [&front, &back] {
        let piece_points: Vec<Point3<f64>> = piece.iter().map(|&v| ctx.position(v)).collect();
        if let Some(defect) = polygon_defect(&piece_points, epsilon) {
            debug!(polygon = poly.id, %defect, "rejected degenerate split");
            return None;
        }
    }

    let front = CsgPolygon::with_plane(ctx, front, poly.plane, poly.face_properties);
    let back = CsgPolygon::with_plane(ctx, back, poly.plane, poly.face_properties);

    Some(PolygonCut {
        pieces: [front, back],
        split_edges,
    })
}

fn push_distinct(loop_: &mut Vec<VertexId>, vertex: VertexId) {
    if loop_.last() != Some(&vertex) {
        loop_.push(vertex);
    }
}

/// Drop consecutive repeats, including across the wrap-around
fn dedup_loop(loop_: &mut Vec<VertexId>) {
    loop_.dedup();
    while loop_.len() > 1 && loop_.first() == loop_.last() {
        loop_.pop();
    }
}
