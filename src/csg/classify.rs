// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Inside/outside classification of polygons against the other operand
//!
//! Polygons that cannot inherit a status from an already classified vertex
//! are classified by casting a ray from their barycenter along their normal.
//! Inside and outside results are then flooded across the vertex adjacency
//! graph, stopping at vertices that lie on the other operand's surface.

use super::context::{CsgContext, VertexId, VertexStatus};
use super::object::CsgObject;
use super::polygon::{CsgPolygon, PointContainment, PolygonStatus};
use super::retry::{bounded_retry, RetryOutcome};
use crate::config::CsgConfig;
use crate::geometry::BoundingBox;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Nearest polygon hit by a classification ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index into the other object's polygons
    pub polygon: usize,
    /// Distance along the ray; zero for a coplanar hit
    pub distance: f64,
}

/// Classify every polygon of `object` with respect to `other`.
///
/// # Panics
///
/// Panics if a polygon is left with [`PolygonStatus::Unknown`]; that is a bug
/// in the status bookkeeping and is never patched over.
pub fn classify_polygons(ctx: &mut CsgContext, object: &mut CsgObject, other: &CsgObject, config: &CsgConfig) {
    for &vertex in &object.vertices {
        let v = ctx.vertex_mut(vertex);
        v.status = VertexStatus::Unknown;
        v.neighbors.clear();
    }
    mark_boundary_vertices(ctx, object, other);

    for poly in &object.polygons {
        let n = poly.vertices.len();
        for i in 0..n {
            let (a, b) = (poly.vertices[i], poly.vertices[(i + 1) % n]);
            ctx.vertex_mut(a).neighbors.insert(b);
            ctx.vertex_mut(b).neighbors.insert(a);
        }
    }

    let mut raycasts = 0;
    for poly in &mut object.polygons {
        if has_unknown(ctx, poly) || all_boundary(ctx, poly) {
            poly.status = classify_polygon_using_raycast(ctx, poly, other, config);
            raycasts += 1;

            let flood = match poly.status {
                PolygonStatus::Inside => Some(VertexStatus::Inside),
                PolygonStatus::Outside => Some(VertexStatus::Outside),
                _ => None,
            };
            if let Some(status) = flood {
                for &vertex in &poly.vertices {
                    propagate_vertex_status(ctx, vertex, status);
                }
            }
        } else {
            poly.status = poly
                .vertices
                .iter()
                .find_map(|&v| match ctx.vertex(v).status {
                    VertexStatus::Inside => Some(PolygonStatus::Inside),
                    VertexStatus::Outside => Some(PolygonStatus::Outside),
                    _ => None,
                })
                .unwrap_or(PolygonStatus::Unknown);
            assert!(
                poly.status != PolygonStatus::Unknown,
                "polygon {} left unclassified",
                poly.id
            );
        }
    }

    debug!(
        polygons = object.polygons.len(),
        raycasts,
        inside = object.count_with_status(PolygonStatus::Inside),
        outside = object.count_with_status(PolygonStatus::Outside),
        "classified polygons"
    );
}

/// Mark vertices of `object` lying on a polygon of `other` as boundary
fn mark_boundary_vertices(ctx: &mut CsgContext, object: &CsgObject, other: &CsgObject) {
    let index = other.polygon_index();
    let epsilon = ctx.epsilon();

    for &vertex in &object.vertices {
        let position = ctx.position(vertex);
        let probe = BoundingBox::from_center_size(position, Vector3::repeat(2.0 * epsilon));
        let on_surface = index.query(&probe).into_iter().any(|i| {
            let poly = &other.polygons[i];
            poly.plane.signed_distance(&position).abs() < epsilon
                && poly.contains_point(ctx, &position) != PointContainment::Outside
        });
        if on_surface {
            ctx.vertex_mut(vertex).status = VertexStatus::Boundary;
        }
    }
}

/// Flood `status` from `start` over still-unknown vertices
fn propagate_vertex_status(ctx: &mut CsgContext, start: VertexId, status: VertexStatus) {
    let mut queue = VecDeque::from([start]);
    while let Some(vertex) = queue.pop_front() {
        let v = ctx.vertex_mut(vertex);
        if v.status != VertexStatus::Unknown {
            continue;
        }
        v.status = status;
        queue.extend(v.neighbors.iter().copied());
    }
}

fn has_unknown(ctx: &CsgContext, poly: &CsgPolygon) -> bool {
    poly.vertices
        .iter()
        .any(|&v| ctx.vertex(v).status == VertexStatus::Unknown)
}

fn all_boundary(ctx: &CsgContext, poly: &CsgPolygon) -> bool {
    poly.vertices
        .iter()
        .all(|&v| ctx.vertex(v).status == VertexStatus::Boundary)
}

/// Classify one polygon by raycasting from its barycenter into `other`
pub fn classify_polygon_using_raycast(
    ctx: &CsgContext,
    poly: &CsgPolygon,
    other: &CsgObject,
    config: &CsgConfig,
) -> PolygonStatus {
    let outcome = find_closest_polygon_using_raycast(ctx, poly, other, config);
    if !outcome.is_converged() {
        warn!(
            polygon = poly.id,
            attempts = outcome.attempts(),
            "raycast perturbation ceiling reached, using best hit"
        );
    }

    let Some(hit) = outcome.into_value() else {
        return PolygonStatus::Outside;
    };

    let dot = poly.plane.normal.dot(&other.polygons[hit.polygon].plane.normal);
    if hit.distance.abs() < ctx.epsilon() {
        if dot < 0.0 {
            PolygonStatus::Opposite
        } else {
            PolygonStatus::Same
        }
    } else if dot < 0.0 {
        PolygonStatus::Outside
    } else {
        PolygonStatus::Inside
    }
}

/// Nearest polygon of `other` hit by a ray from `poly`'s barycenter along its
/// normal.
///
/// A ray lying in a candidate's plane, or hitting a candidate exactly on its
/// boundary, is ambiguous: the direction is perturbed and the search starts
/// over. Perturbations come from a generator seeded by the configuration and
/// the polygon id, so results are reproducible.
pub fn find_closest_polygon_using_raycast(
    ctx: &CsgContext,
    poly: &CsgPolygon,
    other: &CsgObject,
    config: &CsgConfig,
) -> RetryOutcome<Option<RayHit>> {
    let epsilon = ctx.epsilon();
    let origin = poly.barycenter;
    let mut direction = poly.plane.normal;
    let mut rng = StdRng::seed_from_u64(config.perturbation_seed ^ poly.id);
    let magnitude = config.perturbation_magnitude;

    let mut perturb = |direction: &mut Vector3<f64>| {
        let nudged = *direction
            + Vector3::new(
                rng.gen_range(-magnitude..=magnitude),
                rng.gen_range(-magnitude..=magnitude),
                rng.gen_range(-magnitude..=magnitude),
            );
        if let Some(unit) = nudged.try_normalize(f64::EPSILON) {
            *direction = unit;
        }
    };

    bounded_retry(config.max_raycast_attempts, |_| {
        let mut best: Option<RayHit> = None;

        for (i, candidate) in other.polygons.iter().enumerate() {
            let perpendicular = direction.dot(&candidate.plane.normal).abs() < epsilon;
            let on_plane = candidate.plane.signed_distance(&origin).abs() < epsilon;

            if perpendicular {
                if on_plane {
                    perturb(&mut direction);
                    return ControlFlow::Continue(best);
                }
                continue;
            }

            let Some((distance, hit)) = candidate.plane.intersect_line(&origin, &direction) else {
                continue;
            };

            if on_plane {
                if candidate.contains_point(ctx, &hit) != PointContainment::Outside {
                    return ControlFlow::Break(Some(RayHit {
                        polygon: i,
                        distance: 0.0,
                    }));
                }
            } else if distance > 0.0 && best.map_or(true, |b| distance < b.distance) {
                match candidate.contains_point(ctx, &hit) {
                    PointContainment::Inside => {
                        best = Some(RayHit {
                            polygon: i,
                            distance,
                        })
                    }
                    PointContainment::OnBoundary => {
                        perturb(&mut direction);
                        return ControlFlow::Continue(best);
                    }
                    PointContainment::Outside => {}
                }
            }
        }

        ControlFlow::Break(best)
    })
}
