// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon records used by the boolean pipeline

use super::context::{CsgContext, VertexId};
use crate::geometry::{BoundingBox, FaceProperties, Plane};
use crate::utils::math::{centroid, dominant_axis};
use nalgebra::{Point2, Point3};

/// Classification of a polygon with respect to the other operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonStatus {
    Unknown,
    Inside,
    Outside,
    /// Coplanar with a polygon of the other operand, normals agree
    Same,
    /// Coplanar with a polygon of the other operand, normals disagree
    Opposite,
}

/// Where a point on a polygon's plane falls relative to its boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointContainment {
    Inside,
    OnBoundary,
    Outside,
}

/// Convex planar polygon over context vertices
#[derive(Debug, Clone)]
pub struct CsgPolygon {
    /// Identity within the owning context
    pub id: u64,
    /// Counter-clockwise loop seen from the front of `plane`
    pub vertices: Vec<VertexId>,
    pub plane: Plane,
    /// Vertex bounds padded by the context epsilon
    pub bounds: BoundingBox,
    pub barycenter: Point3<f64>,
    pub face_properties: FaceProperties,
    pub status: PolygonStatus,
}

impl CsgPolygon {
    /// Build a polygon, deriving its plane from the vertex loop
    pub fn new(ctx: &mut CsgContext, vertices: Vec<VertexId>, face_properties: FaceProperties) -> Self {
        let points = positions(ctx, &vertices);
        let plane = Plane::from_polygon(&points);
        Self::build(ctx, vertices, &points, plane, face_properties)
    }

    /// Build a polygon lying on a known plane, e.g. one piece of a split
    pub fn with_plane(
        ctx: &mut CsgContext,
        vertices: Vec<VertexId>,
        plane: Plane,
        face_properties: FaceProperties,
    ) -> Self {
        let points = positions(ctx, &vertices);
        Self::build(ctx, vertices, &points, plane, face_properties)
    }

    fn build(
        ctx: &mut CsgContext,
        vertices: Vec<VertexId>,
        points: &[Point3<f64>],
        plane: Plane,
        face_properties: FaceProperties,
    ) -> Self {
        let mut bounds = BoundingBox::from_points(points);
        bounds.expand(2.0 * ctx.epsilon());

        Self {
            id: ctx.next_polygon_id(),
            vertices,
            plane,
            bounds,
            barycenter: centroid(points),
            face_properties,
            status: PolygonStatus::Unknown,
        }
    }

    pub fn positions(&self, ctx: &CsgContext) -> Vec<Point3<f64>> {
        positions(ctx, &self.vertices)
    }

    /// Same polygon facing the other way
    pub fn invert(&self) -> CsgPolygon {
        let mut inverted = self.clone();
        inverted.vertices.reverse();
        inverted.plane = self.plane.flipped();
        inverted
    }

    /// Locate `point`, assumed to lie on the polygon's plane, against the
    /// polygon's boundary. Points within `epsilon` of an edge are on the boundary.
    pub fn contains_point(&self, ctx: &CsgContext, point: &Point3<f64>) -> PointContainment {
        let points = self.positions(ctx);
        let epsilon = ctx.epsilon();

        for (i, a) in points.iter().enumerate() {
            let b = &points[(i + 1) % points.len()];
            if distance_to_segment(point, a, b) < epsilon {
                return PointContainment::OnBoundary;
            }
        }

        // Crossing test on the projection that drops the dominant normal axis
        let axis = dominant_axis(&self.plane.normal);
        let project = |p: &Point3<f64>| match axis {
            0 => Point2::new(p.y, p.z),
            1 => Point2::new(p.z, p.x),
            _ => Point2::new(p.x, p.y),
        };
        let q = project(point);
        let mut inside = false;
        for (i, a) in points.iter().enumerate() {
            let a = project(a);
            let b = project(&points[(i + 1) % points.len()]);
            if (a.y > q.y) != (b.y > q.y) {
                let x = a.x + (q.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if q.x < x {
                    inside = !inside;
                }
            }
        }

        if inside {
            PointContainment::Inside
        } else {
            PointContainment::Outside
        }
    }
}

fn positions(ctx: &CsgContext, vertices: &[VertexId]) -> Vec<Point3<f64>> {
    vertices.iter().map(|&id| ctx.position(id)).collect()
}

fn distance_to_segment(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let length_squared = ab.norm_squared();
    if length_squared == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / length_squared).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CsgConfig;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn square(ctx: &mut CsgContext, z: f64) -> CsgPolygon {
        let ids = [
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(0.0, 1.0, z),
        ]
        .map(|p| ctx.create_or_get_vertex_at(p));
        CsgPolygon::new(ctx, ids.to_vec(), FaceProperties::new(2))
    }

    fn context() -> CsgContext {
        let bounds = BoundingBox::from_center_size(Point3::origin(), Vector3::repeat(4.0));
        CsgContext::new(&bounds, &CsgConfig::default())
    }

    #[test]
    fn test_polygon_geometry() {
        let mut ctx = context();
        let poly = square(&mut ctx, 0.5);
        assert_relative_eq!(poly.plane.normal, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(poly.plane.w, 0.5, epsilon = 1e-12);
        assert_relative_eq!(poly.barycenter, Point3::new(0.5, 0.5, 0.5), epsilon = 1e-12);
        assert!(poly.bounds.min.z < 0.5 && poly.bounds.max.z > 0.5);
        assert_eq!(poly.status, PolygonStatus::Unknown);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ctx = context();
        let a = square(&mut ctx, 0.0);
        let b = square(&mut ctx, 1.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_invert() {
        let mut ctx = context();
        let poly = square(&mut ctx, 0.0);
        let inverted = poly.invert();
        assert_relative_eq!(inverted.plane.normal, -Vector3::z(), epsilon = 1e-12);
        assert_eq!(inverted.vertices.first(), poly.vertices.last());
        assert_eq!(inverted.face_properties, poly.face_properties);
    }

    #[test]
    fn test_contains_point() {
        let mut ctx = context();
        let poly = square(&mut ctx, 0.0);
        assert_eq!(
            poly.contains_point(&ctx, &Point3::new(0.5, 0.5, 0.0)),
            PointContainment::Inside
        );
        assert_eq!(
            poly.contains_point(&ctx, &Point3::new(1.0, 0.5, 0.0)),
            PointContainment::OnBoundary
        );
        assert_eq!(
            poly.contains_point(&ctx, &Point3::new(0.0, 0.0, 0.0)),
            PointContainment::OnBoundary
        );
        assert_eq!(
            poly.contains_point(&ctx, &Point3::new(1.5, 0.5, 0.0)),
            PointContainment::Outside
        );
    }

    #[test]
    fn test_contains_point_on_vertical_polygon() {
        let mut ctx = context();
        let ids = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
        .map(|p| ctx.create_or_get_vertex_at(p));
        let poly = CsgPolygon::new(&mut ctx, ids.to_vec(), FaceProperties::default());
        assert_relative_eq!(poly.plane.normal, Vector3::x(), epsilon = 1e-12);
        assert_eq!(
            poly.contains_point(&ctx, &Point3::new(0.0, 0.25, 0.75)),
            PointContainment::Inside
        );
        assert_eq!(
            poly.contains_point(&ctx, &Point3::new(0.0, 1.25, 0.75)),
            PointContainment::Outside
        );
    }
}
