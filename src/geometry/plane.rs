// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Oriented planes and point/ray predicates against them

use crate::utils::math::{centroid, newell_normal};
use nalgebra::{Point3, Vector3};

/// Side of a plane a point falls on, under a tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Front,
    Back,
    On,
}

/// Plane with unit normal: points `p` on the plane satisfy `normal · p = w`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, w: f64) -> Self {
        Self { normal, w }
    }

    /// Plane through a point with the given (not necessarily unit) normal
    pub fn from_normal_and_point(normal: Vector3<f64>, point: &Point3<f64>) -> Self {
        let normal = normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z);
        let w = normal.dot(&point.coords);
        Self { normal, w }
    }

    /// Best-fit plane of a polygon loop: Newell normal through the centroid.
    /// Degenerate loops fall back to +Z.
    pub fn from_polygon(points: &[Point3<f64>]) -> Self {
        Self::from_normal_and_point(newell_normal(points), &centroid(points))
    }

    /// Signed distance from point to plane.
    /// Positive = in front of the plane (the side the normal points to).
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    pub fn classify_point(&self, point: &Point3<f64>, epsilon: f64) -> PlaneSide {
        let distance = self.signed_distance(point);
        if distance > epsilon {
            PlaneSide::Front
        } else if distance < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    pub fn flipped(&self) -> Plane {
        Plane::new(-self.normal, -self.w)
    }

    /// Same orientation and offset within `epsilon` on both the normal and
    /// the distance term.
    pub fn is_coplanar_with(&self, other: &Plane, epsilon: f64) -> bool {
        (self.w - other.w).abs() < epsilon && (self.normal - other.normal).norm() < epsilon
    }

    /// Intersection of the line `origin + t * direction` with the plane.
    /// Returns `None` when the line is parallel to the plane.
    pub fn intersect_line(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Option<(f64, Point3<f64>)> {
        let denom = self.normal.dot(direction);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = -self.signed_distance(origin) / denom;
        Some((t, origin + direction * t))
    }
}
