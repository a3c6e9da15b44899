// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations on CSG objects
//!
//! Every operation runs the same pipeline: split A by B, B by A, A by B once
//! more, classify A against B and B against A, then keep polygons by status.

use super::classify::classify_polygons;
use super::context::{CsgContext, VertexId};
use super::object::CsgObject;
use super::polygon::{CsgPolygon, PolygonStatus};
use super::splitter::split_object;
use crate::config::CsgConfig;
use crate::geometry::FaceProperties;
use ahash::AHashMap;
use tracing::debug;

fn split_and_classify(ctx: &mut CsgContext, left: &mut CsgObject, right: &mut CsgObject, config: &CsgConfig) {
    split_object(ctx, left, right, config);
    split_object(ctx, right, left, config);
    split_object(ctx, left, right, config);
    classify_polygons(ctx, left, right, config);
    classify_polygons(ctx, right, left, config);
}

/// A ∪ B: A's outside and same-facing coplanar polygons, B's outside polygons
pub fn csg_union(ctx: &mut CsgContext, left: &mut CsgObject, right: &mut CsgObject, config: &CsgConfig) -> Vec<CsgPolygon> {
    split_and_classify(ctx, left, right, config);

    let mut polys = select_polygons(left, false, None, &[PolygonStatus::Outside, PolygonStatus::Same]);
    polys.extend(select_polygons(right, false, None, &[PolygonStatus::Outside]));

    debug!(polygons = polys.len(), "union");
    polys
}

/// A ∩ B: inside polygons of both, plus one copy of each shared coplanar face
pub fn csg_intersect(
    ctx: &mut CsgContext,
    left: &mut CsgObject,
    right: &mut CsgObject,
    config: &CsgConfig,
) -> Vec<CsgPolygon> {
    split_and_classify(ctx, left, right, config);

    let left_coplanar = select_polygons(left, false, None, &[PolygonStatus::Same]);
    let right_coplanar = select_polygons(right, false, None, &[PolygonStatus::Same]);

    let mut polys = select_polygons(left, false, None, &[PolygonStatus::Inside]);
    polys.extend(select_polygons(right, false, None, &[PolygonStatus::Inside]));
    polys.extend(merge_coplanar_polygons_favoring_second(left_coplanar, right_coplanar));

    debug!(polygons = polys.len(), "intersect");
    polys
}

/// A − B: A's outside and opposite-facing coplanar polygons, B's inside
/// polygons turned inside out
pub fn csg_subtract(
    ctx: &mut CsgContext,
    left: &mut CsgObject,
    right: &mut CsgObject,
    config: &CsgConfig,
) -> Vec<CsgPolygon> {
    split_and_classify(ctx, left, right, config);

    let mut polys = select_polygons(left, false, None, &[PolygonStatus::Outside, PolygonStatus::Opposite]);
    polys.extend(select_polygons(right, true, None, &[PolygonStatus::Inside]));

    debug!(polygons = polys.len(), "subtract");
    polys
}

/// A's geometry with the part overlapping B recoloured to B's dominant material
pub fn csg_paint_intersect(
    ctx: &mut CsgContext,
    left: &mut CsgObject,
    right: &mut CsgObject,
    config: &CsgConfig,
) -> Vec<CsgPolygon> {
    split_and_classify(ctx, left, right, config);

    let paint = dominant_face_properties(right);
    let mut polys = select_polygons(
        left,
        false,
        paint,
        &[PolygonStatus::Inside, PolygonStatus::Same, PolygonStatus::Opposite],
    );
    polys.extend(select_polygons(left, false, None, &[PolygonStatus::Outside]));

    debug!(polygons = polys.len(), material = ?paint.map(|p| p.material_id), "paint intersect");
    polys
}

/// Copies of the polygons of `object` whose status is in `statuses`,
/// optionally inverted and recoloured
pub fn select_polygons(
    object: &CsgObject,
    invert: bool,
    overwrite: Option<FaceProperties>,
    statuses: &[PolygonStatus],
) -> Vec<CsgPolygon> {
    object
        .polygons
        .iter()
        .filter(|poly| statuses.contains(&poly.status))
        .map(|poly| {
            let mut selected = if invert { poly.invert() } else { poly.clone() };
            if let Some(properties) = overwrite {
                selected.face_properties = properties;
            }
            selected
        })
        .collect()
}

/// Rotation-invariant identity of a polygon's vertex loop: the loop read
/// from its smallest vertex id
fn polygon_key(poly: &CsgPolygon) -> Vec<VertexId> {
    let start = poly
        .vertices
        .iter()
        .enumerate()
        .min_by_key(|&(_, v)| *v)
        .map_or(0, |(i, _)| i);
    poly.vertices[start..]
        .iter()
        .chain(&poly.vertices[..start])
        .copied()
        .collect()
}

/// Union of two polygon lists in which a polygon of `secondary` replaces
/// a polygon of `primary` with the same vertex loop. Output keeps the order
/// in which loops were first seen.
pub fn merge_coplanar_polygons_favoring_second(
    primary: Vec<CsgPolygon>,
    secondary: Vec<CsgPolygon>,
) -> Vec<CsgPolygon> {
    if primary.is_empty() {
        return secondary;
    }
    if secondary.is_empty() {
        return primary;
    }

    let mut slots: AHashMap<Vec<VertexId>, usize> = AHashMap::with_capacity(primary.len() + secondary.len());
    let mut merged: Vec<CsgPolygon> = Vec::with_capacity(primary.len() + secondary.len());
    for poly in primary.into_iter().chain(secondary) {
        match slots.get(&polygon_key(&poly)) {
            Some(&slot) => merged[slot] = poly,
            None => {
                slots.insert(polygon_key(&poly), merged.len());
                merged.push(poly);
            }
        }
    }
    merged
}

/// Most frequent face properties among the polygons of `object`, ties going
/// to the properties seen first. `None` for an empty object.
pub fn dominant_face_properties(object: &CsgObject) -> Option<FaceProperties> {
    let mut order: Vec<(FaceProperties, usize)> = Vec::new();
    let mut slots: AHashMap<u32, usize> = AHashMap::new();
    for poly in &object.polygons {
        let material = poly.face_properties.material_id;
        match slots.get(&material) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                slots.insert(material, order.len());
                order.push((poly.face_properties, 1));
            }
        }
    }

    let mut best: Option<(FaceProperties, usize)> = None;
    for (properties, count) in order {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((properties, count));
        }
    }
    best.map(|(properties, _)| properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::convert::to_csg;
    use crate::geometry::{BoundingBox, Primitive};
    use nalgebra::{Point3, Vector3};

    fn context() -> CsgContext {
        let bounds = BoundingBox::from_center_size(Point3::origin(), Vector3::repeat(8.0));
        CsgContext::new(&bounds, &CsgConfig::default())
    }

    fn cube(ctx: &mut CsgContext, material: u32, center: Vector3<f64>) -> CsgObject {
        let mut mesh = Primitive::cube(Vector3::repeat(1.0), true).to_mesh(1, FaceProperties::new(material));
        mesh.translate(center);
        to_csg(ctx, &mesh, Vector3::zeros(), 1.0)
    }

    #[test]
    fn test_polygon_key_is_rotation_invariant() {
        let mut ctx = context();
        let a = cube(&mut ctx, 1, Vector3::zeros());
        let poly = &a.polygons[0];
        let mut rotated = poly.clone();
        rotated.vertices.rotate_left(2);
        assert_eq!(polygon_key(poly), polygon_key(&rotated));
        assert_ne!(polygon_key(poly), polygon_key(&poly.invert()));
    }

    #[test]
    fn test_merge_favors_second() {
        let mut ctx = context();
        let a = cube(&mut ctx, 1, Vector3::zeros());
        let b = cube(&mut ctx, 2, Vector3::zeros());

        let primary = a.polygons[..3].to_vec();
        let secondary = b.polygons[2..4].to_vec();
        let merged = merge_coplanar_polygons_favoring_second(primary, secondary);

        let materials: Vec<u32> = merged.iter().map(|p| p.face_properties.material_id).collect();
        assert_eq!(materials, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_dominant_face_properties() {
        let mut ctx = context();
        let mut object = cube(&mut ctx, 7, Vector3::zeros());
        assert_eq!(dominant_face_properties(&object), Some(FaceProperties::new(7)));

        for poly in object.polygons.iter_mut().take(3) {
            poly.face_properties = FaceProperties::new(4);
        }
        // Three each: the first seen wins
        assert_eq!(dominant_face_properties(&object), Some(FaceProperties::new(4)));

        object.polygons[3].face_properties = FaceProperties::new(9);
        assert_eq!(dominant_face_properties(&object), Some(FaceProperties::new(4)));

        assert_eq!(dominant_face_properties(&CsgObject::new(Vec::new(), Vec::new())), None);
    }

    #[test]
    fn test_select_inverts_and_recolors() {
        let mut ctx = context();
        let mut object = cube(&mut ctx, 1, Vector3::zeros());
        object.polygons[0].status = PolygonStatus::Inside;

        let selected = select_polygons(&object, true, Some(FaceProperties::new(8)), &[PolygonStatus::Inside]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].face_properties.material_id, 8);
        assert!(selected[0].plane.normal.dot(&object.polygons[0].plane.normal) < 0.0);
    }

    #[test]
    fn test_intersect_of_half_overlapping_cubes() {
        let config = CsgConfig::default();
        let mut ctx = context();
        let mut a = cube(&mut ctx, 1, Vector3::zeros());
        let mut b = cube(&mut ctx, 2, Vector3::new(0.5, 0.0, 0.0));

        let polys = csg_intersect(&mut ctx, &mut a, &mut b, &config);
        assert_eq!(polys.len(), 6);
    }
}
