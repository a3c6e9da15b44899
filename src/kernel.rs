// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API for mesh boolean operations

use crate::config::CsgConfig;
use crate::csg::{
    csg_intersect, csg_paint_intersect, csg_subtract, csg_union, from_polys, to_csg, CsgContext,
};
use crate::geometry::{BoundingBox, Mesh};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Boolean operation between a brush (A) and a target (B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CsgOperation {
    Union,
    Intersect,
    /// A − B
    Subtract,
    /// Subtract results followed by intersect results
    Split,
    /// A with the part overlapping B recoloured to B's dominant material
    PaintIntersect,
}

/// Translation and uniform scale that bring both operands near the origin
/// at roughly unit size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationFrame {
    pub offset: Vector3<f64>,
    pub scale: f64,
}

impl OperationFrame {
    pub fn new(a: &BoundingBox, b: &BoundingBox) -> Self {
        let center = (a.center().coords + b.center().coords) / 2.0;
        let average_radius = (a.extents().norm() + b.extents().norm()) / 2.0;
        let scale = 1.0 / average_radius;
        Self {
            offset: -center,
            scale: if scale.is_finite() { scale.max(1.0) } else { 1.0 },
        }
    }

    /// Bounds of both operands' vertices in this frame, grown by `padding`
    pub fn operation_bounds(&self, a: &Mesh, b: &Mesh, padding: f64) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for p in a.model_positions().chain(b.model_positions()) {
            bounds.expand_to_include(&((p + self.offset) * self.scale));
        }
        bounds.expand(padding);
        bounds
    }
}

/// Boolean kernel holding the tolerances used for every operation
#[derive(Debug, Clone, Default)]
pub struct CsgKernel {
    config: CsgConfig,
}

impl CsgKernel {
    /// Create a kernel with default tolerances
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CsgConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CsgConfig {
        &self.config
    }

    /// Run `operation` on `brush` and `target`
    pub fn apply(&self, brush: &Mesh, target: &Mesh, operation: CsgOperation) -> Vec<Mesh> {
        do_csg_operation_with_config(brush, target, operation, &self.config)
    }
}

/// Run a boolean operation with default tolerances.
///
/// Returns no mesh for an empty result, one mesh otherwise; a disjoint union
/// returns both operands and [`CsgOperation::Split`] returns up to two meshes.
pub fn do_csg_operation(brush: &Mesh, target: &Mesh, operation: CsgOperation) -> Vec<Mesh> {
    do_csg_operation_with_config(brush, target, operation, &CsgConfig::default())
}

/// Run a boolean operation with the given tolerances
#[instrument(skip_all, fields(op = ?operation, brush = brush.id, target = target.id))]
pub fn do_csg_operation_with_config(
    brush: &Mesh,
    target: &Mesh,
    operation: CsgOperation,
    config: &CsgConfig,
) -> Vec<Mesh> {
    if operation == CsgOperation::Split {
        let mut results = do_csg_operation_with_config(brush, target, CsgOperation::Subtract, config);
        results.extend(do_csg_operation_with_config(
            brush,
            target,
            CsgOperation::Intersect,
            config,
        ));
        return results;
    }

    let brush_bounds = brush.bounds();
    let target_bounds = target.bounds();
    if !brush_bounds.intersects(&target_bounds) {
        debug!("operands are disjoint, taking fast path");
        return match operation {
            CsgOperation::Subtract => vec![brush.clone()],
            CsgOperation::Union => vec![brush.clone(), target.clone()],
            CsgOperation::Intersect | CsgOperation::PaintIntersect | CsgOperation::Split => Vec::new(),
        };
    }

    let frame = OperationFrame::new(&brush_bounds, &target_bounds);
    let bounds = frame.operation_bounds(brush, target, config.operation_bounds_padding);
    let mut ctx = CsgContext::new(&bounds, config);

    let mut left = to_csg(&mut ctx, brush, frame.offset, frame.scale);
    let mut right = to_csg(&mut ctx, target, frame.offset, frame.scale);

    let polys = match operation {
        CsgOperation::Union => csg_union(&mut ctx, &mut left, &mut right, config),
        CsgOperation::Intersect => csg_intersect(&mut ctx, &mut left, &mut right, config),
        CsgOperation::Subtract => csg_subtract(&mut ctx, &mut left, &mut right, config),
        CsgOperation::PaintIntersect => csg_paint_intersect(&mut ctx, &mut left, &mut right, config),
        CsgOperation::Split => Vec::new(),
    };

    if polys.is_empty() {
        return Vec::new();
    }

    vec![from_polys(
        &ctx,
        brush.id,
        brush.offset,
        brush.rotation,
        &polys,
        frame.offset,
        frame.scale,
        merge_remix_ids(brush, target),
    )]
}

fn merge_remix_ids(a: &Mesh, b: &Mesh) -> Option<BTreeSet<String>> {
    if a.remix_ids.is_none() && b.remix_ids.is_none() {
        return None;
    }
    Some(
        a.remix_ids
            .iter()
            .chain(b.remix_ids.iter())
            .flatten()
            .cloned()
            .collect(),
    )
}
