// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon-level CSG: vertex unification, splitting, classification and the
//! boolean combinators built on them

pub mod classify;
pub mod context;
pub mod convert;
pub mod object;
pub mod operations;
pub mod polygon;
pub mod retry;
pub mod splitter;
pub mod validate;

pub use classify::{classify_polygon_using_raycast, classify_polygons, RayHit};
pub use context::{CsgContext, CsgVertex, VertexId, VertexStatus};
pub use convert::{from_polys, to_csg};
pub use object::CsgObject;
pub use operations::{csg_intersect, csg_paint_intersect, csg_subtract, csg_union};
pub use polygon::{CsgPolygon, PointContainment, PolygonStatus};
pub use retry::{bounded_retry, RetryOutcome};
pub use splitter::{split_object, split_polygon, split_polys, PolygonCut};
pub use validate::{is_valid_polygon, is_valid_polygon_split, validate_polygon_with_diagnostics, PolygonDefect};
