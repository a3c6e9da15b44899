// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, bounds and planes

mod bbox;
mod bvh;
mod mesh;
mod plane;
mod primitives;

pub use bbox::BoundingBox;
pub use bvh::BVH;
pub use mesh::{Face, FaceProperties, Mesh, MeshId};
pub use plane::{Plane, PlaneSide};
pub use primitives::Primitive;
