// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycsg
//!
//! Boolean operations on closed polygonal meshes for interactive modeling:
//! union, intersect, subtract, split and paint-intersect. Operands are
//! unified into a shared vertex pool, split against each other's planes,
//! classified by ray casting and recombined by status.

pub mod config;
pub mod csg;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod model;
pub mod utils;

pub use config::CsgConfig;
pub use error::{CsgError, MeshError};
pub use geometry::{BoundingBox, Face, FaceProperties, Mesh, MeshId, Primitive};
pub use kernel::{do_csg_operation, do_csg_operation_with_config, CsgKernel, CsgOperation, OperationFrame};
pub use model::{csg_mesh_from_model, try_csg_mesh_from_model, Command, MeshIndex, Model, SceneModel, SpatialIndex};
