// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene-level driver: apply a brush to every mesh it overlaps
//!
//! The driver talks to its surroundings through two small traits: a
//! [`Model`] that owns meshes and applies edit commands, and a
//! [`SpatialIndex`] that answers bounds queries. [`SceneModel`] and
//! [`MeshIndex`] are in-memory implementations of both.

use crate::config::CsgConfig;
use crate::error::CsgError;
use crate::geometry::{BoundingBox, Mesh, MeshId, BVH};
use crate::kernel::{do_csg_operation_with_config, CsgOperation};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Edit applied to a [`Model`]
#[derive(Debug, Clone)]
pub enum Command {
    AddMesh(Mesh),
    DeleteMesh(MeshId),
    /// Applied in order as one edit
    Composite(Vec<Command>),
}

/// Mesh store the driver edits
pub trait Model {
    fn mesh(&self, id: MeshId) -> Option<&Mesh>;

    /// Fresh id not used by any mesh
    fn generate_mesh_id(&mut self) -> MeshId;

    /// Whether `mesh` satisfies the model's validity contract
    fn can_add_mesh(&self, mesh: &Mesh) -> bool;

    fn apply_command(&mut self, command: Command);
}

/// Broad-phase lookup of meshes by bounds
pub trait SpatialIndex {
    /// Ids of meshes whose bounds intersect `bounds`, in ascending order
    fn find_intersecting_meshes(&self, bounds: &BoundingBox) -> Vec<MeshId>;
}

/// Apply `brush` to every mesh of `model` it overlaps, using default
/// tolerances. Returns whether an edit was committed.
pub fn csg_mesh_from_model(
    model: &mut impl Model,
    index: &impl SpatialIndex,
    brush: &Mesh,
    operation: CsgOperation,
) -> bool {
    match try_csg_mesh_from_model(model, index, brush, operation, &CsgConfig::default()) {
        Ok(edited) => {
            debug!(edited, "brush applied");
            true
        }
        Err(CsgError::NoIntersection) => false,
        Err(err) => {
            warn!(brush = brush.id, error = %err, "brush edit aborted");
            false
        }
    }
}

/// Apply `brush` to every overlapping mesh as one composite edit.
///
/// Each overlapping mesh is replaced by the results of
/// `operation(mesh, brush)`. The first result keeps the mesh's id; further
/// results get fresh ids. Every result is checked with
/// [`Model::can_add_mesh`] before any id is allocated, so a rejected batch
/// commits nothing and leaves the model's id sequence untouched. Returns the
/// number of meshes edited.
pub fn try_csg_mesh_from_model(
    model: &mut impl Model,
    index: &impl SpatialIndex,
    brush: &Mesh,
    operation: CsgOperation,
    config: &CsgConfig,
) -> Result<usize, CsgError> {
    let intersecting = index.find_intersecting_meshes(&brush.bounds());
    if intersecting.is_empty() {
        return Err(CsgError::NoIntersection);
    }

    let mut edits: Vec<(MeshId, Vec<Mesh>)> = Vec::with_capacity(intersecting.len());
    for &mesh_id in &intersecting {
        let mesh = model.mesh(mesh_id).ok_or(CsgError::MissingMesh(mesh_id))?;
        let results = do_csg_operation_with_config(mesh, brush, operation, config);
        if let Some(rejected) = results.iter().find(|result| !model.can_add_mesh(result)) {
            return Err(CsgError::RejectedResult { mesh_id: rejected.id });
        }
        edits.push((mesh_id, results));
    }

    let mut commands = Vec::new();
    for (mesh_id, results) in edits {
        commands.push(Command::DeleteMesh(mesh_id));
        for (i, result) in results.into_iter().enumerate() {
            let to_add = if i == 0 {
                result
            } else {
                let id = model.generate_mesh_id();
                result.clone_with_new_id(id)
            };
            commands.push(Command::AddMesh(to_add));
        }
    }

    model.apply_command(Command::Composite(commands));
    Ok(intersecting.len())
}

/// In-memory [`Model`]; a mesh is valid when it is non-empty and passes
/// [`Mesh::validate`]
#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    meshes: BTreeMap<MeshId, Mesh>,
    next_id: MeshId,
}

impl SceneModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mesh under its own id, replacing any mesh with that id
    pub fn insert(&mut self, mesh: Mesh) {
        self.next_id = self.next_id.max(mesh.id + 1);
        self.meshes.insert(mesh.id, mesh);
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.values()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl Model for SceneModel {
    fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    fn generate_mesh_id(&mut self) -> MeshId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn can_add_mesh(&self, mesh: &Mesh) -> bool {
        !mesh.is_empty() && mesh.validate().is_ok()
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::AddMesh(mesh) => self.insert(mesh),
            Command::DeleteMesh(id) => {
                self.meshes.remove(&id);
            }
            Command::Composite(commands) => {
                for command in commands {
                    self.apply_command(command);
                }
            }
        }
    }
}

/// [`SpatialIndex`] over a snapshot of mesh bounds
#[derive(Debug, Clone)]
pub struct MeshIndex {
    ids: Vec<MeshId>,
    bvh: BVH,
}

impl MeshIndex {
    pub fn build<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Self {
        let mut ids = Vec::new();
        let mut items = Vec::new();
        for (i, mesh) in meshes.into_iter().enumerate() {
            ids.push(mesh.id);
            items.push((i, mesh.bounds()));
        }
        Self {
            ids,
            bvh: BVH::build(items),
        }
    }

    pub fn from_model(model: &SceneModel) -> Self {
        Self::build(model.meshes())
    }
}

impl SpatialIndex for MeshIndex {
    fn find_intersecting_meshes(&self, bounds: &BoundingBox) -> Vec<MeshId> {
        let mut ids: Vec<MeshId> = self.bvh.query(bounds).into_iter().map(|i| self.ids[i]).collect();
        ids.sort_unstable();
        ids
    }
}
