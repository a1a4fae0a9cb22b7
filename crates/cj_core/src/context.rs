//! Staging context between an import and its host.
//!
//! In [`CommitMode::Atomic`] every operation lands in a private staging
//! [`Scene`]; the host is only cleared and populated by [`SceneContext::commit`],
//! so a failed import leaves the host exactly as it was. In
//! [`CommitMode::Incremental`] operations go straight to the host and a
//! failure leaves whatever was created before it.

use std::sync::Arc;

use cj_math::DVec3;
use serde::{Deserialize, Serialize};

use crate::mesh::Face;
use crate::scene::{EntityHandle, PropertyMap, Scene, SceneHost};

/// How imported entities reach the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Build in a staging scene and hand over everything on success
    #[default]
    Atomic,

    /// Write through to the host as entities are built
    Incremental,
}

/// Routes scene operations either to a staging scene or to the host.
pub struct SceneContext<'h> {
    host: &'h mut dyn SceneHost,
    mode: CommitMode,
    staging: Scene,
    /// Parent links accepted by staging, in the order they were made
    links: Vec<(EntityHandle, EntityHandle)>,
}

impl<'h> SceneContext<'h> {
    pub fn new(host: &'h mut dyn SceneHost, mode: CommitMode) -> Self {
        Self {
            host,
            mode,
            staging: Scene::new("staging"),
            links: Vec::new(),
        }
    }

    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    /// Drop prior scene state.
    ///
    /// Incremental mode clears the host immediately. Atomic mode only resets
    /// staging; the host is cleared at commit time.
    pub fn clear(&mut self) {
        match self.mode {
            CommitMode::Atomic => {
                self.staging.clear_scene();
                self.links.clear();
            }
            CommitMode::Incremental => self.host.clear_scene(),
        }
    }

    fn target(&mut self) -> &mut (dyn SceneHost + 'h) {
        match self.mode {
            CommitMode::Atomic => &mut self.staging,
            CommitMode::Incremental => &mut *self.host,
        }
    }

    /// Hand staged entities to the host. Returns the number of entities
    /// transferred (always 0 in incremental mode).
    pub fn commit(self) -> usize {
        if self.mode == CommitMode::Incremental {
            return 0;
        }

        let host = self.host;
        host.clear_scene();

        let entities = self.staging.into_entities();
        let mut handles = Vec::with_capacity(entities.len());

        for entity in entities {
            let mesh = Arc::unwrap_or_clone(entity.mesh);
            let handle = host.create_mesh_entity(&entity.name, mesh.vertices, mesh.faces);
            if !entity.properties.is_empty() {
                host.set_custom_properties(handle, entity.properties);
            }
            handles.push(handle);
        }

        // Staged handles are indices into the staging scene
        for (child, parent) in self.links {
            let (child, parent) = (handles[child.index()], handles[parent.index()]);
            if !host.set_parent(child, parent) {
                log::warn!("Host refused staged parent link {} -> {}", parent, child);
            }
        }

        log::debug!("Committed {} staged entities", handles.len());
        handles.len()
    }
}

impl SceneHost for SceneContext<'_> {
    fn clear_scene(&mut self) {
        self.clear();
    }

    fn create_mesh_entity(
        &mut self,
        name: &str,
        vertices: Arc<[DVec3]>,
        faces: Vec<Face>,
    ) -> EntityHandle {
        self.target().create_mesh_entity(name, vertices, faces)
    }

    fn set_custom_properties(&mut self, handle: EntityHandle, props: PropertyMap) {
        self.target().set_custom_properties(handle, props);
    }

    fn set_parent(&mut self, child: EntityHandle, parent: EntityHandle) -> bool {
        let linked = self.target().set_parent(child, parent);
        if linked && self.mode == CommitMode::Atomic {
            self.links.push((child, parent));
        }
        linked
    }

    fn lookup_entity(&self, identifier: &str) -> Option<EntityHandle> {
        match self.mode {
            CommitMode::Atomic => self.staging.lookup_entity(identifier),
            CommitMode::Incremental => self.host.lookup_entity(identifier),
        }
    }
}
