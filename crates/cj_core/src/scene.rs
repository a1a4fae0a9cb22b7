//! Scene graph types.
//!
//! `SceneHost` is the collaborator an import drives: it creates mesh
//! entities, attaches custom properties and links parents. `Scene` is the
//! in-memory implementation, used directly by the CLI and as the staging area
//! for atomic imports.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use cj_math::{Aabb, DVec3};

use crate::mesh::{Face, Mesh};

/// Custom properties attached to an entity, keyed by dotted attribute path.
pub type PropertyMap = BTreeMap<String, serde_json::Value>;

/// Opaque reference to an entity inside a particular host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(usize);

impl EntityHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host environment receiving imported entities.
///
/// Handles are only meaningful to the host that issued them.
pub trait SceneHost {
    /// Remove every entity from the scene.
    fn clear_scene(&mut self);

    /// Create a named mesh entity over a shared vertex pool.
    fn create_mesh_entity(
        &mut self,
        name: &str,
        vertices: Arc<[DVec3]>,
        faces: Vec<Face>,
    ) -> EntityHandle;

    /// Attach custom properties, merging over any already present.
    fn set_custom_properties(&mut self, handle: EntityHandle, props: PropertyMap);

    /// Link `child` under `parent`, replacing any previous parent.
    ///
    /// Returns `false` if the host refused the link.
    fn set_parent(&mut self, child: EntityHandle, parent: EntityHandle) -> bool;

    /// Find an entity by the name it was created with.
    fn lookup_entity(&self, identifier: &str) -> Option<EntityHandle>;
}

/// A mesh entity in the scene.
#[derive(Clone, Debug)]
pub struct SceneEntity {
    /// Handle of this entity within its scene
    pub handle: EntityHandle,

    /// Entity name (the CityObject identifier)
    pub name: String,

    /// Geometry
    pub mesh: Arc<Mesh>,

    /// Flattened custom properties
    pub properties: PropertyMap,

    /// Parent entity, `None` for roots
    pub parent: Option<EntityHandle>,
}

/// An in-memory scene of named mesh entities with a parent hierarchy.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Scene name (usually from filename)
    pub name: String,

    entities: Vec<SceneEntity>,

    /// Name -> handle; the first entity created under a name wins
    by_name: HashMap<String, EntityHandle>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get an entity by handle.
    pub fn entity(&self, handle: EntityHandle) -> Option<&SceneEntity> {
        self.entities.get(handle.index())
    }

    /// Get an entity by name.
    pub fn entity_by_name(&self, name: &str) -> Option<&SceneEntity> {
        self.lookup_entity(name).and_then(|h| self.entity(h))
    }

    /// All entities in creation order.
    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    /// Consume the scene, yielding entities in creation order.
    pub fn into_entities(self) -> Vec<SceneEntity> {
        self.entities
    }

    /// Get entity count.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get total face loop count across all entities.
    pub fn face_count(&self) -> usize {
        self.entities.iter().map(|e| e.mesh.face_count()).sum()
    }

    /// Get total triangle count across all entities.
    pub fn triangle_count(&self) -> usize {
        self.entities.iter().map(|e| e.mesh.triangle_count()).sum()
    }

    /// Entities without a parent, in creation order.
    pub fn roots(&self) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|e| e.parent.is_none())
            .map(|e| e.handle)
            .collect()
    }

    /// Direct children of `parent`, in creation order.
    pub fn children_of(&self, parent: EntityHandle) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|e| e.parent == Some(parent))
            .map(|e| e.handle)
            .collect()
    }

    /// Parent of an entity by name, as a name.
    pub fn parent_name(&self, name: &str) -> Option<&str> {
        let parent = self.entity_by_name(name)?.parent?;
        self.entity(parent).map(|p| p.name.as_str())
    }

    /// Compute the bounding box of every entity's geometry.
    pub fn world_bounds(&self) -> Aabb {
        self.entities
            .iter()
            .fold(Aabb::empty(), |acc, e| Aabb::surrounding(&acc, &e.mesh.bounds))
    }

    /// True if `ancestor` is `handle` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: EntityHandle, handle: EntityHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.entity(h).and_then(|e| e.parent);
        }
        false
    }
}

impl SceneHost for Scene {
    fn clear_scene(&mut self) {
        self.entities.clear();
        self.by_name.clear();
    }

    fn create_mesh_entity(
        &mut self,
        name: &str,
        vertices: Arc<[DVec3]>,
        faces: Vec<Face>,
    ) -> EntityHandle {
        let handle = EntityHandle::new(self.entities.len());
        self.entities.push(SceneEntity {
            handle,
            name: name.to_string(),
            mesh: Arc::new(Mesh::new(vertices, faces)),
            properties: PropertyMap::new(),
            parent: None,
        });
        self.by_name.entry(name.to_string()).or_insert(handle);
        handle
    }

    fn set_custom_properties(&mut self, handle: EntityHandle, props: PropertyMap) {
        match self.entities.get_mut(handle.index()) {
            Some(entity) => entity.properties.extend(props),
            None => log::warn!("set_custom_properties: unknown entity {}", handle),
        }
    }

    fn set_parent(&mut self, child: EntityHandle, parent: EntityHandle) -> bool {
        if self.entity(child).is_none() || self.entity(parent).is_none() {
            log::warn!("set_parent: unknown entity in link {} -> {}", parent, child);
            return false;
        }

        // A parent loop would make the hierarchy unwalkable
        if self.is_ancestor(child, parent) {
            log::warn!(
                "Ignoring parent link {} -> {}: it would create a cycle",
                parent,
                child
            );
            return false;
        }

        self.entities[child.index()].parent = Some(parent);
        true
    }

    fn lookup_entity(&self, identifier: &str) -> Option<EntityHandle> {
        self.by_name.get(identifier).copied()
    }
}
