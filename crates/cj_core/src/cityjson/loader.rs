//! High-level CityJSON import.
//!
//! This module provides the entry points that take a CityJSON document and
//! drive a [`SceneHost`]:
//!
//! 1. clear prior scene state
//! 2. resolve the shared vertex pool
//! 3. per object, in document order: flatten geometry, create the mesh
//!    entity, attach projected attributes
//! 4. link parents and children once every entity exists
//! 5. commit (atomic mode hands the staged scene to the host here)

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use cj_math::DVec3;
use serde::Serialize;
use serde_json::error::Category;
use thiserror::Error;

use super::attributes::project_attributes;
use super::geometry::{flatten_object, FlattenError, GeometryMerge};
use super::hierarchy::{apply_hierarchy, resolve_hierarchy, DanglingReference};
use super::options::ImportOptions;
use super::types::{CityJsonDocument, CityObject};
use super::vertices::{resolve_vertices, VertexError};
use crate::context::SceneContext;
use crate::mesh::Mesh;
use crate::scene::{Scene, SceneHost};

/// Errors that can occur during CityJSON import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(serde_json::Error),

    #[error("Malformed document at {context}: {message}")]
    MalformedDocument { context: String, message: String },

    #[error("Unsupported geometry type '{type_name}' in object '{object}', geometry {geometry_index}")]
    UnsupportedGeometryType {
        object: String,
        geometry_index: usize,
        type_name: String,
    },

    #[error("Dangling reference: {0}")]
    DanglingReference(#[from] DanglingReference),
}

/// Coarse classification of an [`ImportError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportErrorKind {
    MalformedDocument,
    UnsupportedGeometryType,
    DanglingReference,
    Io,
}

impl fmt::Display for ImportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedDocument => "MalformedDocument",
            Self::UnsupportedGeometryType => "UnsupportedGeometryType",
            Self::DanglingReference => "DanglingReference",
            Self::Io => "IOError",
        };
        f.write_str(name)
    }
}

impl ImportError {
    pub fn kind(&self) -> ImportErrorKind {
        match self {
            Self::Io(_) | Self::Json(_) => ImportErrorKind::Io,
            Self::MalformedDocument { .. } => ImportErrorKind::MalformedDocument,
            Self::UnsupportedGeometryType { .. } => ImportErrorKind::UnsupportedGeometryType,
            Self::DanglingReference(_) => ImportErrorKind::DanglingReference,
        }
    }

    fn malformed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedDocument {
            context: context.into(),
            message: message.to_string(),
        }
    }

    fn from_flatten(object: &str, geometry_index: usize, err: FlattenError) -> Self {
        match err {
            FlattenError::UnsupportedType(type_name) => Self::UnsupportedGeometryType {
                object: object.to_string(),
                geometry_index,
                type_name,
            },
            other => Self::malformed(
                format!("CityObjects['{}'].geometry[{}]", object, geometry_index),
                other,
            ),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    /// Syntax problems are IO-class; valid JSON of the wrong shape is malformed.
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::malformed("document", err),
            Category::Io | Category::Syntax | Category::Eof => Self::Json(err),
        }
    }
}

impl From<VertexError> for ImportError {
    fn from(err: VertexError) -> Self {
        let context = match err {
            VertexError::WrongArity { .. } => "vertices",
            VertexError::MissingTransformField(_) | VertexError::ShortTransformField { .. } => {
                "transform"
            }
        };
        Self::malformed(context, err)
    }
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Counts reported after a successful import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Mesh entities created (one per city object)
    pub objects: usize,

    /// Face loops across all entities
    pub faces: usize,

    /// Triangles after fan triangulation of every face loop
    pub triangles: usize,

    /// Size of the shared vertex pool
    pub vertices: usize,

    /// Parent links applied
    pub hierarchy_edges: usize,

    /// Attribute values with no property representation
    pub skipped_attributes: usize,
}

/// Load a CityJSON file into a fresh in-memory [`Scene`].
///
/// # Example
///
/// ```ignore
/// use cj_core::cityjson::{load_cityjson, ImportOptions};
///
/// let (scene, summary) = load_cityjson("delft.city.json", ImportOptions::default())?;
/// println!("Loaded {} objects", summary.objects);
/// ```
pub fn load_cityjson<P: AsRef<Path>>(
    path: P,
    options: ImportOptions,
) -> ImportResult<(Scene, ImportSummary)> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");

    let mut scene = Scene::new(name);
    let summary = import_cityjson(path, &mut scene, options)?;
    Ok((scene, summary))
}

/// Import a CityJSON file into `host`.
pub fn import_cityjson<P: AsRef<Path>>(
    path: P,
    host: &mut dyn SceneHost,
    options: ImportOptions,
) -> ImportResult<ImportSummary> {
    let path = path.as_ref();
    log::info!("Importing CityJSON file: {}", path.display());

    let content = std::fs::read_to_string(path)?;
    import_cityjson_from_str(&content, host, options)
}

/// Import CityJSON from a string (useful for testing).
pub fn import_cityjson_from_str(
    content: &str,
    host: &mut dyn SceneHost,
    options: ImportOptions,
) -> ImportResult<ImportSummary> {
    let document = parse_document(content)?;
    import_document(&document, host, options)
}

/// Decode CityJSON text into the document model without touching a scene.
pub fn parse_document(content: &str) -> ImportResult<CityJsonDocument> {
    Ok(serde_json::from_str(content)?)
}

/// Import an already decoded document into `host`.
pub fn import_document(
    document: &CityJsonDocument,
    host: &mut dyn SceneHost,
    options: ImportOptions,
) -> ImportResult<ImportSummary> {
    let mut context = SceneContext::new(host, options.commit);
    context.clear();

    let vertices: Arc<[DVec3]> =
        resolve_vertices(&document.vertices, document.transform.as_ref())?.into();

    let mut builder = SceneBuilder::new(context, options, vertices);

    for (id, object) in &document.city_objects {
        builder.process_object(id, object)?;
    }

    builder.link_hierarchy(&document.city_objects)?;

    let summary = builder.finish();
    log::info!(
        "CityJSON import finished: {} objects, {} faces, {} hierarchy links",
        summary.objects,
        summary.faces,
        summary.hierarchy_edges
    );
    Ok(summary)
}

/// Internal builder feeding flattened objects into a scene context.
struct SceneBuilder<'h> {
    context: SceneContext<'h>,
    options: ImportOptions,
    /// Shared by every entity created
    vertices: Arc<[DVec3]>,
    summary: ImportSummary,
}

impl<'h> SceneBuilder<'h> {
    fn new(context: SceneContext<'h>, options: ImportOptions, vertices: Arc<[DVec3]>) -> Self {
        let summary = ImportSummary {
            vertices: vertices.len(),
            ..Default::default()
        };
        Self {
            context,
            options,
            vertices,
            summary,
        }
    }

    /// Create the entity for one city object.
    fn process_object(&mut self, id: &str, object: &CityObject) -> ImportResult<()> {
        let merge = self.options.geometry_merge;
        let faces = flatten_object(&object.geometry, self.vertices.len(), merge)
            .map_err(|(index, err)| ImportError::from_flatten(id, index, err))?;

        if merge == GeometryMerge::LastEntry && object.geometry.len() > 1 {
            let kept = object.geometry.last().and_then(|g| g.lod_label());
            log::warn!(
                "'{}' has {} geometry entries; only the last one (LoD {}) is kept",
                id,
                object.geometry.len(),
                kept.as_deref().unwrap_or("unspecified")
            );
        }

        self.summary.faces += faces.len();
        self.summary.triangles += Mesh::fan_triangle_count(&faces);
        log::debug!("Object '{}': {} faces", id, faces.len());

        let handle = self
            .context
            .create_mesh_entity(id, Arc::clone(&self.vertices), faces);

        let projection = project_attributes(&object.attributes);
        self.summary.skipped_attributes += projection.skipped;
        if !projection.properties.is_empty() {
            self.context.set_custom_properties(handle, projection.properties);
        }

        self.summary.objects += 1;
        Ok(())
    }

    /// Second pass: link parents and children.
    fn link_hierarchy(&mut self, objects: &[(String, CityObject)]) -> ImportResult<()> {
        let edges = resolve_hierarchy(objects)?;
        self.summary.hierarchy_edges = apply_hierarchy(&edges, &mut self.context)?;
        Ok(())
    }

    /// Commit and return the summary.
    fn finish(self) -> ImportSummary {
        self.context.commit();
        self.summary
    }
}
