//! Boundary flattening.
//!
//! A boundary is a stack of nested arrays whose depth is fixed by the
//! geometry type:
//!
//! | type                           | nesting                                  |
//! |--------------------------------|------------------------------------------|
//! | MultiSurface, CompositeSurface | surface -> ring -> index                 |
//! | Solid                          | shell -> surface -> ring -> index        |
//! | MultiSolid                     | solid -> shell -> surface -> ring -> index |
//!
//! Flattening strips the grouping levels and yields one [`Face`] per ring in
//! document order. Inner rings (holes) are not treated specially; each one
//! becomes its own face loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::types::{Geometry, GeometryType};
use crate::mesh::Face;

/// Errors raised while flattening a single geometry entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    #[error("unsupported geometry type '{0}'")]
    UnsupportedType(String),

    #[error("{geometry_type} boundary expects an array of {expected} at {path}")]
    ExpectedArray {
        geometry_type: GeometryType,
        expected: &'static str,
        path: String,
    },

    #[error("{geometry_type} boundary expects a vertex index at {path}, found {found}")]
    ExpectedIndex {
        geometry_type: GeometryType,
        path: String,
        found: String,
    },

    #[error("vertex index {index} at {path} is out of range (vertex count {vertex_count})")]
    IndexOutOfRange {
        index: u64,
        path: String,
        vertex_count: usize,
    },
}

/// What to do when an object carries several geometry entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMerge {
    /// Keep only the faces of the last entry
    #[default]
    LastEntry,

    /// Concatenate the faces of all entries in order
    Union,
}

/// Flatten one geometry entry into face loops.
///
/// Every index must address the vertex pool (`index < vertex_count`).
pub fn flatten_geometry(geometry: &Geometry, vertex_count: usize) -> Result<Vec<Face>, FlattenError> {
    let geometry_type = GeometryType::from_tag(&geometry.type_name)
        .ok_or_else(|| FlattenError::UnsupportedType(geometry.type_name.clone()))?;

    let mut walker = BoundaryWalker {
        geometry_type,
        vertex_count,
        path: String::from("boundaries"),
        faces: Vec::new(),
    };
    walker.walk(&geometry.boundaries, geometry_type.levels())?;

    Ok(walker.faces)
}

/// Flatten all geometry entries of one object according to `merge`.
///
/// Every entry is validated even when its faces are discarded. On failure the
/// index of the offending entry is returned with the error.
pub fn flatten_object(
    geometries: &[Geometry],
    vertex_count: usize,
    merge: GeometryMerge,
) -> Result<Vec<Face>, (usize, FlattenError)> {
    let mut faces = Vec::new();

    for (index, geometry) in geometries.iter().enumerate() {
        let entry = flatten_geometry(geometry, vertex_count).map_err(|e| (index, e))?;
        match merge {
            GeometryMerge::LastEntry => faces = entry,
            GeometryMerge::Union => faces.extend(entry),
        }
    }

    Ok(faces)
}

struct BoundaryWalker {
    geometry_type: GeometryType,
    vertex_count: usize,
    /// JSON-path style location of the value being visited
    path: String,
    faces: Vec<Face>,
}

impl BoundaryWalker {
    /// `levels` names what each array level still to descend holds,
    /// outermost first. With one level left, `value` is a ring.
    fn walk(&mut self, value: &Value, levels: &[&'static str]) -> Result<(), FlattenError> {
        let Some((&level, rest)) = levels.split_first() else {
            return Ok(());
        };

        let items = value.as_array().ok_or_else(|| FlattenError::ExpectedArray {
            geometry_type: self.geometry_type,
            expected: level,
            path: self.path.clone(),
        })?;

        if rest.is_empty() {
            // `value` is a single ring
            let face = self.ring(items)?;
            self.faces.push(face);
            return Ok(());
        }

        for (i, item) in items.iter().enumerate() {
            let len = self.path.len();
            self.path.push_str(&format!("[{}]", i));
            self.walk(item, rest)?;
            self.path.truncate(len);
        }

        Ok(())
    }

    fn ring(&self, items: &[Value]) -> Result<Face, FlattenError> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let index = item.as_u64().ok_or_else(|| FlattenError::ExpectedIndex {
                    geometry_type: self.geometry_type,
                    path: format!("{}[{}]", self.path, i),
                    found: describe(item),
                })?;

                match u32::try_from(index) {
                    Ok(idx) if (idx as usize) < self.vertex_count => Ok(idx),
                    _ => Err(FlattenError::IndexOutOfRange {
                        index,
                        path: format!("{}[{}]", self.path, i),
                        vertex_count: self.vertex_count,
                    }),
                }
            })
            .collect()
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
        other => other.to_string(),
    }
}
