//! CityJSON support.
//!
//! Decodes CityJSON documents and turns every city object into a mesh
//! entity on a [`SceneHost`](crate::scene::SceneHost).
//!
//! ## Supported
//!
//! - `vertices` with optional `transform` (scale/translate dequantisation)
//! - Geometry types `MultiSurface`, `CompositeSurface`, `Solid`, `MultiSolid`
//! - Object attributes, flattened to dotted-path custom properties
//! - `children` / `parents` hierarchies
//!
//! ## Not Supported
//!
//! - `MultiPoint`, `MultiLineString`, `CompositeSolid`, `GeometryInstance`
//! - Semantics, materials and textures
//! - CityJSONSeq / streaming input
//! - Export
//!
//! # Example
//!
//! ```ignore
//! use cj_core::cityjson::{import_cityjson, ImportOptions};
//! use cj_core::scene::Scene;
//!
//! let mut scene = Scene::new("delft");
//! let summary = import_cityjson("delft.city.json", &mut scene, ImportOptions::default())?;
//! println!("Imported {} objects, {} faces", summary.objects, summary.faces);
//! ```

mod attributes;
mod geometry;
mod hierarchy;
mod loader;
mod options;
mod types;
mod vertices;

pub use attributes::*;
pub use geometry::*;
pub use hierarchy::*;
pub use loader::*;
pub use options::*;
pub use types::*;
pub use vertices::*;
