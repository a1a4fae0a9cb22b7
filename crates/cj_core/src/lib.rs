//! CJ Core - CityJSON decoding and scene graph construction.
//!
//! This crate provides:
//!
//! - **Scene graph types**: `Scene`, `SceneEntity`, `Mesh`, and the
//!   `SceneHost` trait an import drives
//! - **Staging**: `SceneContext`, which either writes through to a host or
//!   commits a complete scene at once
//! - **CityJSON support**: vertex dequantisation, boundary flattening,
//!   attribute projection and hierarchy resolution
//!
//! # Example
//!
//! ```ignore
//! use cj_core::cityjson::{load_cityjson, ImportOptions};
//!
//! let (scene, summary) = load_cityjson("city.json", ImportOptions::default())?;
//! println!("Loaded {} objects, {} faces", summary.objects, summary.faces);
//! ```

pub mod cityjson;
pub mod context;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use cityjson::{
    import_cityjson, import_cityjson_from_str, load_cityjson, ImportError, ImportErrorKind,
    ImportOptions, ImportResult, ImportSummary,
};
pub use context::{CommitMode, SceneContext};
pub use mesh::{Face, Mesh};
pub use scene::{EntityHandle, PropertyMap, Scene, SceneEntity, SceneHost};
