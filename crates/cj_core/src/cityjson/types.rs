//! CityJSON document types.
//!
//! These mirror the JSON layout closely and are only validated as far as
//! serde can; shape rules that need context (vertex arity, boundary depth,
//! references) are checked by the resolver stages.

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The parsed document root.
#[derive(Clone, Debug, Deserialize)]
pub struct CityJsonDocument {
    /// Usually "CityJSON"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// Optional dequantisation parameters
    #[serde(default)]
    pub transform: Option<RawTransform>,

    /// Raw vertex coordinates (integers when a transform is present)
    pub vertices: Vec<Vec<f64>>,

    /// City objects in document order
    #[serde(rename = "CityObjects", deserialize_with = "ordered_objects")]
    pub city_objects: Vec<(String, CityObject)>,
}

impl CityJsonDocument {
    /// Look up an object by identifier.
    pub fn object(&self, id: &str) -> Option<&CityObject> {
        self.city_objects
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, obj)| obj)
    }
}

/// `transform` member as written; completeness is checked when resolving.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawTransform {
    #[serde(default)]
    pub scale: Option<Vec<f64>>,

    #[serde(default)]
    pub translate: Option<Vec<f64>>,
}

/// A city object record.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CityObject {
    #[serde(default)]
    pub geometry: Vec<Geometry>,

    /// Present (even if empty) means this object acts as a parent
    #[serde(default)]
    pub children: Option<Vec<String>>,

    /// Only the first entry is honoured
    #[serde(default)]
    pub parents: Option<Vec<String>>,

    /// Everything else: `type`, `attributes`, `geographicalExtent`, ...
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A geometry entry: type tag plus nested boundary arrays.
#[derive(Clone, Debug, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub lod: Option<Value>,

    /// Left untyped: its nesting depth depends on `type_name`
    #[serde(default)]
    pub boundaries: Value,
}

impl Geometry {
    /// Level of detail as written, e.g. `"2.2"` or `1`.
    pub fn lod_label(&self) -> Option<String> {
        match self.lod.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Geometry type tags the flattener understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryType {
    MultiSurface,
    CompositeSurface,
    Solid,
    MultiSolid,
}

impl GeometryType {
    /// Parse a CityJSON `type` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "MultiSurface" => Some(Self::MultiSurface),
            "CompositeSurface" => Some(Self::CompositeSurface),
            "Solid" => Some(Self::Solid),
            "MultiSolid" => Some(Self::MultiSolid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiSurface => "MultiSurface",
            Self::CompositeSurface => "CompositeSurface",
            Self::Solid => "Solid",
            Self::MultiSolid => "MultiSolid",
        }
    }

    /// What each array level of the boundary holds, outermost first.
    /// The last level is always a ring: an array of vertex indices.
    pub fn levels(self) -> &'static [&'static str] {
        match self {
            Self::MultiSurface | Self::CompositeSurface => &["surfaces", "rings", "indices"],
            Self::Solid => &["shells", "surfaces", "rings", "indices"],
            Self::MultiSolid => &["solids", "shells", "surfaces", "rings", "indices"],
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collect `CityObjects` as an ordered list, rejecting duplicate ids.
fn ordered_objects<'de, D>(deserializer: D) -> Result<Vec<(String, CityObject)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ObjectsVisitor;

    impl<'de> Visitor<'de> for ObjectsVisitor {
        type Value = Vec<(String, CityObject)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of city object identifiers to city objects")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut objects = Vec::with_capacity(access.size_hint().unwrap_or(0));
            let mut seen = HashSet::new();

            while let Some((id, object)) = access.next_entry::<String, CityObject>()? {
                if !seen.insert(id.clone()) {
                    return Err(de::Error::custom(format!(
                        "duplicate city object identifier '{}'",
                        id
                    )));
                }
                objects.push((id, object));
            }

            Ok(objects)
        }
    }

    deserializer.deserialize_map(ObjectsVisitor)
}
