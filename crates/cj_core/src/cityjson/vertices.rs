//! Vertex pool decoding.
//!
//! CityJSON files usually store vertices as quantised integers plus a
//! `transform` that maps them back to real-world units:
//! `world[a] = raw[a] * scale[a] + translate[a]`.

use cj_math::DVec3;
use thiserror::Error;

use super::types::RawTransform;

/// Shape errors in `vertices` or `transform`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VertexError {
    #[error("vertex {index} has {len} components, expected 3")]
    WrongArity { index: usize, len: usize },

    #[error("transform is missing '{0}'")]
    MissingTransformField(&'static str),

    #[error("transform '{field}' has {len} components, expected 3")]
    ShortTransformField { field: &'static str, len: usize },
}

/// A complete scale/translate pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: DVec3,
    pub translate: DVec3,
}

impl Transform {
    /// Validate a raw `transform` member.
    pub fn from_raw(raw: &RawTransform) -> Result<Self, VertexError> {
        Ok(Self {
            scale: Self::axis_triple("scale", raw.scale.as_deref())?,
            translate: Self::axis_triple("translate", raw.translate.as_deref())?,
        })
    }

    fn axis_triple(field: &'static str, values: Option<&[f64]>) -> Result<DVec3, VertexError> {
        match values {
            None => Err(VertexError::MissingTransformField(field)),
            Some(v) if v.len() < 3 => Err(VertexError::ShortTransformField { field, len: v.len() }),
            Some(v) => Ok(DVec3::new(v[0], v[1], v[2])),
        }
    }

    /// Decode one raw vertex to world coordinates.
    pub fn apply(&self, raw: DVec3) -> DVec3 {
        raw * self.scale + self.translate
    }
}

/// Resolve the raw vertex list into world-space points, same length and order.
pub fn resolve_vertices(
    raw: &[Vec<f64>],
    transform: Option<&RawTransform>,
) -> Result<Vec<DVec3>, VertexError> {
    let transform = transform.map(Transform::from_raw).transpose()?;

    raw.iter()
        .enumerate()
        .map(|(index, coords)| {
            let point = match coords.as_slice() {
                &[x, y, z] => DVec3::new(x, y, z),
                other => {
                    return Err(VertexError::WrongArity {
                        index,
                        len: other.len(),
                    })
                }
            };
            Ok(match &transform {
                Some(t) => t.apply(point),
                None => point,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_transform(scale: &[f64], translate: &[f64]) -> RawTransform {
        RawTransform {
            scale: Some(scale.to_vec()),
            translate: Some(translate.to_vec()),
        }
    }

    #[test]
    fn test_vertices_without_transform_are_unchanged() {
        let raw = vec![vec![1.0, 2.0, 3.0], vec![-4.5, 0.0, 1e6]];
        let resolved = resolve_vertices(&raw, None).unwrap();

        assert_eq!(resolved.len(), raw.len());
        for (v, r) in resolved.iter().zip(&raw) {
            assert_eq!(v.to_array(), [r[0], r[1], r[2]]);
        }
    }

    #[test]
    fn test_transform_applies_per_axis() {
        let raw = vec![vec![1000.0, 2500.0, 15.0], vec![0.0, 0.0, 0.0], vec![-7.0, 3.0, 42.0]];
        let scale = [0.001, 0.001, 0.01];
        let translate = [84616.468, 447422.999, -0.452];
        let transform = raw_transform(&scale, &translate);

        let resolved = resolve_vertices(&raw, Some(&transform)).unwrap();

        for (i, v) in resolved.iter().enumerate() {
            for a in 0..3 {
                assert_eq!(v[a], raw[i][a] * scale[a] + translate[a], "vertex {} axis {}", i, a);
            }
        }
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let raw = vec![vec![0.0, 0.0, 0.0], vec![1.0, 2.0]];
        let err = resolve_vertices(&raw, None).unwrap_err();
        assert_eq!(err, VertexError::WrongArity { index: 1, len: 2 });

        let raw = vec![vec![0.0, 0.0, 0.0, 1.0]];
        let err = resolve_vertices(&raw, None).unwrap_err();
        assert_eq!(err, VertexError::WrongArity { index: 0, len: 4 });
    }

    #[test]
    fn test_incomplete_transform_is_rejected() {
        let raw = vec![vec![0.0, 0.0, 0.0]];

        let missing = RawTransform {
            scale: Some(vec![1.0, 1.0, 1.0]),
            translate: None,
        };
        assert_eq!(
            resolve_vertices(&raw, Some(&missing)).unwrap_err(),
            VertexError::MissingTransformField("translate")
        );

        let short = raw_transform(&[1.0, 1.0], &[0.0, 0.0, 0.0]);
        assert_eq!(
            resolve_vertices(&raw, Some(&short)).unwrap_err(),
            VertexError::ShortTransformField { field: "scale", len: 2 }
        );
    }

    #[test]
    fn test_incomplete_transform_fails_even_without_vertices() {
        let empty = RawTransform::default();
        assert!(resolve_vertices(&[], Some(&empty)).is_err());
    }
}
