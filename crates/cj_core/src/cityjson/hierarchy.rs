//! Parent/child resolution.
//!
//! Runs after every object exists as a scene entity. Per object:
//! - `children` present: the object is a parent and each listed child is
//!   linked under it; the object's own `parents` is ignored.
//! - otherwise `parents` present: the object is linked under the first entry.
//! - neither: the object stays a root.
//!
//! A (parent, child) pair declared from both sides yields a single edge.
//! Edges are applied in document order, so a later edge for the same child
//! replaces an earlier one. Links the host refuses, such as one closing a
//! parent loop, are not counted.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use super::types::CityObject;
use crate::scene::SceneHost;

/// Which declaration an edge came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Children,
    Parents,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Children => f.write_str("child"),
            Relation::Parents => f.write_str("parent"),
        }
    }
}

/// A reference to an identifier that is not in `CityObjects`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("object '{object}' declares {relation} '{target}' which does not exist")]
pub struct DanglingReference {
    /// Object carrying the declaration
    pub object: String,
    pub relation: Relation,
    /// The missing identifier
    pub target: String,
}

/// A resolved parent -> child link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyEdge {
    pub parent: String,
    pub child: String,
    /// Declaration the edge came from
    pub relation: Relation,
}

/// Derive hierarchy edges from the objects' `children` / `parents` lists.
pub fn resolve_hierarchy(
    objects: &[(String, CityObject)],
) -> Result<Vec<HierarchyEdge>, DanglingReference> {
    let known: HashSet<&str> = objects.iter().map(|(id, _)| id.as_str()).collect();
    let check = |object: &str, relation: Relation, target: &str| {
        if known.contains(target) {
            Ok(())
        } else {
            Err(DanglingReference {
                object: object.to_string(),
                relation,
                target: target.to_string(),
            })
        }
    };

    let mut edges = Vec::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for (id, object) in objects {
        if let Some(children) = &object.children {
            if object.parents.is_some() {
                log::warn!("'{}' declares both children and parents; parents ignored", id);
            }
            for child in children {
                check(id, Relation::Children, child)?;
                push_edge(&mut edges, &mut seen, id, child, Relation::Children);
            }
        } else if let Some(parents) = &object.parents {
            let Some(parent) = parents.first() else {
                continue;
            };
            if parents.len() > 1 {
                log::debug!(
                    "'{}' declares {} parents; only '{}' is used",
                    id,
                    parents.len(),
                    parent
                );
            }
            check(id, Relation::Parents, parent)?;
            push_edge(&mut edges, &mut seen, parent, id, Relation::Parents);
        }
    }

    Ok(edges)
}

fn push_edge<'a>(
    edges: &mut Vec<HierarchyEdge>,
    seen: &mut HashSet<(&'a str, &'a str)>,
    parent: &'a str,
    child: &'a str,
    relation: Relation,
) {
    if !seen.insert((parent, child)) {
        log::debug!("Link '{}' -> '{}' already declared", parent, child);
        return;
    }
    edges.push(HierarchyEdge {
        parent: parent.to_string(),
        child: child.to_string(),
        relation,
    });
}

/// Link entities in `host` along `edges`. Returns the number of links the
/// host accepted.
pub fn apply_hierarchy(
    edges: &[HierarchyEdge],
    host: &mut dyn SceneHost,
) -> Result<usize, DanglingReference> {
    let mut linked = 0;
    for edge in edges {
        let lookup = |name: &str, relation: Relation| {
            host.lookup_entity(name).ok_or_else(|| DanglingReference {
                object: match edge.relation {
                    Relation::Children => edge.parent.clone(),
                    Relation::Parents => edge.child.clone(),
                },
                relation,
                target: name.to_string(),
            })
        };
        let parent = lookup(&edge.parent, Relation::Parents)?;
        let child = lookup(&edge.child, Relation::Children)?;
        if host.set_parent(child, parent) {
            linked += 1;
        }
    }

    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use cj_math::DVec3;

    use crate::scene::Scene;

    fn object(children: Option<&[&str]>, parents: Option<&[&str]>) -> CityObject {
        let to_vec = |ids: &[&str]| -> Vec<String> { ids.iter().map(|s| s.to_string()).collect() };
        CityObject {
            children: children.map(to_vec),
            parents: parents.map(to_vec),
            ..Default::default()
        }
    }

    fn scene_for(objects: &[(String, CityObject)]) -> Scene {
        let pool: Arc<[DVec3]> = Arc::from(Vec::new());
        let mut scene = Scene::new("test");
        for (id, _) in objects {
            scene.create_mesh_entity(id, Arc::clone(&pool), Vec::new());
        }
        scene
    }

    #[test]
    fn test_children_declaration() {
        let objects = vec![
            ("B".to_string(), object(Some(&["P1", "P2"]), None)),
            ("P1".to_string(), object(None, None)),
            ("P2".to_string(), object(None, None)),
        ];

        let edges = resolve_hierarchy(&objects).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].parent, "B");
        assert_eq!(edges[0].child, "P1");
        assert_eq!(edges[1].child, "P2");
    }

    #[test]
    fn test_mutual_declaration_links_once_through_children() {
        let objects = vec![
            ("P".to_string(), object(Some(&["C"]), None)),
            ("C".to_string(), object(None, Some(&["P"]))),
        ];

        let edges = resolve_hierarchy(&objects).unwrap();
        assert_eq!(
            edges,
            vec![HierarchyEdge {
                parent: "P".into(),
                child: "C".into(),
                relation: Relation::Children,
            }]
        );

        let mut scene = scene_for(&objects);
        assert_eq!(apply_hierarchy(&edges, &mut scene).unwrap(), 1);
        assert_eq!(scene.parent_name("C"), Some("P"));
        assert_eq!(scene.parent_name("P"), None);
    }

    #[test]
    fn test_children_take_precedence_over_parents() {
        let objects = vec![
            ("A".to_string(), object(None, None)),
            ("M".to_string(), object(Some(&["C"]), Some(&["A"]))),
            ("C".to_string(), object(None, None)),
        ];

        let edges = resolve_hierarchy(&objects).unwrap();
        assert_eq!(
            edges,
            vec![HierarchyEdge {
                parent: "M".into(),
                child: "C".into(),
                relation: Relation::Children,
            }]
        );
    }

    #[test]
    fn test_only_first_parent_is_used() {
        let objects = vec![
            ("A".to_string(), object(None, None)),
            ("B".to_string(), object(None, None)),
            ("C".to_string(), object(None, Some(&["B", "A"]))),
        ];

        let edges = resolve_hierarchy(&objects).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].parent, "B");
    }

    #[test]
    fn test_second_parent_is_not_checked() {
        let objects = vec![
            ("A".to_string(), object(None, None)),
            ("C".to_string(), object(None, Some(&["A", "ghost"]))),
        ];
        assert!(resolve_hierarchy(&objects).is_ok());
    }

    #[test]
    fn test_empty_lists() {
        let objects = vec![
            ("A".to_string(), object(Some(&[]), Some(&["B"]))),
            ("B".to_string(), object(None, Some(&[]))),
        ];
        assert!(resolve_hierarchy(&objects).unwrap().is_empty());
    }

    #[test]
    fn test_dangling_child() {
        let objects = vec![("B".to_string(), object(Some(&["missing"]), None))];

        let err = resolve_hierarchy(&objects).unwrap_err();
        assert_eq!(err.object, "B");
        assert_eq!(err.relation, Relation::Children);
        assert_eq!(err.target, "missing");
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn test_dangling_parent() {
        let objects = vec![("C".to_string(), object(None, Some(&["nowhere"])))];

        let err = resolve_hierarchy(&objects).unwrap_err();
        assert_eq!(err.relation, Relation::Parents);
        assert_eq!(err.target, "nowhere");
    }

    #[test]
    fn test_later_edge_replaces_earlier_parent() {
        let objects = vec![
            ("A".to_string(), object(Some(&["C"]), None)),
            ("B".to_string(), object(Some(&["C"]), None)),
            ("C".to_string(), object(None, None)),
        ];

        let edges = resolve_hierarchy(&objects).unwrap();
        let mut scene = scene_for(&objects);
        assert_eq!(apply_hierarchy(&edges, &mut scene).unwrap(), 2);
        assert_eq!(scene.parent_name("C"), Some("B"));
    }

    #[test]
    fn test_repeated_child_is_linked_once() {
        let objects = vec![
            ("P".to_string(), object(Some(&["C", "C"]), None)),
            ("C".to_string(), object(None, None)),
        ];
        assert_eq!(resolve_hierarchy(&objects).unwrap().len(), 1);
    }

    #[test]
    fn test_parent_loop_counts_only_accepted_links() {
        let objects = vec![
            ("A".to_string(), object(Some(&["B"]), None)),
            ("B".to_string(), object(Some(&["A"]), None)),
        ];

        let edges = resolve_hierarchy(&objects).unwrap();
        assert_eq!(edges.len(), 2);

        let mut scene = scene_for(&objects);
        assert_eq!(apply_hierarchy(&edges, &mut scene).unwrap(), 1);
        assert_eq!(scene.parent_name("B"), Some("A"));
        assert_eq!(scene.parent_name("A"), None);
    }

    #[test]
    fn test_apply_reports_missing_entities() {
        let edges = vec![HierarchyEdge {
            parent: "P".into(),
            child: "C".into(),
            relation: Relation::Children,
        }];
        let mut scene = Scene::new("empty");

        let err = apply_hierarchy(&edges, &mut scene).unwrap_err();
        assert_eq!(err.object, "P");
        assert_eq!(err.target, "P");
    }
}
