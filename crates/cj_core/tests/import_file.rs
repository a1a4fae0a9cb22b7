//! File-level import tests.

use std::io::Write;

use cj_core::cityjson::{load_cityjson, GeometryMerge};
use cj_core::{import_cityjson, CommitMode, ImportErrorKind, ImportOptions, Scene, SceneHost};
use tempfile::NamedTempFile;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_fixture(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".city.json")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const CAMPUS: &str = r#"{
    "type": "CityJSON",
    "version": "1.1",
    "transform": {"scale": [0.01, 0.01, 0.01], "translate": [85000.0, 446000.0, -1.5]},
    "vertices": [
        [0, 0, 0], [1000, 0, 0], [1000, 1000, 0], [0, 1000, 0],
        [0, 0, 900], [1000, 0, 900], [1000, 1000, 900], [0, 1000, 900],
        [2000, 0, 0], [3000, 0, 0], [3000, 1000, 0], [2000, 1000, 0]
    ],
    "CityObjects": {
        "hall": {
            "type": "Building",
            "attributes": {"function": "education", "address": {"street": "Julianalaan", "number": 134}},
            "children": ["hall-wing-a", "hall-wing-b"]
        },
        "hall-wing-a": {
            "type": "BuildingPart",
            "parents": ["hall"],
            "geometry": [{
                "type": "Solid",
                "lod": "2.2",
                "boundaries": [[
                    [[0, 3, 2, 1]], [[4, 5, 6, 7]],
                    [[0, 1, 5, 4]], [[1, 2, 6, 5]],
                    [[2, 3, 7, 6]], [[3, 0, 4, 7]]
                ]]
            }]
        },
        "hall-wing-b": {
            "type": "BuildingPart",
            "geometry": [{
                "type": "MultiSolid",
                "boundaries": [
                    [[[[8, 9, 10]]]],
                    [[[[10, 11, 8]]]]
                ]
            }]
        },
        "square": {
            "type": "PlantCover",
            "geometry": [{
                "type": "CompositeSurface",
                "boundaries": [[[8, 9, 10, 11], [9, 10, 11]]]
            }]
        }
    }
}"#;

#[test]
fn test_load_campus_file() {
    init_logging();
    let file = write_fixture(CAMPUS);

    let (scene, summary) = load_cityjson(file.path(), ImportOptions::default()).unwrap();

    assert_eq!(summary.objects, 4);
    assert_eq!(summary.vertices, 12);
    // 6 cube faces + 2 MultiSolid faces + outer ring and hole of the square
    assert_eq!(summary.faces, 10);
    // hall-wing-a is declared from both sides but linked once
    assert_eq!(summary.hierarchy_edges, 2);
    assert_eq!(scene.face_count(), 10);

    assert_eq!(scene.parent_name("hall-wing-a"), Some("hall"));
    assert_eq!(scene.parent_name("hall-wing-b"), Some("hall"));
    assert_eq!(scene.parent_name("square"), None);

    let hall = scene.lookup_entity("hall").unwrap();
    assert_eq!(scene.children_of(hall).len(), 2);
    assert_eq!(scene.roots().len(), 2);

    let props = &scene.entity(hall).unwrap().properties;
    assert_eq!(props["attributes.address.street"], serde_json::json!("Julianalaan"));
    assert_eq!(props["attributes.address.number"], serde_json::json!(134));
}

#[test]
fn test_scene_name_comes_from_file_stem() {
    let file = write_fixture(CAMPUS);
    let (scene, _) = load_cityjson(file.path(), ImportOptions::default()).unwrap();

    let stem = file.path().file_stem().unwrap().to_str().unwrap();
    assert_eq!(scene.name, stem);
}

#[test]
fn test_world_bounds_use_real_coordinates() {
    let file = write_fixture(CAMPUS);
    let (scene, _) = load_cityjson(file.path(), ImportOptions::default()).unwrap();

    let bounds = scene.world_bounds();
    assert!((bounds.x.min - 85000.0).abs() < 1e-9);
    assert!((bounds.x.max - 85030.0).abs() < 1e-9);
    assert!((bounds.y.max - 446010.0).abs() < 1e-9);
    assert!((bounds.z.min - -1.5).abs() < 1e-9);
    assert!((bounds.z.max - 7.5).abs() < 1e-9);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut scene = Scene::new("missing");

    let err = import_cityjson(
        dir.path().join("nope.city.json"),
        &mut scene,
        ImportOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ImportErrorKind::Io);
}

#[test]
fn test_repeated_import_from_file_is_stable() {
    let file = write_fixture(CAMPUS);
    let options = ImportOptions::default()
        .with_geometry_merge(GeometryMerge::Union)
        .with_commit(CommitMode::Incremental);
    let mut scene = Scene::new("host");

    let first = import_cityjson(file.path(), &mut scene, options).unwrap();
    let topology: Vec<_> = scene.entities().iter().map(|e| e.mesh.faces.clone()).collect();
    let second = import_cityjson(file.path(), &mut scene, options).unwrap();

    assert_eq!(first, second);
    assert_eq!(scene.entity_count(), 4);
    let again: Vec<_> = scene.entities().iter().map(|e| e.mesh.faces.clone()).collect();
    assert_eq!(topology, again);
}

#[test]
fn test_options_file() {
    let file = write_fixture(r#"{"geometry_merge": "union", "commit": "incremental"}"#);
    let options = ImportOptions::from_json_file(file.path()).unwrap();

    assert_eq!(options.geometry_merge, GeometryMerge::Union);
    assert_eq!(options.commit, CommitMode::Incremental);
}
