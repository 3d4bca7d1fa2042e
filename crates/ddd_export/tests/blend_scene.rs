mod common;

use common::{BASE_HIDDEN, ObjectSpec, SceneFixture, legacy_scene};
use ddd_error::SceneErrorKind;
use ddd_export::{BlendScene, Error, ObjectSource, Rotation, SceneSelection};
use ddd_parser::BlendFile;
use glam::Vec3;

fn open(bytes: Vec<u8>, selection: SceneSelection) -> BlendScene {
    BlendScene::new(BlendFile::from_bytes(bytes).unwrap(), selection)
}

fn names(scene: &BlendScene) -> Vec<String> {
    scene.objects().unwrap().into_iter().map(|o| o.name).collect()
}

#[test]
fn objects_follow_collection_order() {
    let mut fx = SceneFixture::new();
    let a = fx.object(&ObjectSpec::new("A", [0.0; 3]));
    let b = fx.object(&ObjectSpec::new("B", [0.0; 3]));
    let c = fx.object(&ObjectSpec::new("C", [0.0; 3]));
    let d = fx.object(&ObjectSpec::new("D", [0.0; 3]));

    // master: [B] -> child1: [A, B] -> grandchild: [D]; child2: [C, A]
    let grandchild = fx.collection("Grand", &[d], &[]);
    let child1 = fx.collection("One", &[a, b], &[grandchild]);
    let child2 = fx.collection("Two", &[c, a], &[]);
    let master = fx.collection("Master", &[b], &[child1, child2]);
    fx.scene("Scene", master, &[("ViewLayer", vec![])]);

    let scene = open(fx.finish(), SceneSelection::default());
    assert_eq!(names(&scene), vec!["B", "A", "D", "C"]);
}

#[test]
fn hidden_flag_comes_from_view_layer_base() {
    let mut fx = SceneFixture::new();
    let a = fx.object(&ObjectSpec::new("A", [0.0; 3]));
    let b = fx.object(&ObjectSpec::new("B", [0.0; 3]));
    let c = fx.object(&ObjectSpec::new("C", [0.0; 3]));
    let master = fx.collection("Master", &[a, b, c], &[]);
    fx.scene(
        "Scene",
        master,
        &[
            ("ViewLayer", vec![(a, 0), (b, BASE_HIDDEN | 1)]),
            ("Render", vec![(a, BASE_HIDDEN), (b, 0)]),
        ],
    );
    let bytes = fx.finish();

    let default_layer = open(bytes.clone(), SceneSelection::default());
    let hidden: Vec<bool> = default_layer
        .objects()
        .unwrap()
        .iter()
        .map(|o| o.hidden)
        .collect();
    // C has no base and counts as visible
    assert_eq!(hidden, vec![false, true, false]);

    let render = open(bytes.clone(), SceneSelection::default().view_layer("Render"));
    let hidden: Vec<bool> = render.objects().unwrap().iter().map(|o| o.hidden).collect();
    assert_eq!(hidden, vec![true, false, false]);

    let missing = open(bytes, SceneSelection::default().view_layer("Nope"));
    let err = missing.objects().unwrap_err();
    assert!(matches!(
        err,
        Error::Scene {
            kind: SceneErrorKind::ViewLayerNotFound,
            ..
        }
    ));
}

#[test]
fn transforms_are_read_from_object_blocks() {
    let mut fx = SceneFixture::new();
    let euler = fx.object(
        &ObjectSpec::new("Euler", [1.0, 2.0, 3.0])
            .rot([0.1, 0.2, 0.3])
            .scale([2.0, 2.0, 2.0])
            .dloc([0.0, 0.0, 0.5]),
    );
    let quat = fx.object(&ObjectSpec::new("Quat", [0.0; 3]).quat([0.0, 0.0, 0.0, 1.0]));
    let master = fx.collection("Master", &[euler, quat], &[]);
    fx.scene("Scene", master, &[]);

    let scene = open(fx.finish(), SceneSelection::default());
    let objects = scene.objects().unwrap();

    let t = &objects[0].transform;
    assert_eq!(t.location, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(t.delta_location, Vec3::new(0.0, 0.0, 0.5));
    assert_eq!(t.scale, Vec3::splat(2.0));
    assert_eq!(t.rotation, Rotation::euler(0.1, 0.2, 0.3));
    assert_eq!(t.delta_rotation, Rotation::euler(0.0, 0.0, 0.0));

    let t = &objects[1].transform;
    assert_eq!(t.rotation, Rotation::Quaternion([0.0, 0.0, 0.0, 1.0]));
    assert_eq!(t.delta_rotation, Rotation::Quaternion([1.0, 0.0, 0.0, 0.0]));
}

#[test]
fn scene_selection() {
    let mut fx = SceneFixture::new();
    let a = fx.object(&ObjectSpec::new("A", [0.0; 3]));
    let b = fx.object(&ObjectSpec::new("B", [0.0; 3]));
    let first_master = fx.collection("M1", &[a], &[]);
    let second_master = fx.collection("M2", &[b], &[]);
    fx.scene("First", first_master, &[]);
    let second = fx.scene("Second", second_master, &[]);

    let without_glob = fx.finish();
    let scene = open(without_glob.clone(), SceneSelection::default());
    assert_eq!(scene.scene_name().unwrap(), "First");
    assert_eq!(scene.scene_names().unwrap(), vec!["First", "Second"]);
    assert_eq!(names(&scene), vec!["A"]);

    let by_name = open(without_glob.clone(), SceneSelection::default().scene("Second"));
    assert_eq!(names(&by_name), vec!["B"]);

    let unknown = open(without_glob, SceneSelection::default().scene("Third"));
    assert!(matches!(
        unknown.objects().unwrap_err(),
        Error::Scene {
            kind: SceneErrorKind::SceneNotFound,
            ..
        }
    ));

    fx.current_scene(second);
    let with_glob = open(fx.finish(), SceneSelection::default());
    assert_eq!(with_glob.scene_name().unwrap(), "Second");
}

#[test]
fn file_without_scene() {
    let mut fx = SceneFixture::new();
    fx.object(&ObjectSpec::new("Loose", [0.0; 3]));
    let scene = open(fx.finish(), SceneSelection::default());

    assert!(matches!(
        scene.objects().unwrap_err(),
        Error::Scene {
            kind: SceneErrorKind::NoScene,
            ..
        }
    ));
}

#[test]
fn legacy_base_list() {
    let bytes = legacy_scene(&[
        ("Cube", [1.0, 2.0, 3.0], false),
        ("Lamp", [0.0; 3], true),
    ]);
    let scene = open(bytes, SceneSelection::default());
    let objects = scene.objects().unwrap();

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].name, "Cube");
    assert_eq!(objects[0].location(), Vec3::new(1.0, 2.0, 3.0));
    assert!(!objects[0].hidden);
    assert!(objects[1].hidden);
}

#[test]
fn document_path_comes_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("level.blend");
    let mut fx = SceneFixture::new();
    let master = fx.collection("Master", &[], &[]);
    fx.scene("Scene", master, &[]);
    fx.write_to(&path).unwrap();

    let scene = BlendScene::open(&path, SceneSelection::default()).unwrap();
    assert_eq!(scene.document_path(), Some(path.as_path()));
    assert!(scene.objects().unwrap().is_empty());

    let in_memory = open(fx.finish(), SceneSelection::default());
    assert!(in_memory.document_path().is_none());
}
