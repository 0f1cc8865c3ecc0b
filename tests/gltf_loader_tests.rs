//! glTF Loader Tests
//!
//! Tests for:
//! - Parsing an in-memory glTF document with an embedded base64 buffer
//! - Node hierarchy, mesh attributes and attribute defaults
//! - Animation channels and clip naming
//! - Error paths: missing file, broken data URI, malformed JSON
//! - Instantiating the prefab and playing its clip in the showcase

use base64::Engine as _;
use glam::Vec3;

use parallax::animation::binding::TargetPath;
use parallax::animation::clip::TrackData;
use parallax::assets::{AssetServer, AssetSource, GltfLoader, Prefab};
use parallax::errors::ViewerError;
use parallax::scene::Scene;
use parallax::showcase::{Showcase, ShowcaseConfig};

const EPSILON: f32 = 1e-5;
const CLIP: &str = "Armature|mixamo.com|Layer0";

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Binary payload: triangle positions (36 B), u16 indices (6 B + 2 B pad),
/// keyframe times (8 B) and translations (24 B).
fn buffer_bytes() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(76);
    for v in [0.0_f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    for i in [0_u16, 1, 2] {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes.extend_from_slice(&[0, 0]);
    for t in [0.0_f32, 1.0] {
        bytes.extend_from_slice(&t.to_le_bytes());
    }
    for v in [0.0_f32, 0.0, 0.0, 0.0, 2.0, 0.0] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn gltf_document(buffer_uri: &str, root_name: &str) -> String {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "{root_name}", "children": [1], "translation": [0.0, 1.0, 0.0] }},
    {{ "name": "Body", "mesh": 0 }}
  ],
  "meshes": [{{
    "name": "BodyMesh",
    "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}]
  }}],
  "animations": [{{
    "name": "{CLIP}",
    "samplers": [{{ "input": 2, "output": 3, "interpolation": "LINEAR" }}],
    "channels": [{{ "sampler": 0, "target": {{ "node": 1, "path": "translation" }} }}]
  }}],
  "buffers": [{{ "byteLength": 76, "uri": "{buffer_uri}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }},
    {{ "buffer": 0, "byteOffset": 44, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 52, "byteLength": 24 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
       "min": [0.0], "max": [1.0] }},
    {{ "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }}
  ]
}}"#
    )
}

fn embedded_document() -> String {
    embedded_document_named("Car")
}

fn embedded_document_named(root_name: &str) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(buffer_bytes());
    gltf_document(&format!("data:application/octet-stream;base64,{payload}"), root_name)
}

fn load(document: &str) -> parallax::errors::Result<Prefab> {
    let source = AssetSource::File("memory/car.gltf".into());
    pollster::block_on(GltfLoader::load_from_bytes(&source, document.as_bytes()))
}

// ============================================================================
// Document Structure
// ============================================================================

#[test]
fn loader_builds_hierarchy() -> anyhow::Result<()> {
    let prefab = load(&embedded_document())?;

    assert_eq!(prefab.name, "car.gltf");
    assert_eq!(prefab.nodes.len(), 2);
    assert_eq!(prefab.root_indices, vec![0]);
    assert_eq!(prefab.nodes[0].name, "Car");
    assert_eq!(prefab.nodes[0].children, vec![1]);
    assert!(prefab.nodes[0].transform.position.abs_diff_eq(Vec3::Y, EPSILON));
    assert!(prefab.skins.is_empty());
    Ok(())
}

#[test]
fn loader_reads_mesh_with_default_normals() -> anyhow::Result<()> {
    let prefab = load(&embedded_document())?;

    let meshes = &prefab.nodes[1].meshes;
    assert_eq!(meshes.len(), 1);
    let geometry = &meshes[0].geometry;
    assert_eq!(geometry.vertices.len(), 3);
    assert_eq!(geometry.indices.as_deref(), Some(&[0_u32, 1, 2][..]));
    assert_eq!(geometry.vertices[1].position, [1.0, 0.0, 0.0]);
    assert!(geometry.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    assert!(geometry.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
    assert!(!geometry.skinned);
    Ok(())
}

#[test]
fn loader_reads_translation_channel() -> anyhow::Result<()> {
    let prefab = load(&embedded_document())?;

    assert_eq!(prefab.animation_names(), vec![CLIP.to_string()]);
    let clip = &prefab.animations[0];
    assert!(approx(clip.duration, 1.0));
    assert_eq!(clip.tracks.len(), 1);

    let track = &clip.tracks[0];
    assert_eq!(track.meta.node_name, "Body");
    assert_eq!(track.meta.target, TargetPath::Translation);
    match &track.data {
        TrackData::Vector3(t) => {
            let mid = t.sample(0.5).unwrap_or(Vec3::NAN);
            assert!(mid.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), EPSILON), "got {mid}");
        }
        other => panic!("unexpected track data: {other:?}"),
    }
    Ok(())
}

#[test]
fn duplicate_node_names_are_made_unique() -> anyhow::Result<()> {
    // Root and animated child share the name "Body"
    let prefab = load(&embedded_document_named("Body"))?;

    assert_eq!(prefab.nodes[0].name, "Body");
    assert_eq!(prefab.nodes[1].name, "Body_1");
    assert_eq!(prefab.animations[0].tracks[0].meta.node_name, "Body_1");
    Ok(())
}

#[test]
fn duplicate_names_animate_the_targeted_node() -> anyhow::Result<()> {
    let prefab = load(&embedded_document_named("Body"))?;
    let mut scene = Scene::new();
    let mut showcase = Showcase::new(ShowcaseConfig::default(), &mut scene);

    showcase.on_model_loaded(&mut scene, &prefab)?;
    let root = showcase.model().map(|m| m.root).expect("model root");
    let child = scene.find_node_by_name(root, "Body_1").expect("animated node");
    let original = scene.find_node_by_name(root, "Body").expect("root-named node");

    let input = parallax::app::Input::new();
    for _ in 0..30 {
        showcase.tick(&mut scene, &input, 1.0 / 60.0);
    }

    let y = scene.get_node(child).map_or(f32::NAN, |n| n.transform.position.y);
    assert!((y - 1.0).abs() < 1e-3, "y = {y}");
    // The first "Body" keeps its authored translation
    let root_y = scene.get_node(original).map_or(f32::NAN, |n| n.transform.position.y);
    assert!(approx(root_y, 1.0), "root y = {root_y}");
    Ok(())
}

// ============================================================================
// Error Paths
// ============================================================================

#[test]
fn missing_file_is_not_found() {
    let assets = AssetServer::new();
    let result = assets.load_gltf_blocking("definitely/missing/car.glb");
    assert!(matches!(result, Err(ViewerError::AssetNotFound(_))));
}

#[test]
fn broken_data_uri_is_rejected() {
    let result = load(&gltf_document("data:application/octet-stream;base64,@@@", "Car"));
    assert!(matches!(result, Err(ViewerError::Base64(_))));
}

#[test]
fn malformed_json_is_a_gltf_error() {
    let result = load("{ \"asset\": ");
    assert!(matches!(result, Err(ViewerError::Gltf(_))));
}

#[test]
fn pending_load_delivers_error_once() {
    let assets = AssetServer::new();
    let mut pending = assets.load_gltf("definitely/missing/car.glb");

    let mut result = None;
    for _ in 0..500 {
        if let Some(r) = pending.poll() {
            result = Some(r);
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    assert!(matches!(result, Some(Err(ViewerError::AssetNotFound(_)))));
    assert!(pending.poll().is_none());
}

// ============================================================================
// Showcase Integration
// ============================================================================

#[test]
fn loaded_prefab_plays_in_showcase() -> anyhow::Result<()> {
    let prefab = load(&embedded_document())?;
    let mut scene = Scene::new();
    let mut showcase = Showcase::new(ShowcaseConfig::default(), &mut scene);

    showcase.on_model_loaded(&mut scene, &prefab)?;
    let root = showcase.model().map(|m| m.root).expect("model root");
    let body = scene.find_node_by_name(root, "Body").expect("body node");

    let input = parallax::app::Input::new();
    for _ in 0..30 {
        showcase.tick(&mut scene, &input, 1.0 / 60.0);
    }
    scene.update();

    let y = scene.get_node(body).map_or(f32::NAN, |n| n.transform.position.y);
    assert!((y - 1.0).abs() < 1e-3, "y = {y}");
    assert_eq!(scene.collect_draws().len(), 1);
    Ok(())
}
