//! Scene Graph Tests
//!
//! Tests for:
//! - Node creation, naming and removal
//! - Hierarchy management (attach, re-parent, subtree lookup)
//! - Camera and light components
//! - World matrix propagation and visibility-aware draw collection
//! - Fog falloff

use std::sync::Arc;

use glam::{Vec3, Vec4};

use parallax::resources::{Geometry, Material, Mesh, Vertex};
use parallax::scene::{Camera, Fog, Light, LightKind, Scene};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn triangle_mesh(name: &str) -> Mesh {
    let vertices = vec![
        Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
        Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
        Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
    ];
    Mesh::new(
        name,
        Arc::new(Geometry::new(vertices, Some(vec![0, 1, 2]))),
        Arc::new(Material::new_standard(Vec4::ONE)),
    )
}

// ============================================================================
// Node Management
// ============================================================================

#[test]
fn scene_create_node_with_name() {
    let mut scene = Scene::new();
    let handle = scene.create_node_with_name("Body");

    assert_eq!(scene.name(handle), Some("Body"));
    assert!(scene.root_nodes.contains(&handle));
}

#[test]
fn scene_remove_node_removes_subtree() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Car");
    let child = scene.create_node_with_name("Door");
    let grandchild = scene.create_node_with_name("Handle");
    scene.attach(child, root);
    scene.attach(grandchild, child);

    scene.remove_node(root);

    assert!(scene.get_node(root).is_none());
    assert!(scene.get_node(child).is_none());
    assert!(scene.get_node(grandchild).is_none());
    assert!(scene.name(grandchild).is_none());
    assert!(scene.root_nodes.is_empty());
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn scene_attach_sets_parent_child() {
    let mut scene = Scene::new();
    let parent = scene.create_node_with_name("Parent");
    let child = scene.create_node_with_name("Child");

    scene.attach(child, parent);

    assert_eq!(scene.get_node(child).and_then(|n| n.parent()), Some(parent));
    assert_eq!(scene.get_node(parent).map(|n| n.children().to_vec()), Some(vec![child]));
    assert!(!scene.root_nodes.contains(&child));
}

#[test]
fn scene_attach_removes_from_old_parent() {
    let mut scene = Scene::new();
    let a = scene.create_node_with_name("A");
    let b = scene.create_node_with_name("B");
    let child = scene.create_node_with_name("Child");

    scene.attach(child, a);
    scene.attach(child, b);

    assert!(scene.get_node(a).is_some_and(|n| n.children().is_empty()));
    assert_eq!(scene.get_node(child).and_then(|n| n.parent()), Some(b));
}

#[test]
fn scene_attach_to_self_is_noop() {
    let mut scene = Scene::new();
    let node = scene.create_node_with_name("Loner");

    scene.attach(node, node);

    assert!(scene.get_node(node).is_some_and(|n| n.parent().is_none()));
    assert!(scene.root_nodes.contains(&node));
}

#[test]
fn scene_find_node_by_name_searches_subtree_only() {
    let mut scene = Scene::new();
    let car = scene.create_node_with_name("Car");
    let wheel = scene.create_node_with_name("Wheel");
    scene.attach(wheel, car);
    let other = scene.create_node_with_name("Truck");
    let other_wheel = scene.create_node_with_name("Wheel");
    scene.attach(other_wheel, other);

    assert_eq!(scene.find_node_by_name(car, "Wheel"), Some(wheel));
    assert_eq!(scene.find_node_by_name(car, "Car"), Some(car));
    assert_eq!(scene.find_node_by_name(car, "Truck"), None);
}

// ============================================================================
// Components
// ============================================================================

#[test]
fn scene_active_camera_bundle() {
    let mut scene = Scene::new();
    assert!(scene.query_main_camera_bundle().is_none());

    let camera = scene.add_camera(Camera::new_perspective(39.6, 1.5, 0.1, 1000.0));
    scene.active_camera = Some(camera);

    let (transform, cam) = scene.query_main_camera_bundle().expect("camera bundle");
    transform.position = Vec3::new(0.0, 0.0, 3.0);
    assert!(approx(cam.fov, 39.6_f32.to_radians()));
    assert!(scene.main_camera().is_some());
}

#[test]
fn scene_collect_lights_resolves_positions() {
    let mut scene = Scene::new();
    let ambient = scene.add_light(Light::new_ambient(Vec3::ONE, 5.0));
    let key = scene.add_light(Light::new_directional(Vec3::ONE, 12.0).with_cast_shadows(true));
    if let Some(node) = scene.get_node_mut(key) {
        node.transform.position = Vec3::new(0.0, 6.0, 6.0);
    }
    scene.update();

    let lights = scene.collect_lights();
    assert_eq!(lights.len(), 2);

    let key_item = lights
        .iter()
        .find(|l| matches!(l.light.kind, LightKind::Directional(_)))
        .expect("directional light");
    assert!(key_item.light.cast_shadows);
    assert!(key_item.world_position.abs_diff_eq(Vec3::new(0.0, 6.0, 6.0), EPSILON));

    if let Some(node) = scene.get_node_mut(ambient) {
        node.visible = false;
    }
    assert_eq!(scene.collect_lights().len(), 1);
}

// ============================================================================
// Transform Propagation
// ============================================================================

#[test]
fn scene_world_matrix_composes_parent_scale_and_translation() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Car");
    let child = scene.create_node_with_name("Door");
    scene.attach(child, root);

    if let Some(node) = scene.get_node_mut(root) {
        node.transform.position = Vec3::new(0.2, -4.5, 0.0);
        node.transform.scale = Vec3::splat(0.06);
    }
    if let Some(node) = scene.get_node_mut(child) {
        node.transform.position = Vec3::new(10.0, 0.0, 0.0);
    }
    scene.update_matrix_world();

    let world = scene
        .get_node(child)
        .map(|n| n.transform.world_position())
        .unwrap_or_default();
    assert!(world.abs_diff_eq(Vec3::new(0.8, -4.5, 0.0), EPSILON), "got {world}");
}

#[test]
fn scene_parent_change_propagates_next_update() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Car");
    let child = scene.create_node_with_name("Door");
    scene.attach(child, root);
    scene.update_matrix_world();

    if let Some(node) = scene.get_node_mut(root) {
        node.transform.position.y = 2.0;
    }
    scene.update_matrix_world();

    let y = scene.get_node(child).map_or(0.0, |n| n.transform.world_position().y);
    assert!(approx(y, 2.0));
}

// ============================================================================
// Draw Collection
// ============================================================================

#[test]
fn scene_collect_draws_skips_hidden_subtrees() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Car");
    let body = scene.create_node_with_name("Body");
    let wheel = scene.create_node_with_name("Wheel");
    scene.attach(body, root);
    scene.attach(wheel, body);
    scene.set_mesh(body, triangle_mesh("body"));
    scene.set_mesh(wheel, triangle_mesh("wheel"));
    scene.update();

    assert_eq!(scene.collect_draws().len(), 2);

    if let Some(node) = scene.get_node_mut(root) {
        node.visible = false;
    }
    assert!(scene.collect_draws().is_empty());
}

// ============================================================================
// Fog
// ============================================================================

#[test]
fn fog_factor_is_smooth_between_near_and_far() {
    let fog = Fog::new(Vec3::ZERO, 1.5, 5.0);

    assert_eq!(fog.factor(0.0), 0.0);
    assert_eq!(fog.factor(1.5), 0.0);
    assert!(approx(fog.factor(3.25), 0.5));
    assert_eq!(fog.factor(5.0), 1.0);
    assert_eq!(fog.factor(100.0), 1.0);
}
