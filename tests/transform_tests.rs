//! Transform and hierarchy tests
//!
//! Tests for:
//! - Transform TRS operations and dirty checking
//! - Euler angle round-trip conversions
//! - look_at orientation and degenerate cases
//! - Hierarchical matrix propagation through `Scene::update_matrix_world`
//! - Camera view matrices following their node

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use parallax::scene::{Camera, Scene, Transform};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

// ============================================================================
// Transform Unit Tests
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::new();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert_eq!(t.scale, Vec3::ONE);
}

#[test]
fn transform_update_local_matrix_dirty_check() {
    let mut t = Transform::new();

    // First call always rebuilds
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.position = Vec3::new(1.0, 2.0, 3.0);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.rotation = Quat::from_rotation_y(FRAC_PI_2);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.scale = Vec3::splat(2.0);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());
}

#[test]
fn transform_local_matrix_reflects_trs() {
    let mut t = Transform::new();
    t.position = Vec3::new(10.0, 20.0, 30.0);
    t.scale = Vec3::splat(2.0);
    t.update_local_matrix();

    let mat = Mat4::from(*t.local_matrix());
    assert!(vec3_approx(mat.w_axis.truncate(), Vec3::new(10.0, 20.0, 30.0)));
    assert!(approx_eq(mat.x_axis.length(), 2.0));
}

#[test]
fn transform_euler_roundtrip() {
    let mut t = Transform::new();
    let (x, y, z) = (0.3, 0.7, 1.2);
    t.set_rotation_euler(x, y, z);

    let euler = t.rotation_euler();
    assert!(approx_eq(euler.x, x));
    assert!(approx_eq(euler.y, y));
    assert!(approx_eq(euler.z, z));
}

#[test]
fn transform_look_at_basic() {
    let mut t = Transform::new();
    t.look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::Y);

    t.update_local_matrix();
    let mat = Mat4::from(*t.local_matrix());
    let forward = -mat.z_axis.truncate().normalize();
    assert!(vec3_approx(forward, Vec3::new(0.0, 0.0, -1.0)));
}

#[test]
fn transform_look_at_from_offset_position() {
    let mut t = Transform::new();
    t.position = Vec3::new(0.01, 0.005, 3.0);
    let target = Vec3::new(0.2, -4.5, 0.0);
    t.look_at(target, Vec3::Y);

    let forward = t.rotation * Vec3::NEG_Z;
    assert!(vec3_approx(forward, (target - t.position).normalize()));
    // Roll stays level: the right vector has no vertical component
    assert!(approx_eq((t.rotation * Vec3::X).y, 0.0));
}

#[test]
fn transform_look_at_collinear_up_noop() {
    let mut t = Transform::new();
    let original_rotation = t.rotation;
    t.look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
    assert_eq!(t.rotation, original_rotation);
}

#[test]
fn transform_look_at_own_position_noop() {
    let mut t = Transform::new();
    t.position = Vec3::new(1.0, 2.0, 3.0);
    t.rotation = Quat::from_rotation_x(0.5);
    t.look_at(t.position, Vec3::Y);
    assert_eq!(t.rotation, Quat::from_rotation_x(0.5));
}

#[test]
fn transform_mark_dirty_forces_update() {
    let mut t = Transform::new();
    t.update_local_matrix();
    assert!(!t.update_local_matrix());

    t.mark_dirty();
    assert!(t.update_local_matrix());
}

// ============================================================================
// Hierarchy Propagation
// ============================================================================

fn create_chain(scene: &mut Scene, length: usize) -> Vec<parallax::scene::NodeHandle> {
    let mut handles = Vec::with_capacity(length);
    for i in 0..length {
        let handle = scene.create_node_with_name(&format!("Link_{i}"));
        if let Some(node) = scene.get_node_mut(handle) {
            node.transform.position = Vec3::X;
        }
        if let Some(&parent) = handles.last() {
            scene.attach(handle, parent);
        }
        handles.push(handle);
    }
    handles
}

#[test]
fn hierarchy_chain_world_positions() {
    let mut scene = Scene::new();
    let handles = create_chain(&mut scene, 5);
    scene.update_matrix_world();

    for (i, &h) in handles.iter().enumerate() {
        let world = scene.get_node(h).map(|n| n.transform.world_position());
        assert!(
            world.is_some_and(|p| vec3_approx(p, Vec3::new((i + 1) as f32, 0.0, 0.0))),
            "link {i}: {world:?}"
        );
    }
}

#[test]
fn hierarchy_with_rotation_and_scale() {
    let mut scene = Scene::new();
    let parent = scene.create_node_with_name("Parent");
    let child = scene.create_node_with_name("Child");
    scene.attach(child, parent);

    if let Some(node) = scene.get_node_mut(parent) {
        node.transform.rotation = Quat::from_rotation_y(FRAC_PI_2);
        node.transform.scale = Vec3::splat(2.0);
    }
    if let Some(node) = scene.get_node_mut(child) {
        node.transform.position = Vec3::X;
    }
    scene.update_matrix_world();

    // +X rotated a quarter turn about Y lands on -Z, then doubled
    let world = scene.get_node(child).map(|n| n.transform.world_position());
    assert!(world.is_some_and(|p| vec3_approx(p, Vec3::new(0.0, 0.0, -2.0))), "{world:?}");
}

#[test]
fn deeply_nested_hierarchy_no_stack_overflow() {
    let depth = 500;
    let mut scene = Scene::new();
    let handles = create_chain(&mut scene, depth);
    scene.update_matrix_world();

    let x = handles
        .last()
        .and_then(|&h| scene.get_node(h))
        .map_or(f32::NAN, |n| n.transform.world_position().x);
    assert!((x - depth as f32).abs() < 1e-3, "expected {depth}, got {x}");
}

// ============================================================================
// Camera Sync
// ============================================================================

#[test]
fn camera_view_matrix_follows_node() {
    let mut scene = Scene::new();
    let handle = scene.add_camera(Camera::new_perspective(39.6, 1.0, 0.1, 1000.0));
    scene.active_camera = Some(handle);
    if let Some(node) = scene.get_node_mut(handle) {
        node.transform.position = Vec3::new(0.0, 5.0, 10.0);
    }
    scene.update();

    let camera = scene.main_camera().expect("camera");
    // The view matrix maps the camera position to the origin
    let eye = camera.view_matrix().transform_point3(Vec3::new(0.0, 5.0, 10.0));
    assert!(vec3_approx(eye, Vec3::ZERO), "{eye}");
}
