//! Car Showcase Tests
//!
//! Tests for:
//! - Scene setup from `ShowcaseConfig` (background, fog, camera, lights)
//! - Pointer normalisation and the damped parallax camera
//! - Resize handling through the engine
//! - Model delivery: missing file, missing clip, successful playback
//! - Right click disabling the orbit controls
//! - Debug panel controls editing the model root

use std::sync::Arc;

use glam::{Vec2, Vec3};

use parallax::animation::binding::TargetPath;
use parallax::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use parallax::animation::tracks::{InterpolationMode, KeyframeTrack};
use parallax::app::input::{Input, MouseButton};
use parallax::assets::{PendingLoad, Prefab, PrefabNode};
use parallax::engine::Engine;
use parallax::errors::ViewerError;
use parallax::resources::color::hex_to_linear;
use parallax::scene::{LightKind, Scene};
use parallax::showcase::{ControlValue, Showcase, ShowcaseConfig};

const EPSILON: f32 = 1e-5;
const CLIP: &str = "Armature|mixamo.com|Layer0";

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn camera_position(scene: &Scene, showcase: &Showcase) -> Vec3 {
    scene
        .get_node(showcase.camera())
        .map(|n| n.transform.position)
        .unwrap_or(Vec3::NAN)
}

/// Two-node car whose wheel moves up by one unit over the clip.
fn car_prefab(clip_name: &str) -> Prefab {
    let mut prefab = Prefab::new("Portmodelcyber");

    let mut body = PrefabNode::new("Body");
    body.children.push(1);
    prefab.nodes.push(body);
    prefab.nodes.push(PrefabNode::new("Wheel"));
    prefab.root_indices.push(0);

    let track = Track {
        meta: TrackMeta {
            node_name: "Wheel".into(),
            target: TargetPath::Translation,
        },
        data: TrackData::Vector3(KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)],
            InterpolationMode::Linear,
        )),
    };
    prefab
        .animations
        .push(Arc::new(AnimationClip::new(clip_name.to_string(), vec![track])));
    prefab
}

fn headless() -> (Engine, Showcase) {
    let mut engine = Engine::default();
    let showcase = Showcase::new(ShowcaseConfig::default(), &mut engine.scene);
    engine.resize(1000, 800, 1.0);
    (engine, showcase)
}

// ============================================================================
// Scene Setup
// ============================================================================

#[test]
fn setup_applies_background_fog_and_camera() {
    let (engine, showcase) = headless();
    let scene = &engine.scene;

    assert_eq!(scene.background, hex_to_linear(0x030405));
    let fog = scene.fog.as_ref().expect("fog configured");
    assert!(approx(fog.near, 1.5));
    assert!(approx(fog.far, 5.0));
    assert_eq!(fog.color, Vec3::ZERO);

    assert_eq!(scene.active_camera, Some(showcase.camera()));
    assert_eq!(camera_position(scene, &showcase), Vec3::new(0.0, 0.0, 3.0));
    let camera = scene.main_camera().expect("camera");
    assert!(approx(camera.fov, 39.6_f32.to_radians()));
    assert!(approx(camera.aspect, 1.25));
}

#[test]
fn setup_adds_ambient_and_two_shadow_casting_directionals() {
    let (engine, showcase) = headless();
    let scene = &engine.scene;
    assert_eq!(showcase.lights().len(), 3);

    let mut ambient = 0;
    let mut directional = Vec::new();
    for &handle in showcase.lights() {
        let light = &scene.lights[handle];
        match light.kind {
            LightKind::Ambient => {
                ambient += 1;
                assert!(approx(light.intensity, 5.0));
            }
            LightKind::Directional(_) => {
                assert!(light.cast_shadows);
                directional.push((scene.nodes[handle].transform.position, light.intensity));
            }
        }
    }

    assert_eq!(ambient, 1);
    assert_eq!(
        directional,
        vec![(Vec3::new(0.0, 6.0, 6.0), 12.0), (Vec3::new(-5.0, 2.0, -5.0), 10.0)]
    );
}

#[test]
fn controls_start_with_rotate_and_zoom_disabled() {
    let (_, showcase) = headless();
    let controls = showcase.controls();

    assert!(!controls.enable_rotate);
    assert!(!controls.enable_zoom);
    assert!(controls.enable_pan);
    assert!(!controls.enable_damping);
    assert!(approx(controls.damping_factor, 0.25));
}

// ============================================================================
// Pointer & Parallax
// ============================================================================

#[test]
fn pointer_normalises_from_viewport_centre() {
    let (_, mut showcase) = headless();
    showcase.on_pointer_move(Vec2::new(600.0, 450.0), Vec2::new(1000.0, 800.0), 1.0);

    let offset = showcase.pointer().offset();
    assert!(approx(offset.x, 0.1));
    assert!(approx(offset.y, 0.05));
}

#[test]
fn one_frame_eases_camera_five_percent_toward_target() {
    let (mut engine, mut showcase) = headless();
    showcase.on_pointer_move(Vec2::new(600.0, 450.0), Vec2::new(1000.0, 800.0), 1.0);

    showcase.tick(&mut engine.scene, &engine.input, 1.0 / 60.0);

    let p = camera_position(&engine.scene, &showcase);
    assert!(approx(p.x, 0.01), "x = {}", p.x);
    assert!(approx(p.y, 0.005), "y = {}", p.y);
    assert_eq!(p.z, 3.0);
}

#[test]
fn camera_is_unchanged_without_pointer_movement() {
    let (mut engine, mut showcase) = headless();

    for _ in 0..10 {
        showcase.tick(&mut engine.scene, &engine.input, 1.0 / 60.0);
    }

    assert_eq!(camera_position(&engine.scene, &showcase), Vec3::new(0.0, 0.0, 3.0));
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn resize_updates_aspect_and_renderer_size() {
    let (mut engine, mut showcase) = headless();
    showcase
        .on_model_loaded(&mut engine.scene, &car_prefab(CLIP))
        .expect("clip present");
    let root = showcase.model().map(|m| m.root).expect("model");
    let before = engine.scene.nodes[root].transform.clone();

    engine.resize(1920, 1080, 1.0);

    let camera = engine.scene.main_camera().expect("camera");
    assert!(approx(camera.aspect, 16.0 / 9.0));
    assert_eq!(engine.renderer.size(), (1920, 1080));
    assert_eq!(camera_position(&engine.scene, &showcase), Vec3::new(0.0, 0.0, 3.0));

    let after = &engine.scene.nodes[root].transform;
    assert_eq!(after.position, before.position);
    assert_eq!(after.rotation, before.rotation);
    assert_eq!(after.scale, before.scale);
}

// ============================================================================
// Model Delivery
// ============================================================================

#[test]
fn missing_file_keeps_scene_alive_without_model() {
    let (mut engine, mut showcase) = headless();
    let result = engine.assets.load_gltf_blocking("does/not/exist.glb");
    assert!(result.is_err());

    showcase.set_pending_load(PendingLoad::ready(result));
    assert!(!showcase.poll_load(&mut engine.scene));

    assert!(!showcase.is_loading());
    assert!(showcase.model().is_none());
    assert!(showcase.mixer().is_none());
    assert!(showcase.panel().folders.is_empty());

    // The frame loop still runs
    showcase.on_pointer_move(Vec2::new(600.0, 450.0), Vec2::new(1000.0, 800.0), 1.0);
    showcase.tick(&mut engine.scene, &engine.input, 1.0 / 60.0);
    assert!(approx(camera_position(&engine.scene, &showcase).x, 0.01));
}

#[test]
fn missing_clip_keeps_model_and_panel() {
    let (mut engine, mut showcase) = headless();
    let prefab = car_prefab("Idle");

    let err = showcase
        .on_model_loaded(&mut engine.scene, &prefab)
        .expect_err("clip should be missing");

    assert!(err.to_string().contains(CLIP), "message: {err}");
    match err {
        ViewerError::ClipNotFound { name, available } => {
            assert_eq!(name, CLIP);
            assert_eq!(available, vec!["Idle".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(showcase.model().is_some());
    assert!(showcase.mixer().is_none());
    assert_eq!(showcase.panel().control_count(), 10);
}

#[test]
fn loaded_model_is_placed_and_clip_loops() {
    let (mut engine, mut showcase) = headless();
    showcase.set_pending_load(PendingLoad::ready(Ok(car_prefab(CLIP))));

    assert!(showcase.poll_load(&mut engine.scene));
    assert!(!showcase.poll_load(&mut engine.scene));

    let model = *showcase.model().expect("model");
    let root = engine.scene.get_node(model.root).expect("root node");
    assert_eq!(root.transform.position, Vec3::new(0.2, -4.5, 0.0));
    assert_eq!(root.transform.scale, Vec3::splat(0.06));

    let folder = showcase.panel().folder("Car Model").expect("folder");
    assert!(folder.open);
    assert_eq!(folder.controls.len(), 10);

    for _ in 0..150 {
        showcase.tick(&mut engine.scene, &engine.input, 1.0 / 60.0);
    }
    let action = showcase
        .mixer()
        .and_then(|m| m.action(CLIP))
        .expect("action");
    assert!(action.is_running());
    assert!((action.time - 0.5).abs() < 1e-3, "time = {}", action.time);
}

#[test]
fn camera_aims_at_model_once_loaded() {
    let (mut engine, mut showcase) = headless();
    showcase
        .on_model_loaded(&mut engine.scene, &car_prefab(CLIP))
        .expect("clip present");

    showcase.tick(&mut engine.scene, &engine.input, 1.0 / 60.0);

    let camera = &engine.scene.nodes[showcase.camera()].transform;
    let forward = camera.rotation * Vec3::NEG_Z;
    let expected = (Vec3::new(0.2, -4.5, 0.0) - camera.position).normalize();
    assert!(forward.abs_diff_eq(expected, 1e-4), "{forward} vs {expected}");
}

// ============================================================================
// Orbit Controls
// ============================================================================

#[test]
fn right_click_disables_controls_idempotently() {
    let (_, mut showcase) = headless();

    showcase.on_mouse_down(MouseButton::Left);
    assert!(showcase.controls().is_interactive());

    showcase.on_mouse_down(MouseButton::Right);
    assert!(!showcase.controls().is_interactive());

    showcase.on_mouse_down(MouseButton::Right);
    assert!(!showcase.controls().is_interactive());
}

#[test]
fn disabled_controls_ignore_drag_and_scroll() {
    let (mut engine, mut showcase) = headless();
    showcase.on_mouse_down(MouseButton::Right);

    let mut input = Input::new();
    input.inject_resize(1000, 800);
    input.inject_mouse_button(MouseButton::Right, parallax::app::ButtonState::Pressed);
    input.inject_mouse_position(500.0, 400.0);
    input.inject_mouse_position(700.0, 300.0);
    input.inject_scroll(0.0, 5.0);

    showcase.tick(&mut engine.scene, &input, 1.0 / 60.0);

    let p = camera_position(&engine.scene, &showcase);
    assert!(approx(p.z, 3.0));
    assert!(approx(p.x, 0.0) && approx(p.y, 0.0));
}

// ============================================================================
// Debug Panel
// ============================================================================

#[test]
fn panel_controls_edit_model_root() {
    let (mut engine, mut showcase) = headless();
    showcase
        .on_model_loaded(&mut engine.scene, &car_prefab(CLIP))
        .expect("clip present");
    let mut model = *showcase.model().expect("model");

    let controls = showcase.panel().folders[0].controls.clone();
    let node = engine.scene.get_node_mut(model.root).expect("root");

    let by_label = |label: &str| {
        controls
            .iter()
            .find(|c| c.label == label)
            .cloned()
            .expect("control")
    };

    by_label("Position X").write(node, &mut model.rotation_euler, ControlValue::Number(-3.0));
    by_label("Scale Y").write(node, &mut model.rotation_euler, ControlValue::Number(20.0));
    by_label("Visibility").write(node, &mut model.rotation_euler, ControlValue::Flag(false));

    assert!(approx(node.transform.position.x, -3.0));
    assert!(approx(node.transform.scale.y, 5.0));
    assert!(!node.visible);

    engine.scene.update();
    assert!(engine.scene.collect_draws().is_empty());
}

#[test]
fn drawing_panel_leaves_loaded_transform_untouched() {
    let (mut engine, mut showcase) = headless();
    showcase
        .on_model_loaded(&mut engine.scene, &car_prefab(CLIP))
        .expect("clip present");
    let root = showcase.model().map(|m| m.root).expect("model");

    // Scale 0.06 sits below the 0.1 slider minimum
    let ctx = egui::Context::default();
    for _ in 0..3 {
        ctx.begin_pass(egui::RawInput::default());
        let changed = showcase.show_panel(&ctx, &mut engine.scene);
        let _ = ctx.end_pass();
        assert!(!changed);
    }

    let node = &engine.scene.nodes[root];
    assert_eq!(node.transform.scale, Vec3::splat(0.06));
    assert_eq!(node.transform.position, Vec3::new(0.2, -4.5, 0.0));
    assert!(node.visible);
}
