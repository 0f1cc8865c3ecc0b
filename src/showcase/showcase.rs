use glam::{Vec2, Vec3};

use crate::animation::{AnimationClip, AnimationMixer};
use crate::app::input::{Input, MouseButton};
use crate::assets::prefab::Prefab;
use crate::assets::server::{AssetServer, PendingLoad};
use crate::errors::{Result, ViewerError};
use crate::resources::color::hex_to_linear;
use crate::scene::{Camera, Fog, Light, NodeHandle, Scene};
use crate::showcase::config::ShowcaseConfig;
use crate::showcase::debug_panel::DebugPanel;
use crate::showcase::parallax::ParallaxCamera;
use crate::showcase::pointer::PointerTracker;
use crate::utils::OrbitControls;

/// The model once it is in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedModel {
    pub root: NodeHandle,
    /// XYZ Euler angles last written by the debug panel.
    pub rotation_euler: Vec3,
}

/// Application context of the car showcase.
///
/// Owns everything the frame loop touches besides the scene itself. The
/// model, its mixer and the panel controls only exist once the background
/// load has been delivered through [`poll_load`](Self::poll_load); every
/// per-frame method copes with them being absent.
pub struct Showcase {
    config: ShowcaseConfig,
    camera: NodeHandle,
    lights: Vec<NodeHandle>,

    pointer: PointerTracker,
    parallax: ParallaxCamera,
    controls: OrbitControls,

    model: Option<LoadedModel>,
    mixer: Option<AnimationMixer>,
    panel: DebugPanel,
    pending: Option<PendingLoad<Prefab>>,
}

impl Showcase {
    /// Sets up background, fog, camera and lights in `scene`.
    pub fn new(config: ShowcaseConfig, scene: &mut Scene) -> Self {
        scene.background = config.background_linear();
        scene.fog = Some(Fog::new(
            hex_to_linear(config.fog_color),
            config.fog_near,
            config.fog_far,
        ));

        let camera = scene.add_camera(Camera::new_perspective(
            config.camera_fov,
            1.0,
            config.camera_near,
            config.camera_far,
        ));
        if let Some(node) = scene.get_node_mut(camera) {
            node.transform.position = config.camera_position;
        }
        scene.active_camera = Some(camera);

        let mut lights = Vec::with_capacity(3);
        let ambient = &config.ambient_light;
        lights.push(scene.add_light(Light::new_ambient(
            ambient.linear_color(),
            ambient.intensity,
        )));
        for light in [&config.key_light, &config.rim_light] {
            let handle = scene.add_light(
                Light::new_directional(light.linear_color(), light.intensity)
                    .with_cast_shadows(light.cast_shadows),
            );
            if let Some(node) = scene.get_node_mut(handle) {
                node.transform.position = light.position;
            }
            lights.push(handle);
        }

        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = false;
        controls.damping_factor = config.orbit_damping_factor;
        controls.enable_zoom = false;
        controls.enable_rotate = false;

        Self {
            pointer: PointerTracker::new(config.pointer_scale),
            parallax: ParallaxCamera::new(config.parallax_amplification, config.parallax_damping),
            config,
            camera,
            lights,
            controls,
            model: None,
            mixer: None,
            panel: DebugPanel::new(),
            pending: None,
        }
    }

    /// Starts loading the configured model. Does not block.
    pub fn begin_load(&mut self, assets: &AssetServer) {
        self.pending = Some(assets.load_gltf(&self.config.model_source));
    }

    /// Hands an already started load to the showcase.
    pub fn set_pending_load(&mut self, pending: PendingLoad<Prefab>) {
        self.pending = Some(pending);
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the load result once it arrives. Returns `true` on the frame
    /// the model entered the scene.
    ///
    /// A failed load is logged and leaves the scene running without model
    /// or panel controls.
    pub fn poll_load(&mut self, scene: &mut Scene) -> bool {
        let Some(result) = self.pending.as_mut().and_then(PendingLoad::poll) else {
            return false;
        };
        self.pending = None;

        match result {
            Ok(prefab) => {
                if let Err(e) = self.on_model_loaded(scene, &prefab) {
                    log::error!("{e}");
                }
                self.model.is_some()
            }
            Err(e) => {
                log::error!("Failed to load '{}': {e}", self.config.model_source);
                false
            }
        }
    }

    /// Places `prefab` in the scene, builds the panel folder and starts the
    /// configured clip.
    ///
    /// The model and panel stay in place when the clip is missing; the
    /// returned [`ViewerError::ClipNotFound`] names it.
    pub fn on_model_loaded(&mut self, scene: &mut Scene, prefab: &Prefab) -> Result<()> {
        let root = scene.instantiate(prefab);
        let mut rotation_euler = Vec3::ZERO;
        if let Some(node) = scene.get_node_mut(root) {
            node.transform.position = self.config.model_position;
            node.transform.scale = Vec3::splat(self.config.model_scale);
            rotation_euler = node.transform.rotation_euler();
        }
        self.model = Some(LoadedModel {
            root,
            rotation_euler,
        });

        self.panel.add_folder(DebugPanel::car_model_folder(
            self.config.panel_title.clone(),
            self.config.panel_open,
        ));

        log::info!(
            "Model '{}' loaded with {} animation(s)",
            prefab.name,
            prefab.animations.len()
        );

        let Some(clip) = AnimationClip::find_by_name(&prefab.animations, &self.config.clip_name)
        else {
            return Err(ViewerError::ClipNotFound {
                name: self.config.clip_name.clone(),
                available: prefab.animation_names(),
            });
        };

        let mut mixer = AnimationMixer::new(root);
        mixer.clip_action(clip.clone(), scene).play();
        log::info!("Playing clip '{}' ({:.2}s)", clip.name, clip.duration);
        self.mixer = Some(mixer);
        Ok(())
    }

    /// `position` and `viewport` in physical pixels.
    pub fn on_pointer_move(&mut self, position: Vec2, viewport: Vec2, scale_factor: f32) {
        self.pointer.on_pointer_move(position, viewport, scale_factor);
    }

    /// A right-button press turns the orbit controls off for good.
    pub fn on_mouse_down(&mut self, button: MouseButton) {
        if button == MouseButton::Right {
            if self.controls.is_interactive() {
                log::debug!("Right click: orbit controls disabled");
            }
            self.controls.disable_interaction();
        }
    }

    /// One frame: animation, parallax camera, then orbit controls.
    pub fn tick(&mut self, scene: &mut Scene, input: &Input, dt: f32) {
        if let Some(mixer) = &mut self.mixer {
            mixer.update(dt, scene);
        }

        let look_target = self
            .model
            .and_then(|model| scene.get_node(model.root))
            .map(|node| node.transform.position);

        let Some((transform, camera)) = scene.query_main_camera_bundle() else {
            return;
        };
        self.parallax
            .update(transform, self.pointer.offset(), look_target);
        let fov_degrees = camera.fov.to_degrees();
        self.controls.update(transform, input, fov_degrees, dt);
    }

    /// Draws the debug panel into `ctx` and applies edits to the model.
    pub fn show_panel(&mut self, ctx: &egui::Context, scene: &mut Scene) -> bool {
        let Some(model) = &mut self.model else {
            return false;
        };
        let Some(node) = scene.get_node_mut(model.root) else {
            return false;
        };
        self.panel.show(ctx, node, &mut model.rotation_euler)
    }

    #[must_use]
    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    #[must_use]
    pub fn camera(&self) -> NodeHandle {
        self.camera
    }

    #[must_use]
    pub fn lights(&self) -> &[NodeHandle] {
        &self.lights
    }

    #[must_use]
    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.mixer.as_ref()
    }

    #[must_use]
    pub fn panel(&self) -> &DebugPanel {
        &self.panel
    }

    #[must_use]
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }
}
