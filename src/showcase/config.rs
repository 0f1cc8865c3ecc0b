//! Showcase Configuration
//!
//! Every constant of the car scene in one place. `Default` reproduces the
//! reference scene; the `with_*` builders override single values.
//!
//! ```rust,ignore
//! let config = ShowcaseConfig::default()
//!     .with_model_source("https://example.com/car.glb")
//!     .with_clip_name("Idle");
//! ```

use glam::Vec3;

use crate::resources::color::hex_to_linear;

/// One light of the scene, colours as sRGB hex.
#[derive(Debug, Clone, PartialEq)]
pub struct LightConfig {
    pub color: u32,
    pub intensity: f32,
    /// World position; ignored for ambient lights.
    pub position: Vec3,
    pub cast_shadows: bool,
}

impl LightConfig {
    #[must_use]
    pub fn ambient(color: u32, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::ZERO,
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn directional(color: u32, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            position,
            cast_shadows: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn linear_color(&self) -> Vec3 {
        hex_to_linear(self.color)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseConfig {
    // === Environment ===
    pub background: u32,
    pub fog_color: u32,
    pub fog_near: f32,
    pub fog_far: f32,

    // === Camera ===
    /// Vertical field of view in degrees (50 mm lens equivalent).
    pub camera_fov: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_position: Vec3,

    // === Model ===
    /// Path or `http(s)://` URL of the glTF/GLB file.
    pub model_source: String,
    pub model_position: Vec3,
    pub model_scale: f32,
    /// Clip looped as soon as the model is in the scene.
    pub clip_name: String,

    // === Lights ===
    pub ambient_light: LightConfig,
    pub key_light: LightConfig,
    pub rim_light: LightConfig,

    // === Parallax ===
    pub parallax_amplification: f32,
    /// Fraction of the remaining distance closed per frame.
    pub parallax_damping: f32,
    /// Pointer offset per logical pixel from the viewport centre.
    pub pointer_scale: f32,

    // === Controls ===
    pub orbit_damping_factor: f32,

    // === Debug panel ===
    pub panel_title: String,
    pub panel_open: bool,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            background: 0x030405,
            fog_color: 0x000000,
            fog_near: 1.5,
            fog_far: 5.0,

            camera_fov: 39.6,
            camera_near: 0.1,
            camera_far: 1000.0,
            camera_position: Vec3::new(0.0, 0.0, 3.0),

            model_source: "assets/Portmodelcyber.glb".to_string(),
            model_position: Vec3::new(0.2, -4.5, 0.0),
            model_scale: 0.06,
            clip_name: "Armature|mixamo.com|Layer0".to_string(),

            ambient_light: LightConfig::ambient(0xffffff, 5.0),
            key_light: LightConfig::directional(0xD3F8BC, 12.0, Vec3::new(0.0, 6.0, 6.0)),
            rim_light: LightConfig::directional(0x50D001, 10.0, Vec3::new(-5.0, 2.0, -5.0)),

            parallax_amplification: 2.0,
            parallax_damping: 0.05,
            pointer_scale: 0.001,

            orbit_damping_factor: 0.25,

            panel_title: "Car Model".to_string(),
            panel_open: true,
        }
    }
}

impl ShowcaseConfig {
    #[must_use]
    pub fn with_model_source(mut self, source: impl Into<String>) -> Self {
        self.model_source = source.into();
        self
    }

    #[must_use]
    pub fn with_clip_name(mut self, name: impl Into<String>) -> Self {
        self.clip_name = name.into();
        self
    }

    #[must_use]
    pub fn with_camera_position(mut self, position: Vec3) -> Self {
        self.camera_position = position;
        self
    }

    #[must_use]
    pub fn with_model_transform(mut self, position: Vec3, scale: f32) -> Self {
        self.model_position = position;
        self.model_scale = scale;
        self
    }

    #[must_use]
    pub fn with_fog(mut self, color: u32, near: f32, far: f32) -> Self {
        self.fog_color = color;
        self.fog_near = near;
        self.fog_far = far;
        self
    }

    #[must_use]
    pub fn with_parallax(mut self, amplification: f32, damping: f32) -> Self {
        self.parallax_amplification = amplification;
        self.parallax_damping = damping;
        self
    }

    #[must_use]
    pub fn with_pointer_scale(mut self, scale: f32) -> Self {
        self.pointer_scale = scale;
        self
    }

    /// Linear background colour.
    #[must_use]
    pub fn background_linear(&self) -> Vec3 {
        hex_to_linear(self.background)
    }

    /// The three scene lights: ambient, key and rim.
    #[must_use]
    pub fn lights(&self) -> [&LightConfig; 3] {
        [&self.ambient_light, &self.key_light, &self.rim_light]
    }
}
