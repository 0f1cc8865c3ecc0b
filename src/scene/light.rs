use glam::Vec3;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Point the light shines towards, in world space. The direction is
    /// `target - light_position`.
    pub target: Vec3,
}

/// Light component attached to a scene node.
#[derive(Debug, Clone)]
pub enum LightKind {
    /// Uniform light reaching every surface regardless of orientation.
    Ambient,
    Directional(DirectionalLight),
}

#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    /// Linear RGB colour.
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    /// Recorded for completeness; the forward renderer has no shadow maps.
    pub cast_shadows: bool,
}

impl Light {
    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Ambient,
            cast_shadows: false,
        }
    }

    /// Directional light aimed at the world origin.
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Directional(DirectionalLight { target: Vec3::ZERO }),
            cast_shadows: false,
        }
    }

    #[must_use]
    pub fn with_cast_shadows(mut self, cast: bool) -> Self {
        self.cast_shadows = cast;
        self
    }

    /// Pre-multiplied radiance (`color * intensity`).
    #[inline]
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// Linear distance fog, blending towards `color` between `near` and `far`
/// (measured as view-space depth).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    #[must_use]
    pub fn new(color: Vec3, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }

    /// Blend factor at view depth `depth`, using the smoothstep falloff of
    /// the fragment shader.
    #[must_use]
    pub fn factor(&self, depth: f32) -> f32 {
        let t = ((depth - self.near) / (self.far - self.near).max(f32::EPSILON)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}
