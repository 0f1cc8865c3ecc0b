use glam::{Vec2, Vec3};

use crate::scene::Transform;

/// Pointer-driven parallax for the camera.
///
/// Each call closes `damping` of the remaining X/Y distance between the
/// camera and `pointer * amplification`. The step is per frame, not per
/// second, so the easing speed follows the display refresh rate. Z is never
/// touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxCamera {
    pub amplification: f32,
    pub damping: f32,
}

impl ParallaxCamera {
    #[must_use]
    pub fn new(amplification: f32, damping: f32) -> Self {
        Self {
            amplification,
            damping,
        }
    }

    #[inline]
    #[must_use]
    pub fn target(&self, pointer: Vec2) -> Vec2 {
        pointer * self.amplification
    }

    /// One easing step, then aim at `look_target` when there is one.
    pub fn update(&self, transform: &mut Transform, pointer: Vec2, look_target: Option<Vec3>) {
        let target = self.target(pointer);
        transform.position.x += (target.x - transform.position.x) * self.damping;
        transform.position.y += (target.y - transform.position.y) * self.damping;

        if let Some(look_target) = look_target {
            transform.look_at(look_target, Vec3::Y);
        }
    }
}
