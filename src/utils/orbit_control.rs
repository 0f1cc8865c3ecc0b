use glam::{Vec2, Vec3};

use crate::app::input::{Input, MouseButton};
use crate::scene::transform::Transform;

const EPS: f32 = 0.0001;

/// Orbit controller around `target`.
///
/// Left drag rotates, the wheel zooms and right drag pans; each interaction
/// can be switched off on its own. The spherical coordinates are re-read
/// from the camera transform on every update, so other code may move the
/// camera freely in between. When nothing changed in a frame the transform
/// is left untouched.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    pub target: Vec3,

    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(target: Vec3) -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            enable_damping: false,

            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,

            target,
            rotate_delta: Vec2::ZERO,
        }
    }

    /// Turns rotate, zoom and pan off. Calling it again changes nothing.
    pub fn disable_interaction(&mut self) {
        self.enable_rotate = false;
        self.enable_zoom = false;
        self.enable_pan = false;
        self.rotate_delta = Vec2::ZERO;
    }

    #[inline]
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.enable_rotate || self.enable_zoom || self.enable_pan
    }

    /// Applies this frame's input to `transform`. Returns `true` if the
    /// camera was moved.
    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_degrees: f32, dt: f32) -> bool {
        if !self.is_interactive() && self.rotate_delta == Vec2::ZERO {
            return false;
        }

        let screen_height = input.screen_size().y.max(1.0);
        let delta = input.mouse_delta();

        let offset = transform.position - self.target;
        let mut radius = offset.length();
        if radius < EPS {
            return false;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let mut changed = false;

        if self.enable_rotate && input.get_mouse_button(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * std::f32::consts::PI / screen_height;
            self.rotate_delta -= delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.rotate_delta != Vec2::ZERO {
            let applied = if self.enable_damping {
                let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
                let applied = self.rotate_delta * (1.0 - retention);
                self.rotate_delta *= retention;
                if self.rotate_delta.length_squared() < EPS * EPS {
                    self.rotate_delta = Vec2::ZERO;
                }
                applied
            } else {
                std::mem::take(&mut self.rotate_delta)
            };
            theta += applied.x;
            phi = (phi + applied.y).clamp(EPS, std::f32::consts::PI - EPS);
            changed = true;
        }

        let scroll = input.scroll_delta().y;
        if self.enable_zoom && scroll != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(scroll.abs());
            radius = if scroll > 0.0 { radius * scale } else { radius / scale };
            radius = radius.clamp(self.min_distance.max(EPS), self.max_distance);
            changed = true;
        }

        if self.enable_pan && input.get_mouse_button(MouseButton::Right) && delta != Vec2::ZERO {
            let half_fov = fov_degrees.to_radians() / 2.0;
            let pixels_to_world = 2.0 * radius * half_fov.tan() / screen_height;

            let forward = -spherical_to_offset(1.0, theta, phi);
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.target += (right * -delta.x + up * delta.y) * pixels_to_world * self.pan_speed;
            changed = true;
        }

        if changed {
            transform.position = self.target + spherical_to_offset(radius, theta, phi);
            transform.look_at(self.target, Vec3::Y);
        }
        changed
    }
}

fn spherical_to_offset(radius: f32, theta: f32, phi: f32) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(
        radius * sin_phi * sin_theta,
        radius * cos_phi,
        radius * sin_phi * cos_theta,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::ButtonState;

    fn camera_at(position: Vec3) -> Transform {
        let mut t = Transform::new();
        t.position = position;
        t
    }

    #[test]
    fn disabled_controls_leave_camera_alone() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.disable_interaction();

        let mut input = Input::new();
        input.inject_resize(800, 600);
        input.inject_mouse_button(MouseButton::Left, ButtonState::Pressed);
        input.inject_mouse_position(10.0, 10.0);
        input.inject_mouse_position(60.0, 40.0);
        input.inject_scroll(0.0, 3.0);

        let mut cam = camera_at(Vec3::new(0.0, 0.0, 3.0));
        let before = cam.clone();
        assert!(!controls.update(&mut cam, &input, 45.0, 1.0 / 60.0));
        assert_eq!(cam.position, before.position);
        assert_eq!(cam.rotation, before.rotation);
    }

    #[test]
    fn zoom_shrinks_radius_when_enabled() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut input = Input::new();
        input.inject_resize(800, 600);
        input.inject_scroll(0.0, 1.0);

        let mut cam = camera_at(Vec3::new(0.0, 0.0, 3.0));
        assert!(controls.update(&mut cam, &input, 45.0, 1.0 / 60.0));
        assert!((cam.position.length() - 3.0 * 0.95).abs() < 1e-4);
    }

    #[test]
    fn disable_interaction_is_idempotent() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.disable_interaction();
        controls.disable_interaction();
        assert!(!controls.enable_rotate && !controls.enable_zoom && !controls.enable_pan);
    }
}
