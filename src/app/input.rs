//! Platform-agnostic pointer input
//!
//! Platform adapters (see [`input_adapter`](crate::app::input_adapter))
//! translate window events into these types and inject them; scene logic
//! only ever queries [`Input`].

use glam::Vec2;
use rustc_hash::FxHashSet;

/// Mouse button enumeration
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Button state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Per-frame pointer state container
#[derive(Debug, Clone, Default)]
pub struct Input {
    pressed_mouse: FxHashSet<MouseButton>,
    just_pressed_mouse: FxHashSet<MouseButton>,
    just_released_mouse: FxHashSet<MouseButton>,

    // Physical pixels, origin top-left
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: Vec2,

    screen_size: Vec2,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== System API (called by Engine/Adapter) ==========

    /// Clears transient state (just pressed/released, deltas) for the next frame.
    pub fn start_frame(&mut self) {
        self.just_pressed_mouse.clear();
        self.just_released_mouse.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                if self.pressed_mouse.insert(button) {
                    self.just_pressed_mouse.insert(button);
                }
            }
            ButtonState::Released => {
                if self.pressed_mouse.remove(&button) {
                    self.just_released_mouse.insert(button);
                }
            }
        }
    }

    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        // No delta for the very first sample
        if self.mouse_position != Vec2::ZERO {
            self.mouse_delta += new_pos - self.mouse_position;
        }
        self.mouse_position = new_pos;
    }

    pub fn inject_scroll(&mut self, delta_x: f32, delta_y: f32) {
        self.scroll_delta += Vec2::new(delta_x, delta_y);
    }

    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    // ========== User API ==========

    /// Whether `button` is currently held down.
    #[must_use]
    pub fn get_mouse_button(&self, button: MouseButton) -> bool {
        self.pressed_mouse.contains(&button)
    }

    /// Whether `button` went down this frame.
    #[must_use]
    pub fn get_mouse_button_down(&self, button: MouseButton) -> bool {
        self.just_pressed_mouse.contains(&button)
    }

    /// Whether `button` went up this frame.
    #[must_use]
    pub fn get_mouse_button_up(&self, button: MouseButton) -> bool {
        self.just_released_mouse.contains(&button)
    }

    #[must_use]
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_edges() {
        let mut input = Input::new();
        input.inject_mouse_button(MouseButton::Right, ButtonState::Pressed);
        assert!(input.get_mouse_button(MouseButton::Right));
        assert!(input.get_mouse_button_down(MouseButton::Right));

        input.start_frame();
        assert!(input.get_mouse_button(MouseButton::Right));
        assert!(!input.get_mouse_button_down(MouseButton::Right));

        input.inject_mouse_button(MouseButton::Right, ButtonState::Released);
        assert!(!input.get_mouse_button(MouseButton::Right));
        assert!(input.get_mouse_button_up(MouseButton::Right));
    }

    #[test]
    fn first_mouse_sample_has_no_delta() {
        let mut input = Input::new();
        input.inject_mouse_position(100.0, 50.0);
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.inject_mouse_position(110.0, 45.0);
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, -5.0));

        input.start_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), Vec2::new(110.0, 45.0));
    }
}
