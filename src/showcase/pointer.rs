use glam::Vec2;

/// Latest pointer offset from the viewport centre.
///
/// Positions arrive in physical pixels; the offset is measured in logical
/// pixels and multiplied by `scale`, so it does not depend on the display
/// density. Y grows downwards, like the window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTracker {
    pub scale: f32,
    offset: Vec2,
}

impl PointerTracker {
    #[must_use]
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            offset: Vec2::ZERO,
        }
    }

    /// Records a pointer move. `viewport` is the surface size in physical
    /// pixels.
    pub fn on_pointer_move(&mut self, position: Vec2, viewport: Vec2, scale_factor: f32) {
        let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        let from_center = (position - viewport * 0.5) / scale_factor;
        self.offset = from_center * self.scale;
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_maps_to_zero() {
        let mut pointer = PointerTracker::new(0.001);
        pointer.on_pointer_move(Vec2::new(500.0, 400.0), Vec2::new(1000.0, 800.0), 1.0);
        assert_eq!(pointer.offset(), Vec2::ZERO);
    }

    #[test]
    fn hidpi_positions_use_logical_pixels() {
        let mut pointer = PointerTracker::new(0.001);
        pointer.on_pointer_move(Vec2::new(1200.0, 900.0), Vec2::new(2000.0, 1600.0), 2.0);
        assert!((pointer.offset().x - 0.1).abs() < 1e-6);
        assert!((pointer.offset().y - 0.05).abs() < 1e-6);
    }
}
