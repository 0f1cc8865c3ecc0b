//! Colour helpers.
//!
//! Scene colours are authored as sRGB hex values (`0xD3F8BC`) and converted
//! to the linear working space used by lighting.

use glam::Vec3;

/// Converts one sRGB-encoded channel in `0..=1` to linear.
#[inline]
#[must_use]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// Unpacks `0xRRGGBB` into sRGB components in `0..=1`.
#[inline]
#[must_use]
pub fn hex_to_srgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Unpacks `0xRRGGBB` and converts it to linear RGB.
#[must_use]
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let srgb = hex_to_srgb(hex);
    Vec3::new(
        srgb_to_linear(srgb.x),
        srgb_to_linear(srgb.y),
        srgb_to_linear(srgb.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_and_black_are_fixed_points() {
        assert_eq!(hex_to_linear(0xffffff), Vec3::ONE);
        assert_eq!(hex_to_linear(0x000000), Vec3::ZERO);
    }

    #[test]
    fn channels_unpack_in_rgb_order() {
        let c = hex_to_srgb(0xff8000);
        assert!((c.x - 1.0).abs() < 1e-6);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert!(c.z.abs() < 1e-6);
    }

    #[test]
    fn mid_grey_is_darker_in_linear() {
        let linear = hex_to_linear(0x808080);
        assert!(linear.x > 0.2 && linear.x < 0.23);
    }
}
