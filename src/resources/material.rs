use std::sync::Arc;

use glam::{Vec3, Vec4};
use uuid::Uuid;

use crate::resources::image::ImageData;

/// Metallic-roughness material as read from glTF.
///
/// The forward pipeline shades the diffuse lobe only, so `metallic`
/// darkens the albedo and `roughness` is kept for inspection.
#[derive(Debug, Clone)]
pub struct Material {
    pub id: Uuid,
    pub name: Option<String>,
    /// Linear RGBA multiplier.
    pub base_color: Vec4,
    /// sRGB-encoded base colour texture.
    pub base_color_texture: Option<Arc<ImageData>>,
    pub metallic: f32,
    pub roughness: f32,
    /// Linear emitted radiance, already scaled by the emissive strength.
    pub emissive: Vec3,
    pub double_sided: bool,
}

impl Material {
    #[must_use]
    pub fn new_standard(base_color: Vec4) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: None,
            base_color,
            base_color_texture: None,
            metallic: 0.0,
            roughness: 1.0,
            emissive: Vec3::ZERO,
            double_sided: false,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new_standard(Vec4::ONE)
    }
}
