//! GPU uniform layouts for the forward pass.
//!
//! Every struct here mirrors a WGSL struct in `shaders/forward.wgsl` and only
//! uses 16-byte aligned members, so `#[repr(C)]` matches std140/uniform
//! layout rules without manual padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::resources::Material;
use crate::scene::{Camera, LightKind, Scene};

/// Directional lights beyond this count are ignored by the shader.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub direction: [f32; 4],
    /// `color * intensity`.
    pub radiance: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// Summed ambient radiance.
    pub ambient: [f32; 4],
    /// `w` is 1 when fog is enabled.
    pub fog_color: [f32; 4],
    /// `near, far, exposure, unused`.
    pub fog_params: [f32; 4],
    /// `x` holds the number of valid entries in `lights`.
    pub light_count: [u32; 4],
    pub lights: [GpuDirectionalLight; MAX_DIRECTIONAL_LIGHTS],
}

impl FrameUniforms {
    /// Gathers camera, light and fog state for one frame.
    #[must_use]
    pub fn from_scene(scene: &Scene, camera: &Camera, exposure: f32) -> Self {
        let mut uniforms = Self {
            view_projection: camera.view_projection_matrix().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            camera_position: camera.world_position().extend(1.0).to_array(),
            ..Self::zeroed()
        };

        let mut ambient = Vec3::ZERO;
        let mut count = 0usize;
        for item in scene.collect_lights() {
            match &item.light.kind {
                LightKind::Ambient => ambient += item.light.radiance(),
                LightKind::Directional(directional) => {
                    if count == MAX_DIRECTIONAL_LIGHTS {
                        log::warn!(
                            "Only {MAX_DIRECTIONAL_LIGHTS} directional lights are supported, ignoring the rest"
                        );
                        continue;
                    }
                    let direction = (item.world_position - directional.target)
                        .try_normalize()
                        .unwrap_or(Vec3::Y);
                    uniforms.lights[count] = GpuDirectionalLight {
                        direction: direction.extend(0.0).to_array(),
                        radiance: item.light.radiance().extend(1.0).to_array(),
                    };
                    count += 1;
                }
            }
        }
        uniforms.ambient = ambient.extend(1.0).to_array();
        uniforms.light_count[0] = count as u32;

        match scene.fog {
            Some(fog) => {
                uniforms.fog_color = fog.color.extend(1.0).to_array();
                uniforms.fog_params = [fog.near, fog.far, exposure, 0.0];
            }
            None => uniforms.fog_params = [0.0, 0.0, exposure, 0.0],
        }

        uniforms
    }

    #[must_use]
    pub fn directional_lights(&self) -> &[GpuDirectionalLight] {
        &self.lights[..self.light_count[0] as usize]
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// `x` is 1 for skinned meshes.
    pub flags: [u32; 4],
}

impl ObjectUniforms {
    #[must_use]
    pub fn new(model: Mat4, skinned: bool) -> Self {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal).to_cols_array_2d(),
            flags: [u32::from(skinned), 0, 0, 0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
    /// `metallic, roughness, has_texture, unused`.
    pub params: [f32; 4],
}

impl From<&Material> for MaterialUniforms {
    fn from(material: &Material) -> Self {
        let has_texture = if material.base_color_texture.is_some() { 1.0 } else { 0.0 };
        Self {
            base_color: material.base_color.to_array(),
            emissive: material.emissive.extend(0.0).to_array(),
            params: [material.metallic, material.roughness, has_texture, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Fog, Light};
    use glam::Vec4;

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 48);
    }

    #[test]
    fn ambient_lights_are_summed_and_directionals_point_to_the_light() {
        let mut scene = Scene::new();
        scene.add_light(Light::new_ambient(Vec3::ONE, 0.5));
        scene.add_light(Light::new_ambient(Vec3::ONE, 0.25));
        let sun = scene.add_light(Light::new_directional(Vec3::ONE, 2.0));
        scene.get_node_mut(sun).unwrap().transform.position = Vec3::new(0.0, 10.0, 0.0);
        scene.fog = Some(Fog::new(Vec3::ZERO, 10.0, 15.0));
        scene.update();

        let camera = Camera::new_perspective(45.0, 1.0, 0.1, 100.0);
        let uniforms = FrameUniforms::from_scene(&scene, &camera, 1.0);

        assert!((uniforms.ambient[0] - 0.75).abs() < 1e-5);
        let lights = uniforms.directional_lights();
        assert_eq!(lights.len(), 1);
        assert!((lights[0].direction[1] - 1.0).abs() < 1e-5);
        assert!((lights[0].radiance[0] - 2.0).abs() < 1e-5);
        assert_eq!(uniforms.fog_color[3], 1.0);
        assert_eq!(uniforms.fog_params[0], 10.0);
        assert_eq!(uniforms.fog_params[1], 15.0);
    }

    #[test]
    fn material_flags_texture_presence() {
        let material = Material::new_standard(Vec4::new(1.0, 0.0, 0.0, 1.0));
        let uniforms = MaterialUniforms::from(&material);
        assert_eq!(uniforms.params[2], 0.0);
        assert_eq!(uniforms.base_color, [1.0, 0.0, 0.0, 1.0]);
    }
}
