use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::io::{self, AssetSource};
use crate::assets::prefab::{Prefab, PrefabNode, PrefabSkin};
use crate::errors::{Result, ViewerError};
use crate::resources::{Geometry, ImageData, Material, Mesh, Vertex};
use crate::scene::Transform;

/// glTF 2.0 loader (`.gltf` with external or embedded buffers, and `.glb`).
///
/// Loading runs in two phases. The async phase fetches every buffer and
/// image the document references; the synchronous phase walks the parsed
/// document and builds a [`Prefab`].
pub struct GltfLoader;

impl GltfLoader {
    pub async fn load(source: &AssetSource) -> Result<Prefab> {
        let bytes = source.read_bytes().await?;
        Self::load_from_bytes(source, &bytes).await
    }

    /// Parses an already fetched document. `source` is used to resolve
    /// relative buffer and image URIs and to name the prefab.
    pub async fn load_from_bytes(source: &AssetSource, bytes: &[u8]) -> Result<Prefab> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        let buffers = Self::load_buffers(&gltf, source).await?;
        let images = Self::load_images(&gltf, &buffers, source).await;

        let builder = PrefabBuilder {
            gltf: &gltf,
            buffers: &buffers,
            images,
            node_names: unique_node_names(&gltf),
            materials: FxHashMap::default(),
            default_material: None,
        };
        builder.build(source.filename().into_owned())
    }

    async fn load_buffers(gltf: &gltf::Gltf, source: &AssetSource) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::with_capacity(gltf.buffers().len());
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .as_deref()
                    .ok_or(ViewerError::MissingBinaryChunk)?
                    .to_vec(),
                gltf::buffer::Source::Uri(uri) => io::read_uri(source, uri).await?,
            };
            if data.len() < buffer.length() {
                return Err(ViewerError::Gltf(format!(
                    "buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }

    /// Images that fail to load are reported and left out; the materials
    /// using them fall back to their colour factor.
    async fn load_images(
        gltf: &gltf::Gltf,
        buffers: &[Vec<u8>],
        source: &AssetSource,
    ) -> Vec<Option<Arc<ImageData>>> {
        let mut images = Vec::with_capacity(gltf.images().len());
        for image in gltf.images() {
            let bytes = match image.source() {
                gltf::image::Source::View { view, .. } => {
                    let start = view.offset();
                    let end = start + view.length();
                    buffers
                        .get(view.buffer().index())
                        .and_then(|b| b.get(start..end))
                        .map(<[u8]>::to_vec)
                        .ok_or_else(|| {
                            ViewerError::Gltf(format!("image {} view out of range", image.index()))
                        })
                }
                gltf::image::Source::Uri { uri, .. } => io::read_uri(source, uri).await,
            };

            let decoded = match bytes {
                Ok(bytes) => decode_image(bytes).await,
                Err(e) => Err(e),
            };
            match decoded {
                Ok(data) => images.push(Some(Arc::new(data))),
                Err(e) => {
                    log::warn!("Skipping glTF image {}: {e}", image.index());
                    images.push(None);
                }
            }
        }
        images
    }
}

async fn decode_image(bytes: Vec<u8>) -> Result<ImageData> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        // Offload to the blocking pool when running on the asset runtime
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            return handle
                .spawn_blocking(move || ImageData::decode(&bytes))
                .await?;
        }
    }
    ImageData::decode(&bytes)
}

// ============================================================================
// Prefab construction
// ============================================================================

struct PrefabBuilder<'a> {
    gltf: &'a gltf::Gltf,
    buffers: &'a [Vec<u8>],
    images: Vec<Option<Arc<ImageData>>>,
    /// Per-node names, made unique so tracks bind to exactly one node.
    node_names: Vec<String>,
    materials: FxHashMap<usize, Arc<Material>>,
    default_material: Option<Arc<Material>>,
}

impl PrefabBuilder<'_> {
    fn build(mut self, name: String) -> Result<Prefab> {
        let gltf = self.gltf;
        let mut prefab = Prefab::new(name);

        for node in gltf.nodes() {
            let mut pnode = PrefabNode::new(self.node_name(&node));

            let (t, r, s) = node.transform().decomposed();
            pnode.transform =
                Transform::from_trs(Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s));
            pnode.children = node.children().map(|c| c.index()).collect();
            pnode.skin = node.skin().map(|s| s.index());

            if let Some(mesh) = node.mesh() {
                pnode.meshes = self.load_mesh(&mesh)?;
            }

            prefab.nodes.push(pnode);
        }

        prefab.root_indices = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => {
                let mut is_child = vec![false; prefab.nodes.len()];
                for pnode in &prefab.nodes {
                    for &c in &pnode.children {
                        if let Some(flag) = is_child.get_mut(c) {
                            *flag = true;
                        }
                    }
                }
                (0..prefab.nodes.len()).filter(|&i| !is_child[i]).collect()
            }
        };

        prefab.skins = self.load_skins();
        prefab.animations = self.load_animations();

        log::info!(
            "Loaded glTF '{}': {} nodes, {} skins, {} animations",
            prefab.name,
            prefab.nodes.len(),
            prefab.skins.len(),
            prefab.animations.len()
        );

        Ok(prefab)
    }

    fn node_name(&self, node: &gltf::Node) -> String {
        self.node_names
            .get(node.index())
            .cloned()
            .unwrap_or_else(|| fallback_node_name(node))
    }

    fn buffer_data(&self, buffer: &gltf::Buffer) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(Vec::as_slice)
    }

    // ------------------------------------------------------------------------
    // Meshes & materials
    // ------------------------------------------------------------------------

    fn load_mesh(&mut self, mesh: &gltf::Mesh) -> Result<Vec<Mesh>> {
        let mesh_name = mesh
            .name()
            .map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string);

        let mut meshes = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Mesh '{mesh_name}': skipping primitive {} with mode {:?}",
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }

            let geometry = self.load_primitive_geometry(&primitive, &mesh_name)?;
            let material = self.material(&primitive.material());
            meshes.push(Mesh::new(mesh_name.clone(), Arc::new(geometry), material));
        }
        Ok(meshes)
    }

    fn load_primitive_geometry(
        &self,
        primitive: &gltf::Primitive,
        mesh_name: &str,
    ) -> Result<Geometry> {
        let reader = primitive.reader(|buffer| self.buffer_data(&buffer));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| ViewerError::MissingAttribute {
                mesh: mesh_name.to_string(),
                attribute: "POSITION",
            })?
            .collect();

        let normals: Vec<[f32; 3]> = reader.read_normals().map(Iterator::collect).unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|r| r.into_f32().collect())
            .unwrap_or_default();
        let joints: Vec<[u16; 4]> = reader
            .read_joints(0)
            .map(|r| r.into_u16().collect())
            .unwrap_or_default();
        let weights: Vec<[f32; 4]> = reader
            .read_weights(0)
            .map(|r| r.into_f32().collect())
            .unwrap_or_default();

        let skinned = !joints.is_empty() && !weights.is_empty();

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let normal = normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
                let uv = uvs.get(i).copied().unwrap_or([0.0, 0.0]);
                let mut vertex = Vertex::new(position, normal, uv);
                if skinned && let (Some(j), Some(w)) = (joints.get(i), weights.get(i)) {
                    vertex.joints = j.map(u32::from);
                    vertex.weights = *w;
                }
                vertex
            })
            .collect();

        let indices = reader.read_indices().map(|r| r.into_u32().collect());

        let mut geometry = Geometry::new(vertices, indices);
        geometry.skinned = skinned;
        Ok(geometry)
    }

    fn material(&mut self, material: &gltf::Material) -> Arc<Material> {
        let Some(index) = material.index() else {
            return self
                .default_material
                .get_or_insert_with(|| Arc::new(Material::default()))
                .clone();
        };

        if let Some(cached) = self.materials.get(&index) {
            return cached.clone();
        }

        let pbr = material.pbr_metallic_roughness();
        let mut mat = Material::new_standard(Vec4::from_array(pbr.base_color_factor()));
        mat.name = material.name().map(str::to_string);
        mat.metallic = pbr.metallic_factor();
        mat.roughness = pbr.roughness_factor();
        mat.double_sided = material.double_sided();
        mat.emissive = Vec3::from_array(material.emissive_factor())
            * material.emissive_strength().unwrap_or(1.0);

        if let Some(info) = pbr.base_color_texture() {
            let image_index = info.texture().source().index();
            mat.base_color_texture = self.images.get(image_index).cloned().flatten();
        }

        let mat = Arc::new(mat);
        self.materials.insert(index, mat.clone());
        mat
    }

    // ------------------------------------------------------------------------
    // Skins
    // ------------------------------------------------------------------------

    fn load_skins(&self) -> Vec<PrefabSkin> {
        self.gltf
            .skins()
            .map(|skin| {
                let reader = skin.reader(|buffer| self.buffer_data(&buffer));
                let joints: Vec<gltf::Node> = skin.joints().collect();

                let inverse_bind_matrices: Vec<Affine3A> = match reader.read_inverse_bind_matrices()
                {
                    Some(iter) => iter
                        .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                        .collect(),
                    None => vec![Affine3A::IDENTITY; joints.len()],
                };

                PrefabSkin {
                    name: skin.name().unwrap_or("Skeleton").to_string(),
                    joints: joints.iter().map(gltf::Node::index).collect(),
                    inverse_bind_matrices,
                    root_joint: root_joint(&skin, &joints),
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Animations
    // ------------------------------------------------------------------------

    fn load_animations(&self) -> Vec<Arc<AnimationClip>> {
        self.gltf
            .animations()
            .map(|anim| {
                let name = anim
                    .name()
                    .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);

                let tracks = anim
                    .channels()
                    .filter_map(|channel| self.load_channel(&channel, &name))
                    .collect();

                Arc::new(AnimationClip::new(name, tracks))
            })
            .collect()
    }

    fn load_channel(&self, channel: &gltf::animation::Channel, clip_name: &str) -> Option<Track> {
        use gltf::animation::util::ReadOutputs;

        let reader = channel.reader(|buffer| self.buffer_data(&buffer));
        let target = channel.target();
        let node_name = self.node_name(&target.node()?);

        let Some(inputs) = reader.read_inputs() else {
            log::warn!("Clip '{clip_name}': channel for '{node_name}' has no keyframe times");
            return None;
        };
        let times: Vec<f32> = inputs.collect();

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            gltf::animation::Interpolation::Step => InterpolationMode::Step,
            gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let (target_path, data) = match reader.read_outputs()? {
            ReadOutputs::Translations(iter) => (
                TargetPath::Translation,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::Rotations(iter) => (
                TargetPath::Rotation,
                TrackData::Quaternion(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::Scales(iter) => (
                TargetPath::Scale,
                TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            ),
            ReadOutputs::MorphTargetWeights(_) => {
                log::debug!("Clip '{clip_name}': ignoring morph weight channel on '{node_name}'");
                return None;
            }
        };

        Some(Track {
            meta: TrackMeta {
                node_name,
                target: target_path,
            },
            data,
        })
    }
}

fn fallback_node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn unique_node_names(gltf: &gltf::Gltf) -> Vec<String> {
    make_unique(gltf.nodes().map(|node| fallback_node_name(&node)))
}

/// Keeps the first occurrence of each name and suffixes later ones with
/// `_1`, `_2`, ... skipping suffixes that are already taken.
fn make_unique(names: impl Iterator<Item = String>) -> Vec<String> {
    let names: Vec<String> = names.collect();
    let mut taken: FxHashSet<String> = names.iter().cloned().collect();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    let mut unique = Vec::with_capacity(names.len());
    for name in &names {
        if seen.insert(name.as_str()) {
            unique.push(name.clone());
            continue;
        }
        let mut suffix = 1;
        let renamed = loop {
            let candidate = format!("{name}_{suffix}");
            if !taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        log::debug!("Renaming duplicate glTF node '{name}' to '{renamed}'");
        taken.insert(renamed.clone());
        unique.push(renamed);
    }
    unique
}

/// Position of the root bone within `joints`: the skin's explicit skeleton
/// root if it is a joint, otherwise the first joint not parented to another
/// joint.
fn root_joint(skin: &gltf::Skin, joints: &[gltf::Node]) -> usize {
    if let Some(skeleton_root) = skin.skeleton()
        && let Some(index) = joints.iter().position(|n| n.index() == skeleton_root.index())
    {
        return index;
    }

    let child_joints: FxHashSet<usize> = joints
        .iter()
        .flat_map(|n| n.children())
        .map(|c| c.index())
        .collect();

    joints
        .iter()
        .position(|n| !child_joints.contains(&n.index()))
        .unwrap_or(0)
}
