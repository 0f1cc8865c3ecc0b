use std::sync::Arc;

use glam::Affine3A;

use crate::animation::clip::AnimationClip;
use crate::resources::mesh::Mesh;
use crate::scene::transform::Transform;

/// Prefab node: plain data, children are referenced by index.
#[derive(Debug, Clone)]
pub struct PrefabNode {
    pub name: String,
    pub transform: Transform,
    /// Indices into [`Prefab::nodes`].
    pub children: Vec<usize>,
    /// One entry per glTF primitive.
    pub meshes: Vec<Mesh>,
    /// Index into [`Prefab::skins`].
    pub skin: Option<usize>,
}

impl PrefabNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            children: Vec::new(),
            meshes: Vec::new(),
            skin: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrefabSkin {
    pub name: String,
    /// Joint node indices into [`Prefab::nodes`].
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
    /// Position of the root bone inside `joints`.
    pub root_joint: usize,
}

/// Intermediate result of parsing a model file.
///
/// A prefab holds no scene handles and is `Send + Sync`, so it can be built
/// on a loader thread and instantiated later with
/// [`Scene::instantiate`](crate::scene::Scene::instantiate).
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    pub name: String,
    pub nodes: Vec<PrefabNode>,
    pub root_indices: Vec<usize>,
    pub skins: Vec<PrefabSkin>,
    pub animations: Vec<Arc<AnimationClip>>,
}

impl Prefab {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn animation_names(&self) -> Vec<String> {
        self.animations.iter().map(|a| a.name.clone()).collect()
    }
}
