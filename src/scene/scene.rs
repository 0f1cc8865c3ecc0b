use glam::{Affine3A, Mat4, Vec3};
use slotmap::{SecondaryMap, SlotMap};

use crate::assets::prefab::Prefab;
use crate::resources::Mesh;
use crate::scene::{
    Camera, Fog, Light, LightKind, Node, NodeHandle, Skeleton, SkeletonKey, SkinBinding, Transform,
};

/// One visible mesh ready for drawing, as collected by [`Scene::collect_draws`].
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub node: NodeHandle,
    pub world_matrix: Mat4,
    pub mesh: &'a Mesh,
    /// Joint palette when the mesh is skinned.
    pub joints: Option<&'a [Mat4]>,
}

/// One active light with its world position resolved.
#[derive(Debug, Clone, Copy)]
pub struct LightItem<'a> {
    pub light: &'a Light,
    pub world_position: Vec3,
}

/// Scene container: node graph, components and environment settings.
#[derive(Debug, Default)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub names: SecondaryMap<NodeHandle, String>,
    pub meshes: SecondaryMap<NodeHandle, Mesh>,
    pub cameras: SecondaryMap<NodeHandle, Camera>,
    pub lights: SecondaryMap<NodeHandle, Light>,
    pub skins: SecondaryMap<NodeHandle, SkinBinding>,
    pub skeletons: SlotMap<SkeletonKey, Skeleton>,

    /// Linear clear colour.
    pub background: Vec3,
    pub fog: Option<Fog>,
    pub active_camera: Option<NodeHandle>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Inserts a node at the root of the scene.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.add_node(Node::new());
        self.names.insert(handle, name.to_string());
        handle
    }

    /// Re-parents `child` under `parent`, detaching it from wherever it was.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || !self.nodes.contains_key(parent) {
            return;
        }
        let Some(old_parent) = self.nodes.get(child).map(Node::parent) else {
            return;
        };

        match old_parent {
            Some(old) => {
                if let Some(old_node) = self.nodes.get_mut(old) {
                    old_node.children.retain(|&c| c != child);
                }
            }
            None => self.root_nodes.retain(|&r| r != child),
        }

        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
            child_node.transform.mark_dirty();
        }
    }

    /// Removes a node and its whole subtree together with their components.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(parent) = self.nodes.get(handle).map(Node::parent) else {
            return;
        };
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.children.retain(|&c| c != handle);
                }
            }
            None => self.root_nodes.retain(|&r| r != handle),
        }

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
            self.names.remove(current);
            self.meshes.remove(current);
            self.cameras.remove(current);
            self.lights.remove(current);
            self.skins.remove(current);
            if self.active_camera == Some(current) {
                self.active_camera = None;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    /// Depth-first search for a node called `name` in the subtree of `root`
    /// (including `root` itself).
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if self.name(current) == Some(name) {
                return Some(current);
            }
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.children.iter().rev());
            }
        }
        None
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Creates a root node carrying `camera`.
    pub fn add_camera(&mut self, camera: Camera) -> NodeHandle {
        let name = camera.name.to_string();
        let handle = self.create_node_with_name(&name);
        self.cameras.insert(handle, camera);
        handle
    }

    /// Creates a root node carrying `light`.
    pub fn add_light(&mut self, light: Light) -> NodeHandle {
        let name = match light.kind {
            LightKind::Ambient => "AmbientLight",
            LightKind::Directional(_) => "DirectionalLight",
        };
        let handle = self.create_node_with_name(name);
        self.lights.insert(handle, light);
        handle
    }

    pub fn set_mesh(&mut self, handle: NodeHandle, mesh: Mesh) {
        if self.nodes.contains_key(handle) {
            self.meshes.insert(handle, mesh);
        }
    }

    /// Mutable access to the active camera's transform and projection.
    pub fn query_main_camera_bundle(&mut self) -> Option<(&mut Transform, &mut Camera)> {
        let handle = self.active_camera?;
        let node = self.nodes.get_mut(handle)?;
        let camera = self.cameras.get_mut(handle)?;
        Some((&mut node.transform, camera))
    }

    #[must_use]
    pub fn main_camera(&self) -> Option<&Camera> {
        self.active_camera.and_then(|h| self.cameras.get(h))
    }

    // ========================================================================
    // Prefab Instantiation
    // ========================================================================

    /// Instantiates `prefab` under a new root node named after it and
    /// returns that root.
    ///
    /// glTF meshes with several primitives become one child node per
    /// primitive so every drawable node carries exactly one [`Mesh`].
    pub fn instantiate(&mut self, prefab: &Prefab) -> NodeHandle {
        let root = self.create_node_with_name(&prefab.name);

        let handles: Vec<NodeHandle> = prefab
            .nodes
            .iter()
            .map(|pnode| {
                let handle = self.create_node_with_name(&pnode.name);
                if let Some(node) = self.nodes.get_mut(handle) {
                    node.transform = pnode.transform.clone();
                    node.transform.mark_dirty();
                }
                handle
            })
            .collect();

        for (i, pnode) in prefab.nodes.iter().enumerate() {
            for &child in &pnode.children {
                if let Some(&child_handle) = handles.get(child) {
                    self.attach(child_handle, handles[i]);
                }
            }
        }
        for &index in &prefab.root_indices {
            if let Some(&handle) = handles.get(index) {
                self.attach(handle, root);
            }
        }

        let skeleton_keys: Vec<SkeletonKey> = prefab
            .skins
            .iter()
            .map(|skin| {
                let bones = skin
                    .joints
                    .iter()
                    .filter_map(|&j| handles.get(j).copied())
                    .collect();
                self.skeletons.insert(Skeleton::new(
                    &skin.name,
                    bones,
                    skin.inverse_bind_matrices.clone(),
                    skin.root_joint,
                ))
            })
            .collect();

        for (i, pnode) in prefab.nodes.iter().enumerate() {
            let skin = pnode
                .skin
                .and_then(|s| skeleton_keys.get(s))
                .map(|&skeleton| SkinBinding { skeleton });

            match pnode.meshes.as_slice() {
                [] => {}
                [single] => self.bind_mesh(handles[i], single.clone(), skin),
                primitives => {
                    for (p, mesh) in primitives.iter().enumerate() {
                        let child = self.create_node_with_name(&format!("{}_primitive_{p}", pnode.name));
                        self.attach(child, handles[i]);
                        self.bind_mesh(child, mesh.clone(), skin);
                    }
                }
            }
        }

        root
    }

    fn bind_mesh(&mut self, handle: NodeHandle, mesh: Mesh, skin: Option<SkinBinding>) {
        self.meshes.insert(handle, mesh);
        if let Some(skin) = skin {
            self.skins.insert(handle, skin);
        }
    }

    // ========================================================================
    // Per-frame Systems
    // ========================================================================

    /// Runs the transform, skinning and camera systems in order.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
        self.update_cameras();
    }

    /// Propagates local matrices down the hierarchy.
    pub fn update_matrix_world(&mut self) {
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = self
            .root_nodes
            .iter()
            .rev()
            .map(|&h| (h, Affine3A::IDENTITY, false))
            .collect();

        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            let local_changed = node.transform.update_local_matrix();
            let changed = local_changed || parent_changed;
            if changed {
                let world = parent_world * node.transform.local_matrix;
                node.transform.set_world_matrix(world);
            }
            let world = node.transform.world_matrix;
            for &child in node.children.iter().rev() {
                stack.push((child, world, changed));
            }
        }
    }

    /// Recomputes the joint palette of every skinned mesh.
    pub fn update_skeletons(&mut self) {
        for (handle, skin) in &self.skins {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            let root_inv = node.transform.world_matrix.inverse();
            if let Some(skeleton) = self.skeletons.get_mut(skin.skeleton) {
                skeleton.compute_joint_matrices(&self.nodes, root_inv);
            }
        }
    }

    pub fn update_cameras(&mut self) {
        for (handle, camera) in &mut self.cameras {
            if let Some(node) = self.nodes.get(handle) {
                camera.update_view_projection(&node.transform.world_matrix);
            }
        }
    }

    // ========================================================================
    // Extraction
    // ========================================================================

    /// Collects every mesh whose node and ancestors are all visible.
    #[must_use]
    pub fn collect_draws(&self) -> Vec<DrawItem<'_>> {
        let mut draws = Vec::new();
        let mut stack: Vec<NodeHandle> = self.root_nodes.iter().rev().copied().collect();

        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if let Some(mesh) = self.meshes.get(handle) {
                let joints = self
                    .skins
                    .get(handle)
                    .and_then(|skin| self.skeletons.get(skin.skeleton))
                    .map(Skeleton::joint_matrices);
                draws.push(DrawItem {
                    node: handle,
                    world_matrix: node.transform.world_matrix_as_mat4(),
                    mesh,
                    joints,
                });
            }
            stack.extend(node.children.iter().rev());
        }

        draws
    }

    /// Lights attached to visible root-level or nested nodes.
    #[must_use]
    pub fn collect_lights(&self) -> Vec<LightItem<'_>> {
        self.lights
            .iter()
            .filter_map(|(handle, light)| {
                let node = self.nodes.get(handle)?;
                node.visible.then(|| LightItem {
                    light,
                    world_position: node.transform.world_position(),
                })
            })
            .collect()
    }
}
