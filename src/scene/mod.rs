//! Scene Graph
//!
//! Nodes live in a [`SlotMap`](slotmap::SlotMap) keyed by [`NodeHandle`];
//! every other component (name, mesh, camera, light, skin) sits in a side
//! table keyed by the same handle. Handles stay valid until the node is
//! removed, so gameplay code can hold on to them freely.
//!
//! - [`Scene`]: the container and per-frame update systems
//! - [`Node`]: hierarchy + [`Transform`]
//! - [`Camera`], [`Light`], [`Fog`], [`Skeleton`]: components

pub mod camera;
pub mod light;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod skeleton;
pub mod transform;

pub use camera::Camera;
pub use light::{DirectionalLight, Fog, Light, LightKind};
pub use node::Node;
pub use scene::{DrawItem, LightItem, Scene};
pub use skeleton::{Skeleton, SkinBinding};
pub use transform::Transform;

slotmap::new_key_type! {
    /// Stable handle to a node in a [`Scene`].
    pub struct NodeHandle;
    /// Handle to a [`Skeleton`] in a [`Scene`].
    pub struct SkeletonKey;
}
