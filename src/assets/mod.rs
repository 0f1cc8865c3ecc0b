//! Asset Loading
//!
//! - [`AssetSource`]: file path or URL, with relative URI resolution
//! - [`GltfLoader`]: glTF/GLB parsing into a [`Prefab`]
//! - [`AssetServer`]: background loads delivered through [`PendingLoad`]

pub mod io;
pub mod loaders;
pub mod prefab;
pub mod server;

pub use io::AssetSource;
pub use loaders::GltfLoader;
pub use prefab::{Prefab, PrefabNode, PrefabSkin};
pub use server::{AssetServer, PendingLoad};
