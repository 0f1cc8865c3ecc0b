mod gltf;

pub use gltf::GltfLoader;
