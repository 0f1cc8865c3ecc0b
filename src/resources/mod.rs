//! Core resource definitions
//!
//! CPU-side data required for rendering, independent of the GPU backend:
//! - [`Geometry`]: interleaved vertices and indices
//! - [`Material`]: base colour, metal/rough factors and optional texture
//! - [`Mesh`]: a geometry/material pair attached to a scene node
//! - [`ImageData`]: decoded RGBA8 pixels
//! - [`color`]: hex colour helpers

pub mod color;
pub mod geometry;
pub mod image;
pub mod material;
pub mod mesh;

pub use geometry::{BoundingBox, Geometry, Vertex};
pub use image::ImageData;
pub use material::Material;
pub use mesh::Mesh;
