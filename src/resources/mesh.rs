use std::sync::Arc;

use crate::resources::geometry::Geometry;
use crate::resources::material::Material;

/// A drawable pairing of geometry and material.
///
/// Both halves are reference counted so that several nodes (or several
/// instantiations of one prefab) share a single GPU upload.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: Arc<Geometry>, material: Arc<Material>) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
        }
    }
}
