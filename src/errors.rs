//! Error Types
//!
//! This module defines the error type shared by every layer of the viewer.
//!
//! # Overview
//!
//! [`ViewerError`] covers:
//! - GPU and window initialization failures
//! - Asset reading (file system and HTTP)
//! - glTF, image and data URI decoding
//! - Runtime lookups such as a missing animation clip
//!
//! All fallible library APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, ViewerError>`.
//!
//! ```rust,ignore
//! use parallax::errors::{Result, ViewerError};
//!
//! fn load() -> Result<()> {
//!     Err(ViewerError::AssetNotFound("car.glb".into()))
//! }
//! ```

use thiserror::Error;

/// The main error type of the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // GPU & Window Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    /// The OS refused to create a window.
    #[error("Window creation failed: {0}")]
    WindowCreateFailed(#[from] winit::error::OsError),

    // ========================================================================
    // Asset I/O Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// HTTP response with a non-success status code.
    #[error("HTTP response error for {url}: status {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// URL parsing error.
    #[cfg(feature = "http")]
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// glTF parsing error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// The GLB container has no binary chunk although a buffer refers to it.
    #[error("Missing GLB binary chunk")]
    MissingBinaryChunk,

    /// A mesh primitive lacks a required vertex attribute.
    #[error("Primitive of mesh '{mesh}' has no {attribute} attribute")]
    MissingAttribute {
        /// Mesh name (or index)
        mesh: String,
        /// Attribute semantic, e.g. `POSITION`
        attribute: &'static str,
    },

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // ========================================================================
    // Runtime Errors
    // ========================================================================
    /// The model does not contain the requested animation clip.
    #[error("Animation clip '{name}' not found (available: {available:?})")]
    ClipNotFound {
        /// The requested clip name
        name: String,
        /// Names of the clips the model does contain
        available: Vec<String>,
    },

    /// A blocking decode task panicked or was aborted.
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// A background load finished without delivering a result.
    #[error("Asset load was cancelled before completion")]
    LoadCancelled,

    /// WASM-specific error.
    #[cfg(target_arch = "wasm32")]
    #[error("WASM error: {0}")]
    Wasm(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for ViewerError {
    fn from(err: image::ImageError) -> Self {
        ViewerError::ImageDecode(err.to_string())
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(err: gltf::Error) -> Self {
        ViewerError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;
