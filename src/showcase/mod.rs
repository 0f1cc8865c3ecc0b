//! Car Showcase
//!
//! The application built on top of the engine: one animated car model,
//! three lights, a pointer-driven parallax camera and a debug panel for the
//! model's transform.
//!
//! - [`ShowcaseConfig`]: every constant of the scene
//! - [`Showcase`]: application state and the per-frame update
//! - [`ShowcaseApp`]: the [`AppHandler`](crate::app::AppHandler) wiring it
//!   to a window
//!
//! # Frame order
//!
//! 1. Deliver the model once the background load finishes
//! 2. Advance the animation mixer
//! 3. Ease the camera toward the pointer and aim it at the model
//! 4. Apply orbit controls
//! 5. Build the debug panel, then render scene and overlay

pub mod app;
pub mod config;
pub mod debug_panel;
pub mod parallax;
pub mod pointer;
#[allow(clippy::module_inception)]
pub mod showcase;
pub mod ui_pass;

pub use app::ShowcaseApp;
pub use config::{LightConfig, ShowcaseConfig};
pub use debug_panel::{Axis, Control, ControlBinding, ControlKind, ControlValue, DebugPanel, Folder};
pub use parallax::ParallaxCamera;
pub use pointer::PointerTracker;
pub use showcase::{LoadedModel, Showcase};
pub use ui_pass::UiPass;
