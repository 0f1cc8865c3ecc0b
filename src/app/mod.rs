//! Application Layer
//!
//! - [`input`]: platform-agnostic pointer state
//! - [`input_adapter`]: winit event translation
//! - [`winit`]: the [`App`](winit::App) runner and [`AppHandler`](winit::AppHandler) trait

pub mod input;
pub mod input_adapter;
pub mod winit;

pub use input::{ButtonState, Input, MouseButton};
pub use self::winit::{App, AppHandler};
