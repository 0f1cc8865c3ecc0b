//! Utility Module
//!
//! - [`OrbitControls`]: orbit/zoom/pan camera controller, each interaction
//!   switchable on its own
//! - [`FpsCounter`]: frame rate averaged over a fixed window
//! - [`Timer`]: monotonic frame clock

pub mod fps_counter;
pub mod orbit_control;
pub mod time;

pub use fps_counter::FpsCounter;
pub use orbit_control::OrbitControls;
pub use time::Timer;
