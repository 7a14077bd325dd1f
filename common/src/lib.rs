//! Shared graphics utilities
//!
//! Window and GPU context setup, the perspective camera and buffer helpers
//! used by the molecule field renderer.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
