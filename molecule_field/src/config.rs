//! Scene tunables
//!
//! Everything here has a `Default` reproducing the look of the effect; there
//! is no file or command line layer on top.

use glam::Vec3;

/// Per-frame motion constants consumed by [`crate::simulation::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Star field Y rotation per frame (radians)
    pub star_spin: f64,
    /// Pointer offset (pixels) to target rotation (radians)
    pub parallax_gain: f32,
    /// Exponential smoothing factor of the group rotation
    pub parallax_easing: f32,
    /// Per-molecule X and Y rotation per frame (radians)
    pub molecule_spin: f64,
    /// Half edge of the cube molecules bounce inside
    pub bound: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            star_spin: 0.0015,
            parallax_gain: 0.002,
            parallax_easing: 0.003,
            molecule_spin: 0.005,
            bound: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 3000.0,
            position: Vec3::new(0.0, 0.0, 600.0),
        }
    }
}

/// One point light plus an ambient term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub point_position: Vec3,
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    pub ambient_color: [f32; 3],
}

impl Default for Lighting {
    fn default() -> Self {
        let ambient = 0x40 as f32 / 255.0;
        Self {
            point_position: Vec3::new(200.0, 200.0, 200.0),
            point_color: [1.0, 1.0, 1.0],
            point_intensity: 1.0,
            ambient_color: [ambient, ambient, ambient],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub star_count: usize,
    /// Edge length of the cube stars are scattered in
    pub star_extent: f32,
    pub star_point_size: f32,
    /// Sprite texels below this alpha are discarded
    pub star_alpha_test: f32,
    pub sprite_size: u32,
    pub molecule_count: usize,
    /// Edge length of the cube molecules spawn in
    pub spawn_extent: f32,
    /// Largest absolute value of any initial velocity component
    pub max_drift_speed: f32,
    pub clear_color: wgpu::Color,
    pub camera: CameraConfig,
    pub lighting: Lighting,
    pub motion: MotionParams,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_count: 200_000,
            star_extent: 4000.0,
            star_point_size: 3.0,
            star_alpha_test: 0.1,
            sprite_size: 64,
            molecule_count: 50,
            spawn_extent: 1500.0,
            max_drift_speed: 0.4,
            clear_color: wgpu::Color::BLACK,
            camera: CameraConfig::default(),
            lighting: Lighting::default(),
            motion: MotionParams::default(),
        }
    }
}
