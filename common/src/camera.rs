//! Perspective camera for the background scene

use glam::{Mat4, Vec3};

/// Fixed-position perspective camera looking down the negative Z axis.
///
/// The projection matrix is cached and only rebuilt by
/// [`PerspectiveCamera::update_projection_matrix`], so changing a field
/// directly has no effect until that call.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            fov: fov_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Rebuild the cached projection from fov, aspect and clip planes
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far);
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.update_projection_matrix();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// World-space edge length of a billboard that covers the same screen
    /// area as a size-attenuated point sprite of `point_size`.
    ///
    /// A point sprite spans `size * (height / 2) / depth` pixels, a
    /// view-aligned quad of edge `s` spans `s * (height / 2) / (depth * tan(fov / 2))`.
    pub fn point_world_size(&self, point_size: f32) -> f32 {
        point_size * (self.fov * 0.5).tan()
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            position: camera.position.extend(1.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_update_rebuilds_projection() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 3000.0);
        let before = camera.projection_matrix();
        camera.update_aspect_ratio(2.0);
        assert_eq!(camera.aspect_ratio, 2.0);
        assert_ne!(before, camera.projection_matrix());
        assert_eq!(
            camera.projection_matrix(),
            Mat4::perspective_rh(75.0f32.to_radians(), 2.0, 0.1, 3000.0)
        );
    }

    #[test]
    fn test_view_looks_down_negative_z() {
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 3000.0)
            .with_position(Vec3::new(0.0, 0.0, 600.0));
        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_in_view - Vec3::new(0.0, 0.0, -600.0)).length() < 1e-3);
    }

    #[test]
    fn test_point_world_size_at_90_degrees() {
        let camera = PerspectiveCamera::new(90.0, 1.0, 0.1, 100.0);
        assert!((camera.point_world_size(3.0) - 3.0).abs() < 1e-5);
    }
}
