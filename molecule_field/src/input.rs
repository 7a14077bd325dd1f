//! Pointer tracking for the parallax effect

use glam::Vec2;

use crate::viewport::Viewport;

/// Latest pointer position relative to the viewport center, in logical
/// pixels. No history is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerOffset {
    pub x: f32,
    pub y: f32,
}

impl PointerOffset {
    /// Record a pointer-move at physical pixel coordinates inside a
    /// physical `viewport`, converting the offset with `scale_factor`
    pub fn track(
        &mut self,
        pointer_x: f64,
        pointer_y: f64,
        viewport: Viewport,
        scale_factor: f64,
    ) {
        let (half_width, half_height) = viewport.half_extents();
        self.x = ((pointer_x - half_width) / scale_factor) as f32;
        self.y = ((pointer_y - half_height) / scale_factor) as f32;
    }

    /// Target rotation (radians) the molecule group eases toward
    pub fn parallax_target(&self, gain: f32) -> Vec2 {
        Vec2::new(self.x * gain, self.y * gain)
    }
}
