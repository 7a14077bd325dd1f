//! Viewport size and the resize handler

use common::{GraphicsContext, PerspectiveCamera};
use winit::dpi::PhysicalSize;

/// Pixel dimensions of the output surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn half_extents(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Something frames are drawn into that can change size
pub trait OutputSurface {
    fn resize_output(&mut self, viewport: Viewport);
    fn output_viewport(&self) -> Viewport;
}

impl OutputSurface for GraphicsContext {
    fn resize_output(&mut self, viewport: Viewport) {
        self.resize(PhysicalSize::new(viewport.width, viewport.height));
    }

    fn output_viewport(&self) -> Viewport {
        self.size.into()
    }
}

/// Sync camera projection and output surface with a new viewport size.
///
/// Returns false and leaves everything untouched for a zero-sized viewport
/// (a minimized window).
pub fn handle_resize<S: OutputSurface + ?Sized>(
    camera: &mut PerspectiveCamera,
    surface: &mut S,
    viewport: Viewport,
) -> bool {
    if viewport.is_empty() {
        log::debug!("Ignoring resize to {}x{}", viewport.width, viewport.height);
        return false;
    }

    camera.update_aspect_ratio(viewport.aspect_ratio());
    surface.resize_output(viewport);
    log::debug!("Resized to {}x{}", viewport.width, viewport.height);
    true
}
