//! Procedural sprite texture
//!
//! A soft white disc: opaque at the center, 60% opacity at a fifth of the
//! radius and fully transparent at the rim. Used as the star point sprite and
//! as the map of the carbon sphere.

/// Gradient stops as (fraction of radius, alpha)
const GRADIENT_STOPS: [(f32, f32); 3] = [(0.0, 1.0), (0.2, 0.6), (1.0, 0.0)];

/// RGBA8 bitmap, rows top to bottom, unpremultiplied alpha
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteTexture {
    pub size: u32,
    pub pixels: Vec<u8>,
}

impl SpriteTexture {
    /// Render the radial gradient at `size` x `size` pixels
    pub fn generate(size: u32) -> Self {
        let radius = size as f32 / 2.0;
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);

        for y in 0..size {
            for x in 0..size {
                // Sample at the pixel center
                let dx = x as f32 + 0.5 - radius;
                let dy = y as f32 + 0.5 - radius;
                let t = (dx * dx + dy * dy).sqrt() / radius;
                let alpha = gradient_alpha(t);

                pixels.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
            }
        }

        Self { size, pixels }
    }

    /// Upload to the GPU, returning a view ready for sampling
    pub fn upload(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::TextureView {
        let extent = wgpu::Extent3d {
            width: self.size,
            height: self.size,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Sprite Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.size),
                rows_per_image: Some(self.size),
            },
            extent,
        );

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

/// Piecewise linear alpha at `t` (distance / radius). Outside the disc
/// everything is transparent.
fn gradient_alpha(t: f32) -> f32 {
    if t >= 1.0 {
        return 0.0;
    }

    for pair in GRADIENT_STOPS.windows(2) {
        let (t0, a0) = pair[0];
        let (t1, a1) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            return a0 + (a1 - a0) * f;
        }
    }

    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(sprite: &SpriteTexture, x: u32, y: u32) -> f32 {
        let index = ((y * sprite.size + x) * 4 + 3) as usize;
        sprite.pixels[index] as f32 / 255.0
    }

    #[test]
    fn test_gradient_stops() {
        assert!((gradient_alpha(0.0) - 1.0).abs() < 1e-6);
        assert!((gradient_alpha(0.2) - 0.6).abs() < 1e-6);
        assert!((gradient_alpha(0.6) - 0.3).abs() < 1e-6);
        assert_eq!(gradient_alpha(1.0), 0.0);
        assert_eq!(gradient_alpha(1.5), 0.0);
    }

    #[test]
    fn test_sprite_center_and_corners() {
        let sprite = SpriteTexture::generate(64);
        assert_eq!(sprite.pixels.len(), 64 * 64 * 4);

        // Pixel centers nearest the middle sit ~0.7px away, t ~ 0.022
        assert!(alpha_at(&sprite, 31, 31) > 0.95);
        assert!(alpha_at(&sprite, 32, 32) > 0.95);

        for (x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)] {
            assert_eq!(alpha_at(&sprite, x, y), 0.0);
        }
    }

    #[test]
    fn test_sprite_twenty_percent_stop() {
        let sprite = SpriteTexture::generate(64);
        // Radius 32, 20% is 6.4px from the center. Pixel 38 on the middle row
        // has its center 6.5px right and 0.5px down.
        let alpha = alpha_at(&sprite, 38, 31);
        assert!((alpha - 0.6).abs() < 0.02, "alpha at 20% stop was {}", alpha);
    }

    #[test]
    fn test_sprite_is_white_and_symmetric() {
        let sprite = SpriteTexture::generate(16);
        for chunk in sprite.pixels.chunks(4) {
            assert_eq!(&chunk[..3], &[255, 255, 255]);
        }
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(alpha_at(&sprite, x, y), alpha_at(&sprite, 15 - x, y));
                assert_eq!(alpha_at(&sprite, x, y), alpha_at(&sprite, x, 15 - y));
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(SpriteTexture::generate(32), SpriteTexture::generate(32));
    }
}
