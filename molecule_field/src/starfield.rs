//! Background star field

use rand::Rng;

/// Static point cloud. Positions are packed `[x0, y0, z0, x1, ...]` so the
/// buffer can be uploaded as-is; only the aggregate rotation ever changes and
/// that lives in the simulation state.
#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    positions: Vec<f32>,
}

impl StarField {
    /// Scatter `count` stars uniformly inside a cube of edge `extent`
    /// centered on the origin
    pub fn generate<R: Rng + ?Sized>(count: usize, extent: f32, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(count * 3);
        for _ in 0..count * 3 {
            positions.push((rng.gen::<f32>() - 0.5) * extent);
        }
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_star_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let stars = StarField::generate(1000, 4000.0, &mut rng);
        assert_eq!(stars.len(), 1000);
        assert_eq!(stars.positions().len(), 3000);
    }

    #[test]
    fn test_stars_inside_cube() {
        let mut rng = StdRng::seed_from_u64(42);
        let stars = StarField::generate(200_000, 4000.0, &mut rng);
        for coord in stars.positions() {
            assert!((-2000.0..=2000.0).contains(coord), "star coordinate {}", coord);
        }
    }

    #[test]
    fn test_stars_fill_the_cube() {
        let mut rng = StdRng::seed_from_u64(3);
        let stars = StarField::generate(10_000, 4000.0, &mut rng);
        let max = stars.positions().iter().cloned().fold(f32::MIN, f32::max);
        let min = stars.positions().iter().cloned().fold(f32::MAX, f32::min);
        assert!(max > 1900.0);
        assert!(min < -1900.0);
    }

    #[test]
    fn test_seeded_generation_repeats() {
        let a = StarField::generate(500, 4000.0, &mut StdRng::seed_from_u64(11));
        let b = StarField::generate(500, 4000.0, &mut StdRng::seed_from_u64(11));
        let c = StarField::generate(500, 4000.0, &mut StdRng::seed_from_u64(12));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_field() {
        let stars = StarField::generate(0, 4000.0, &mut StdRng::seed_from_u64(1));
        assert!(stars.is_empty());
    }
}
