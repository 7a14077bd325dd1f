//! Methane molecule models
//!
//! Each molecule is a carbon sphere with four hydrogen spheres at the
//! corners of a regular tetrahedron, joined to the center by bond lines.
//! Molecules drift in a straight line, spin about their local X and Y axes
//! and bounce off the faces of a bounding cube.

use glam::{DVec3, EulerRot, Mat4, Vec3};
use rand::Rng;

/// Unnormalized directions to the tetrahedron corners
pub const TETRAHEDRAL_OFFSETS: [Vec3; 4] = [
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
];

/// Center to satellite distance
pub const BOND_LENGTH: f32 = 20.0;

pub const CENTER_RADIUS: f32 = 5.0;
pub const SATELLITE_RADIUS: f32 = 2.0;

/// (width, height) segments of the sphere meshes
pub const CENTER_SEGMENTS: (u32, u32) = (16, 16);
pub const SATELLITE_SEGMENTS: (u32, u32) = (12, 12);

pub const CENTER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const SATELLITE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BOND_COLOR: [f32; 4] = [
    0x88 as f32 / 255.0,
    0x88 as f32 / 255.0,
    0x88 as f32 / 255.0,
    1.0,
];

/// Satellite positions relative to the center
pub fn satellite_offsets() -> [Vec3; 4] {
    TETRAHEDRAL_OFFSETS.map(|offset| offset.normalize() * BOND_LENGTH)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler angles (XYZ order) of the molecule's own spin, unwrapped
    pub rotation: DVec3,
    pub satellites: [Vec3; 4],
}

impl Molecule {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            rotation: DVec3::ZERO,
            satellites: satellite_offsets(),
        }
    }

    /// Build a molecule at `position` with a random velocity whose
    /// components lie in `[-max_speed, max_speed)`
    pub fn spawn<R: Rng + ?Sized>(position: Vec3, max_speed: f32, rng: &mut R) -> Self {
        let velocity = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 2.0 * max_speed,
            (rng.gen::<f32>() - 0.5) * 2.0 * max_speed,
            (rng.gen::<f32>() - 0.5) * 2.0 * max_speed,
        );
        Self::new(position, velocity)
    }

    /// Spin, move, then reflect off the cube of half edge `bound`.
    ///
    /// The bound is checked after the move, so a molecule can sit past it for
    /// a frame before its velocity carries it back.
    pub fn advance(&mut self, spin: f64, bound: f32) {
        self.rotation.x += spin;
        self.rotation.y += spin;
        self.position += self.velocity;

        for axis in 0..3 {
            if self.position[axis] > bound || self.position[axis] < -bound {
                self.velocity[axis] = -self.velocity[axis];
            }
        }
    }

    /// Local to parent transform: translate, then rotate
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * euler_matrix(wrap_angles(self.rotation))
    }

    /// (center, satellite) endpoints of the four bonds in local space
    pub fn bonds(&self) -> [(Vec3, Vec3); 4] {
        self.satellites.map(|satellite| (Vec3::ZERO, satellite))
    }
}

/// Parent transform shared by every molecule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoleculeGroup {
    pub rotation: Vec3,
    pub molecules: Vec<Molecule>,
}

impl MoleculeGroup {
    /// Spawn `count` molecules uniformly inside a cube of edge `spawn_extent`
    pub fn spawn<R: Rng + ?Sized>(
        count: usize,
        spawn_extent: f32,
        max_speed: f32,
        rng: &mut R,
    ) -> Self {
        let mut molecules = Vec::with_capacity(count);
        for _ in 0..count {
            let position = Vec3::new(
                (rng.gen::<f32>() - 0.5) * spawn_extent,
                (rng.gen::<f32>() - 0.5) * spawn_extent,
                (rng.gen::<f32>() - 0.5) * spawn_extent,
            );
            molecules.push(Molecule::spawn(position, max_speed, rng));
        }

        Self {
            rotation: Vec3::ZERO,
            molecules,
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        euler_matrix(self.rotation)
    }

    /// Ease the rotation toward `target` on the X and Y axes
    pub fn ease_rotation(&mut self, target_x: f32, target_y: f32, factor: f32) {
        self.rotation.x += factor * (target_x - self.rotation.x);
        self.rotation.y += factor * (target_y - self.rotation.y);
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }
}

fn euler_matrix(rotation: Vec3) -> Mat4 {
    Mat4::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

/// Reduce an unwrapped angle to `[0, 2π)` before narrowing it to `f32`
pub fn wrap_angle(angle: f64) -> f32 {
    angle.rem_euclid(std::f64::consts::TAU) as f32
}

fn wrap_angles(rotation: DVec3) -> Vec3 {
    Vec3::new(
        wrap_angle(rotation.x),
        wrap_angle(rotation.y),
        wrap_angle(rotation.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_satellites_at_bond_length() {
        for offset in satellite_offsets() {
            assert!((offset.length() - BOND_LENGTH).abs() < 1e-4);
        }
    }

    #[test]
    fn test_satellites_form_regular_tetrahedron() {
        let offsets = satellite_offsets();
        let edge = (offsets[0] - offsets[1]).length();
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert!(((offsets[i] - offsets[j]).length() - edge).abs() < 1e-3);
            }
        }
        let centroid: Vec3 = offsets.iter().copied().sum::<Vec3>() / 4.0;
        assert!(centroid.length() < 1e-4);
    }

    #[test]
    fn test_group_spawn_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);
        let group = MoleculeGroup::spawn(50, 1500.0, 0.4, &mut rng);
        assert_eq!(group.len(), 50);

        for molecule in &group.molecules {
            assert_eq!(molecule.satellites.len(), 4);
            assert_eq!(molecule.bonds().len(), 4);
            for satellite in molecule.satellites {
                assert!((satellite.length() - 20.0).abs() < 1e-4);
            }
            for axis in 0..3 {
                assert!((-0.4..=0.4).contains(&molecule.velocity[axis]));
                assert!((-750.0..=750.0).contains(&molecule.position[axis]));
            }
            assert_eq!(molecule.rotation, DVec3::ZERO);
        }
    }

    #[test]
    fn test_seeded_spawn_repeats() {
        let a = MoleculeGroup::spawn(10, 1500.0, 0.4, &mut StdRng::seed_from_u64(5));
        let b = MoleculeGroup::spawn(10, 1500.0, 0.4, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_boundary_reflection() {
        let mut molecule = Molecule::new(Vec3::new(999.0, 0.0, 0.0), Vec3::new(5.0, 0.25, -0.3));
        molecule.advance(0.005, 1000.0);

        assert!(molecule.position.x > 1000.0);
        assert_eq!(molecule.velocity.x, -5.0);
        assert_eq!(molecule.velocity.y, 0.25);
        assert_eq!(molecule.velocity.z, -0.3);
    }

    #[test]
    fn test_negative_boundary_reflection() {
        let mut molecule = Molecule::new(Vec3::new(0.0, -999.9, 0.0), Vec3::new(0.0, -0.4, 0.0));
        molecule.advance(0.005, 1000.0);
        assert!(molecule.position.y < -1000.0);
        assert_eq!(molecule.velocity.y, 0.4);
    }

    #[test]
    fn test_overshoot_returns_inside() {
        let mut molecule = Molecule::new(Vec3::new(999.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        molecule.advance(0.0, 1000.0);
        assert_eq!(molecule.position.x, 1004.0);
        molecule.advance(0.0, 1000.0);
        assert_eq!(molecule.position.x, 999.0);
        assert_eq!(molecule.velocity.x, -5.0);
    }

    #[test]
    fn test_at_boundary_does_not_reflect() {
        let mut molecule = Molecule::new(Vec3::new(999.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        molecule.advance(0.0, 1000.0);
        assert_eq!(molecule.position.x, 1000.0);
        assert_eq!(molecule.velocity.x, 1.0);
    }

    #[test]
    fn test_spin_advances_x_and_y_only() {
        let mut molecule = Molecule::new(Vec3::ZERO, Vec3::ZERO);
        molecule.advance(0.005, 1000.0);
        molecule.advance(0.005, 1000.0);
        assert!((molecule.rotation.x - 0.01).abs() < 1e-12);
        assert!((molecule.rotation.y - 0.01).abs() < 1e-12);
        assert_eq!(molecule.rotation.z, 0.0);
    }

    #[test]
    fn test_spin_keeps_advancing_after_long_runs() {
        let mut molecule = Molecule::new(Vec3::ZERO, Vec3::ZERO);
        molecule.rotation = DVec3::new(131_072.0, 131_072.0, 0.0);
        molecule.advance(0.005, 1000.0);
        assert!((molecule.rotation.x - 131_072.0 - 0.005).abs() < 1e-9);
        assert!((molecule.rotation.y - 131_072.0 - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(std::f64::consts::TAU + 0.25) - 0.25).abs() < 1e-6);
        assert!((wrap_angle(-0.25) - (std::f64::consts::TAU - 0.25) as f32).abs() < 1e-6);

        // Same angle one million turns later
        let turns = std::f64::consts::TAU * 1_000_000.0;
        assert!((wrap_angle(turns + 1.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_local_matrix_places_center() {
        let mut molecule = Molecule::new(Vec3::new(10.0, -20.0, 30.0), Vec3::ZERO);
        molecule.rotation = DVec3::new(0.3, 1.2, 0.0);
        let center = molecule.local_matrix().transform_point3(Vec3::ZERO);
        assert!((center - molecule.position).length() < 1e-4);

        let satellite = molecule
            .local_matrix()
            .transform_point3(molecule.satellites[0]);
        assert!(((satellite - center).length() - BOND_LENGTH).abs() < 1e-3);
    }
}
