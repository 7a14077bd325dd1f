//! Scene assembly
//!
//! Builds everything drawn on screen once at startup and flattens the
//! per-frame state into world-space transforms for the renderer.

use common::PerspectiveCamera;
use glam::{Mat4, Vec3};
use rand::Rng;

use crate::config::{Lighting, SceneConfig};
use crate::molecule::{wrap_angle, MoleculeGroup};
use crate::simulation::{self, SimulationState};
use crate::starfield::StarField;
use crate::texture::SpriteTexture;
use crate::viewport::Viewport;

pub struct Scene {
    pub camera: PerspectiveCamera,
    pub lighting: Lighting,
    pub stars: StarField,
    /// Shared by the star points and the carbon spheres
    pub sprite: SpriteTexture,
    pub state: SimulationState,
    pub star_point_size: f32,
    pub star_alpha_test: f32,
    pub clear_color: wgpu::Color,
}

impl Scene {
    pub fn assemble<R: Rng + ?Sized>(config: &SceneConfig, viewport: Viewport, rng: &mut R) -> Self {
        let camera = PerspectiveCamera::new(
            config.camera.fov_degrees,
            if viewport.is_empty() { 1.0 } else { viewport.aspect_ratio() },
            config.camera.near,
            config.camera.far,
        )
        .with_position(config.camera.position);

        let sprite = SpriteTexture::generate(config.sprite_size);
        let stars = StarField::generate(config.star_count, config.star_extent, rng);
        let group = MoleculeGroup::spawn(
            config.molecule_count,
            config.spawn_extent,
            config.max_drift_speed,
            rng,
        );

        log::info!(
            "Scene assembled: {} stars, {} molecules",
            stars.len(),
            group.len()
        );

        Self {
            camera,
            lighting: config.lighting,
            stars,
            sprite,
            state: SimulationState::new(group, config.motion),
            star_point_size: config.star_point_size,
            star_alpha_test: config.star_alpha_test,
            clear_color: config.clear_color,
        }
    }

    /// Advance the animation by `dt_frames` frames
    pub fn advance(&mut self, dt_frames: u32) {
        self.state = simulation::step(std::mem::take(&mut self.state), dt_frames);
    }

    pub fn star_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(wrap_angle(self.state.star_rotation))
    }

    pub fn molecule_transforms(&self) -> MoleculeTransforms {
        MoleculeTransforms::from_group(&self.state.group)
    }
}

/// World-space placement of every atom and bond for one frame
#[derive(Debug, Clone, Default)]
pub struct MoleculeTransforms {
    pub centers: Vec<Mat4>,
    pub satellites: Vec<Mat4>,
    pub bonds: Vec<(Vec3, Vec3)>,
}

impl MoleculeTransforms {
    pub fn from_group(group: &MoleculeGroup) -> Self {
        let group_matrix = group.world_matrix();
        let mut transforms = Self {
            centers: Vec::with_capacity(group.len()),
            satellites: Vec::with_capacity(group.len() * 4),
            bonds: Vec::with_capacity(group.len() * 4),
        };

        for molecule in &group.molecules {
            let molecule_matrix = group_matrix * molecule.local_matrix();
            transforms.centers.push(molecule_matrix);

            for satellite in molecule.satellites {
                transforms
                    .satellites
                    .push(molecule_matrix * Mat4::from_translation(satellite));
            }

            for (start, end) in molecule.bonds() {
                transforms.bonds.push((
                    molecule_matrix.transform_point3(start),
                    molecule_matrix.transform_point3(end),
                ));
            }
        }

        transforms
    }

    /// Order the translucent centers farthest first as seen through `view`.
    /// Afterwards `centers[i]` no longer pairs with `satellites[4 * i..]`.
    pub fn sort_centers_back_to_front(&mut self, view: Mat4) {
        self.centers.sort_by(|a, b| {
            let depth_a = view.transform_point3(a.w_axis.truncate()).z;
            let depth_b = view.transform_point3(b.w_axis.truncate()).z;
            depth_a.total_cmp(&depth_b)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::BOND_LENGTH;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_config() -> SceneConfig {
        SceneConfig {
            star_count: 2000,
            ..SceneConfig::default()
        }
    }

    #[test]
    fn test_assemble_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        let scene = Scene::assemble(&small_config(), Viewport::new(1280, 720), &mut rng);

        assert_eq!(scene.stars.len(), 2000);
        assert_eq!(scene.state.group.len(), 50);
        assert_eq!(scene.sprite.size, 64);
        assert_eq!(scene.camera.aspect_ratio, 1280.0 / 720.0);
        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 600.0));
    }

    #[test]
    fn test_default_config_matches_effect() {
        let config = SceneConfig::default();
        assert_eq!(config.star_count, 200_000);
        assert_eq!(config.molecule_count, 50);
        assert_eq!(config.motion.bound, 1000.0);
        assert_eq!(config.lighting.point_position, Vec3::splat(200.0));
    }

    #[test]
    fn test_transforms_keep_bond_length() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut scene = Scene::assemble(&small_config(), Viewport::new(800, 600), &mut rng);
        scene.state.pointer.x = 300.0;
        scene.state.pointer.y = -200.0;
        scene.advance(250);

        let transforms = scene.molecule_transforms();
        assert_eq!(transforms.centers.len(), 50);
        assert_eq!(transforms.satellites.len(), 200);
        assert_eq!(transforms.bonds.len(), 200);

        for (i, (start, end)) in transforms.bonds.iter().enumerate() {
            assert!(((*end - *start).length() - BOND_LENGTH).abs() < 1e-2);

            let center = transforms.centers[i / 4].transform_point3(Vec3::ZERO);
            assert!((center - *start).length() < 1e-2);

            let satellite = transforms.satellites[i].transform_point3(Vec3::ZERO);
            assert!((satellite - *end).length() < 1e-2);
        }
    }

    #[test]
    fn test_group_rotation_moves_molecules() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut scene = Scene::assemble(&small_config(), Viewport::new(800, 600), &mut rng);
        let position = scene.state.group.molecules[0].position;

        scene.state.group.rotation = Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let center = scene.molecule_transforms().centers[0].transform_point3(Vec3::ZERO);
        let expected = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2).transform_point3(position);
        assert!((center - expected).length() < 1e-2);
    }

    #[test]
    fn test_advance_rotates_stars() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut scene = Scene::assemble(&small_config(), Viewport::new(800, 600), &mut rng);
        scene.advance(2);
        assert_eq!(scene.star_matrix(), Mat4::from_rotation_y(0.003_f64 as f32));
        assert!(scene.state.star_rotation > 0.0);
    }

    #[test]
    fn test_centers_sorted_back_to_front() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut scene = Scene::assemble(&small_config(), Viewport::new(800, 600), &mut rng);
        scene.state.pointer.x = -150.0;
        scene.advance(30);

        let view = scene.camera.view_matrix();
        let mut transforms = scene.molecule_transforms();
        transforms.sort_centers_back_to_front(view);
        assert_eq!(transforms.centers.len(), 50);

        // View space looks down -Z, so the farthest center has the lowest z
        let depths: Vec<f32> = transforms
            .centers
            .iter()
            .map(|m| view.transform_point3(m.transform_point3(Vec3::ZERO)).z)
            .collect();
        assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_zero_viewport_uses_square_aspect() {
        let mut rng = StdRng::seed_from_u64(4);
        let scene = Scene::assemble(&small_config(), Viewport::new(0, 0), &mut rng);
        assert_eq!(scene.camera.aspect_ratio, 1.0);
    }
}
