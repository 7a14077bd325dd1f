//! Per-frame animation
//!
//! All mutable scene state lives in [`SimulationState`]; [`step`] advances it
//! by whole frames without touching the GPU. Motion is counted in frames, so
//! the effect runs faster or slower with the display refresh rate.

use crate::config::MotionParams;
use crate::input::PointerOffset;
use crate::molecule::MoleculeGroup;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationState {
    /// Rotation of the whole star field about Y (radians, unwrapped)
    pub star_rotation: f64,
    pub group: MoleculeGroup,
    pub pointer: PointerOffset,
    pub motion: MotionParams,
}

impl SimulationState {
    pub fn new(group: MoleculeGroup, motion: MotionParams) -> Self {
        Self {
            star_rotation: 0.0,
            group,
            pointer: PointerOffset::default(),
            motion,
        }
    }

    fn advance_frame(&mut self) {
        let motion = self.motion;
        let target = self.pointer.parallax_target(motion.parallax_gain);

        self.star_rotation += motion.star_spin;

        // Vertical pointer offset tilts about X, horizontal turns about Y
        self.group
            .ease_rotation(target.y, target.x, motion.parallax_easing);

        for molecule in &mut self.group.molecules {
            molecule.advance(motion.molecule_spin, motion.bound);
        }
    }
}

/// Advance `state` by `dt_frames` frames. Zero frames returns it unchanged.
pub fn step(mut state: SimulationState, dt_frames: u32) -> SimulationState {
    for _ in 0..dt_frames {
        state.advance_frame();
    }
    state
}
