//! Molecule Field
//!
//! An animated backdrop: a slowly turning cloud of star sprites with fifty
//! methane molecules drifting through it. Each molecule spins on its own and
//! bounces off the walls of a cube, and the whole group leans toward the
//! pointer for a gentle parallax.
//!
//! The simulation is GPU-free and deterministic given a seeded random
//! source; the window and event loop live in the binary.

pub mod config;
pub mod geometry;
pub mod input;
pub mod molecule;
pub mod renderer;
pub mod scene;
pub mod simulation;
pub mod starfield;
pub mod texture;
pub mod viewport;
