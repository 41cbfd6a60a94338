//! Spectre Arena - A ghost-type arena brawler
//!
//! Core modules:
//! - `sim`: Deterministic simulation (abilities, enemies, effects, collisions)
//! - `renderer`: WebGPU rendering pipeline and follow camera
//! - `input`: Keyboard state to per-tick commands
//! - `hud`: Read-only HUD snapshot and DOM binding
//! - `asset_loading`: Loading progress, player model and fallback mesh
//! - `tuning`: Data-driven game balance

pub mod asset_loading;
pub mod hud;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the host feeds the simulation (tab backgrounding, hitches)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Ground plane is a square of this half-extent centered on the origin
    pub const GROUND_HALF_EXTENT: f32 = 50.0;

    /// Upper bound on tracked effects (visual bursts are dropped first)
    pub const MAX_EFFECTS: usize = 256;
}

/// Turns variable frame deltas into a count of fixed simulation steps
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame delta as the simulation sees it: never negative, at most `MAX_FRAME_DT`
    #[inline]
    pub fn clamp_delta(dt: f32) -> f32 {
        dt.clamp(0.0, consts::MAX_FRAME_DT)
    }

    /// Bank a frame's delta and return how many `SIM_DT` steps to run.
    ///
    /// At most `MAX_SUBSTEPS` steps are returned; backlog past that is dropped
    /// so the leftover stays under one step.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += Self::clamp_delta(dt);

        let mut steps = 0;
        while self.accumulator >= consts::SIM_DT && steps < consts::MAX_SUBSTEPS {
            self.accumulator -= consts::SIM_DT;
            steps += 1;
        }
        if steps == consts::MAX_SUBSTEPS {
            self.accumulator %= consts::SIM_DT;
        }
        steps
    }

    /// Time banked toward the next step
    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Unit facing vector on the ground plane for a yaw angle (0 = +Z)
#[inline]
pub fn yaw_to_facing(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Yaw angle that faces along a ground-plane direction
#[inline]
pub fn facing_to_yaw(dir: Vec3) -> f32 {
    dir.x.atan2(dir.z)
}

/// Vector from `from` to `to` with the vertical component dropped
#[inline]
pub fn ground_delta(from: Vec3, to: Vec3) -> Vec3 {
    let d = to - from;
    Vec3::new(d.x, 0.0, d.z)
}

/// Distance between two points measured on the ground plane
#[inline]
pub fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    ground_delta(a, b).length()
}
