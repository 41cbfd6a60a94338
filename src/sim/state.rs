//! Game state and per-tick events
//!
//! One explicit state object owns the player, both registries and the RNG.
//! Nothing else in the crate mutates gameplay state.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ability::Ability;
use super::effects::EffectRegistry;
use super::enemy::{EnemyId, EnemyRegistry};
use super::player::PlayerState;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Update sequence skipped; rendering continues
    Paused,
    /// Player health reached zero
    GameOver,
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    AbilityCast { ability: Ability },
    EnemySpawned { id: EnemyId, position: Vec3 },
    EnemyHit { id: EnemyId, amount: f32, health: f32 },
    EnemyStunned { id: EnemyId },
    EnemyKilled { id: EnemyId, position: Vec3 },
    PlayerDamaged { amount: f32, health: f32 },
    PlayerHealed { amount: f32, health: f32 },
    /// Emitted once, on the tick health first reaches zero
    GameOver { kills: u32, time: f32 },
    Paused,
    Resumed,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Seconds of unpaused play
    pub time: f32,
    pub phase: GamePhase,
    pub player: PlayerState,
    pub effects: EffectRegistry,
    pub enemies: EnemyRegistry,
    pub kills: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time: 0.0,
            phase: GamePhase::Playing,
            player: PlayerState::new(tuning),
            effects: EffectRegistry::new(),
            enemies: EnemyRegistry::new(),
            kills: 0,
        }
    }

    /// Start a fresh run: player, registries, timers and phase all reset
    pub fn restart(&mut self, seed: u64, tuning: &Tuning) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.time = 0.0;
        self.phase = GamePhase::Playing;
        self.player.reset(tuning);
        self.effects.clear();
        self.enemies.reset();
        self.kills = 0;
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
