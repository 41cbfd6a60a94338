//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through the `dt` passed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (spawn order in every registry)
//! - No rendering or platform dependencies

pub mod ability;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod player;
pub mod state;
pub mod tick;

pub use ability::{Ability, try_cast};
pub use collision::{AppliedCollisions, CollisionOutcome, Hit, resolve};
pub use effects::{BurstStyle, Effect, EffectHandle, EffectKind, EffectRegistry, EffectSpawn};
pub use enemy::{DamageEvent, Enemy, EnemyId, EnemyRegistry, EnemyStatus};
pub use player::{PlayerAnim, PlayerState};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
