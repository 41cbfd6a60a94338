//! Per-frame simulation step
//!
//! Runs the whole update sequence in a fixed order so a cast and the scan
//! that might consume its projectile never see a torn frame:
//! movement, resource ledger, casts, enemies, effect ageing, collisions,
//! deaths, game-over check.

use glam::Vec2;

use super::ability::{Ability, try_cast};
use super::collision::resolve;
use super::effects::{BurstStyle, EffectSpawn};
use super::state::{GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Lifetime of the spark burst where a hit lands
const SPARK_LIFETIME: f32 = 0.4;
/// Lifetime of the smoke puff left by a dead enemy
const SMOKE_LIFETIME: f32 = 0.8;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Ground-plane movement (x = world X, y = world Z); need not be normalized
    pub movement: Vec2,
    /// Ability presses this tick, indexed by `Ability::index()`
    pub cast: [bool; Ability::COUNT],
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Input that casts a single ability
    pub fn casting(ability: Ability) -> Self {
        let mut input = Self::default();
        input.cast[ability.index()] = true;
        input
    }
}

/// Advance the game by `dt` seconds and report what happened
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                events.push(GameEvent::Resumed);
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return events;
    }

    let dt = dt.max(0.0);
    state.time += dt;

    state.player.move_by(input.movement, dt, tuning);
    state.player.tick(dt, tuning);

    for ability in Ability::ALL {
        if !input.cast[ability.index()] {
            continue;
        }
        let health_before = state.player.health;
        if try_cast(ability, &mut state.player, tuning, &mut state.effects) {
            events.push(GameEvent::AbilityCast { ability });
            let healed = state.player.health - health_before;
            if healed > 0.0 {
                events.push(GameEvent::PlayerHealed {
                    amount: healed,
                    health: state.player.health,
                });
            }
        }
    }

    let player_pos = state.player.position;
    if let Some(id) = state
        .enemies
        .advance_spawn_timer(dt, &mut state.rng, player_pos, tuning)
    {
        let position = state.enemies.get(id).map(|e| e.position).unwrap_or_default();
        events.push(GameEvent::EnemySpawned { id, position });
    }

    for hit in state.enemies.tick(dt, player_pos, tuning) {
        let dealt = state.player.take_damage(hit.amount, tuning.player.hit_flash);
        if dealt > 0.0 {
            events.push(GameEvent::PlayerDamaged {
                amount: dealt,
                health: state.player.health,
            });
        }
    }

    state.effects.tick(dt);

    let applied = resolve(&state.effects, &state.enemies, tuning).apply(&mut state.effects, &mut state.enemies, tuning);
    for hit in &applied.hits {
        events.push(GameEvent::EnemyHit {
            id: hit.enemy,
            amount: hit.amount,
            health: hit.health,
        });
        state
            .effects
            .spawn(EffectSpawn::burst(hit.position, BurstStyle::Spark, SPARK_LIFETIME));
    }
    for &id in &applied.newly_stunned {
        events.push(GameEvent::EnemyStunned { id });
    }

    for dead in state.enemies.remove_dead() {
        state.kills += 1;
        log::debug!("Enemy {} defeated ({} total)", dead.id.0, state.kills);
        events.push(GameEvent::EnemyKilled {
            id: dead.id,
            position: dead.position,
        });
        state
            .effects
            .spawn(EffectSpawn::burst(dead.position, BurstStyle::Smoke, SMOKE_LIFETIME));
    }

    if state.player.is_dead() {
        state.phase = GamePhase::GameOver;
        log::info!("Game over after {:.1}s with {} kills", state.time, state.kills);
        events.push(GameEvent::GameOver {
            kills: state.kills,
            time: state.time,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::effects::EffectKind;
    use glam::Vec3;

    fn new_game() -> (GameState, Tuning) {
        let tuning = Tuning::default();
        (GameState::new(12345, &tuning), tuning)
    }

    #[test]
    fn test_cast_through_tick() {
        let (mut state, tuning) = new_game();
        let cast = TickInput::casting(Ability::ShadowBall);

        let events = tick(&mut state, &cast, &tuning, SIM_DT);
        assert!(events.contains(&GameEvent::AbilityCast {
            ability: Ability::ShadowBall
        }));
        assert_eq!(state.player.energy, 80.0);
        assert_eq!(state.player.cooldown(Ability::ShadowBall), 2.0);

        let events = tick(&mut state, &cast, &tuning, 0.0);
        assert!(events.is_empty());
        assert_eq!(state.player.energy, 80.0);
    }

    #[test]
    fn test_tick_pause() {
        let (mut state, tuning) = new_game();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        assert_eq!(tick(&mut state, &pause, &tuning, SIM_DT), vec![GameEvent::Paused]);
        assert_eq!(state.phase, GamePhase::Paused);

        // Nothing moves while paused
        let before_time = state.time;
        let walk = TickInput {
            movement: Vec2::X,
            ..Default::default()
        };
        for _ in 0..100 {
            tick(&mut state, &walk, &tuning, 0.1);
        }
        assert_eq!(state.time, before_time);
        assert_eq!(state.player.position, Vec3::ZERO);
        assert!(state.enemies.is_empty());

        // Unpause
        let events = tick(&mut state, &pause, &tuning, SIM_DT);
        assert_eq!(events, vec![GameEvent::Resumed]);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_spawns_every_interval() {
        let (mut state, tuning) = new_game();
        let idle = TickInput::default();
        let mut spawned = 0;
        for _ in 0..22 {
            let events = tick(&mut state, &idle, &tuning, 0.5);
            spawned += events
                .iter()
                .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
                .count();
        }
        // 11 seconds: spawns at 5s and 10s
        assert_eq!(spawned, 2);
        assert_eq!(state.enemies.len(), 2);
    }

    #[test]
    fn test_projectile_kill_removed_same_frame() {
        let (mut state, tuning) = new_game();
        // Player faces -Z at start
        let id = state.enemies.insert_at(Vec3::new(0.0, 1.0, -1.0), 0.0, &tuning);
        state.enemies.get_mut(id).unwrap().health = 10.0;

        let events = tick(&mut state, &TickInput::casting(Ability::ShadowBall), &tuning, SIM_DT);
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyHit { .. })));
        assert!(events.contains(&GameEvent::EnemyKilled {
            id,
            position: Vec3::new(0.0, 1.0, -1.0)
        }));
        assert_eq!(state.kills, 1);
        assert!(state.enemies.get(id).is_none());

        // Projectile consumed, bursts left behind
        assert!(state.effects.iter().all(|e| matches!(e.kind, EffectKind::Burst(_))));
        assert_eq!(state.effects.len(), 2);
    }

    #[test]
    fn test_enemy_melee_damages_player() {
        let (mut state, tuning) = new_game();
        state.enemies.insert_at(Vec3::new(1.0, 1.0, 0.0), 0.0, &tuning);

        let events = tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
        assert!(events.contains(&GameEvent::PlayerDamaged {
            amount: 10.0,
            health: 90.0
        }));
        assert_eq!(state.player.hit_flash, tuning.player.hit_flash);
    }

    #[test]
    fn test_game_over_fires_once() {
        let (mut state, tuning) = new_game();
        state.player.health = 0.0;

        let mut game_overs = 0;
        for _ in 0..10 {
            let events = tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
            game_overs += events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                .count();
        }
        assert_eq!(game_overs, 1);
        assert!(state.is_game_over());

        // Pausing a finished game does nothing
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert!(tick(&mut state, &pause, &tuning, SIM_DT).is_empty());

        state.restart(1, &tuning);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_killing_blow_on_player() {
        let (mut state, tuning) = new_game();
        state.player.health = 5.0;
        state.enemies.insert_at(Vec3::new(0.0, 1.0, 1.0), 0.0, &tuning);

        let events = tick(&mut state, &TickInput::default(), &tuning, SIM_DT);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        assert_eq!(state.player.health, 0.0);
    }

    #[test]
    fn test_hypnosis_then_drain() {
        let (mut state, tuning) = new_game();
        let id = state.enemies.insert_at(Vec3::new(3.0, 1.0, 0.0), 1.0, &tuning);

        let events = tick(&mut state, &TickInput::casting(Ability::Hypnosis), &tuning, SIM_DT);
        assert!(events.contains(&GameEvent::EnemyStunned { id }));

        state.player.health = 50.0;
        let events = tick(&mut state, &TickInput::casting(Ability::DreamEater), &tuning, SIM_DT);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerHealed { .. })));
        assert_eq!(state.enemies.get(id).unwrap().health, 50.0);
        assert!(state.player.health >= 70.0);
    }

    #[test]
    fn test_hypnosis_and_drain_in_one_tick() {
        let (mut state, tuning) = new_game();
        let id = state.enemies.insert_at(Vec3::new(3.0, 1.0, 0.0), 1.0, &tuning);
        state.player.health = 50.0;

        let mut input = TickInput::casting(Ability::Hypnosis);
        input.cast[Ability::DreamEater.index()] = true;
        let events = tick(&mut state, &input, &tuning, SIM_DT);

        assert!(events.contains(&GameEvent::EnemyStunned { id }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyHit { id: hit, .. } if *hit == id)));
        assert_eq!(state.enemies.get(id).unwrap().health, 50.0);
        assert!(state.player.health >= 70.0);
    }

    #[test]
    fn test_negative_dt_is_harmless() {
        let (mut state, tuning) = new_game();
        state.player.energy = 50.0;
        tick(&mut state, &TickInput::default(), &tuning, -1.0);
        assert_eq!(state.player.energy, 50.0);
        assert_eq!(state.time, 0.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let tuning = Tuning::default();
        let mut state1 = GameState::new(99999, &tuning);
        let mut state2 = GameState::new(99999, &tuning);

        let inputs = [
            TickInput {
                movement: Vec2::new(0.3, -1.0),
                ..Default::default()
            },
            TickInput::casting(Ability::ShadowBall),
            TickInput::casting(Ability::Hypnosis),
            TickInput::default(),
        ];

        for step in 0..2400 {
            let input = &inputs[step % inputs.len()];
            let a = tick(&mut state1, input, &tuning, SIM_DT);
            let b = tick(&mut state2, input, &tuning, SIM_DT);
            assert_eq!(a, b);
        }

        assert_eq!(state1.player, state2.player);
        assert_eq!(state1.enemies.len(), state2.enemies.len());
        for (e1, e2) in state1.enemies.iter().zip(state2.enemies.iter()) {
            assert_eq!(e1, e2);
        }
    }
}
