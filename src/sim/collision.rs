//! Effect vs enemy collision scan
//!
//! `resolve` only reads the registries and reports what should happen;
//! `CollisionOutcome::apply` then performs it. Keeping the two apart makes
//! the scan itself trivially testable and stops a half-applied frame from
//! ever being observed.

use glam::Vec3;

use super::effects::{EffectHandle, EffectKind, EffectRegistry};
use super::enemy::{EnemyId, EnemyRegistry};
use crate::tuning::Tuning;

/// Everything one scan decided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    /// Damage to apply, in scan order
    pub damaged: Vec<(EnemyId, f32)>,
    /// Enemies to (re)stun for the full stun duration
    pub stunned: Vec<EnemyId>,
    /// Projectiles that hit something and must be removed
    pub consumed: Vec<EffectHandle>,
    /// Strikes whose damage has now been dealt
    pub spent: Vec<EffectHandle>,
}

/// A damage application that actually landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub enemy: EnemyId,
    pub amount: f32,
    pub position: Vec3,
    /// Health left after the hit
    pub health: f32,
}

/// What `apply` changed, for events and hit sparks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedCollisions {
    pub hits: Vec<Hit>,
    /// Enemies that were not stunned before this scan
    pub newly_stunned: Vec<EnemyId>,
}

impl CollisionOutcome {
    pub fn is_empty(&self) -> bool {
        self.damaged.is_empty() && self.stunned.is_empty() && self.consumed.is_empty() && self.spent.is_empty()
    }

    /// Perform the outcome against the registries.
    ///
    /// Dead enemies are left in place; the caller removes them once all
    /// damage for the tick is in.
    pub fn apply(&self, effects: &mut EffectRegistry, enemies: &mut EnemyRegistry, tuning: &Tuning) -> AppliedCollisions {
        let mut applied = AppliedCollisions::default();

        for &handle in &self.consumed {
            effects.consume(handle);
        }
        for &handle in &self.spent {
            effects.mark_spent(handle);
        }

        for &(id, amount) in &self.damaged {
            if let Some(health) = enemies.damage(id, amount) {
                if let Some(enemy) = enemies.get_mut(id) {
                    enemy.hit_flash = tuning.enemy.hit_flash;
                    applied.hits.push(Hit {
                        enemy: id,
                        amount,
                        position: enemy.position,
                        health,
                    });
                }
            }
        }

        for &id in &self.stunned {
            let was_stunned = enemies.get(id).is_some_and(|e| e.is_stunned());
            if enemies.stun(id, tuning.area.stun_duration) && !was_stunned {
                applied.newly_stunned.push(id);
            }
        }

        applied
    }
}

/// Scan every live effect against every living enemy.
///
/// - A projectile hits when its center is closer than the collision radius to
///   an enemy center. It hits at most one enemy: the earliest spawned one in
///   range.
/// - A stun ring stuns every enemy within its radius, every frame it lives.
/// - A strike damages every enemy within its radius once (only stunned ones
///   for a drain, counting stuns from this same scan) and is then spent.
pub fn resolve(effects: &EffectRegistry, enemies: &EnemyRegistry, tuning: &Tuning) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let hit_radius = tuning.projectile.collision_radius;

    // Stuns land first so a drain cast alongside a ring sees them
    for effect in effects.iter() {
        let (EffectKind::Area, Some(radius), true) = (effect.kind, effect.radius, effect.stuns) else {
            continue;
        };
        for enemy in enemies.enemies_in_radius(effect.position, radius) {
            if !outcome.stunned.contains(&enemy.id) {
                outcome.stunned.push(enemy.id);
            }
        }
    }

    for effect in effects.iter() {
        match effect.kind {
            EffectKind::Projectile => {
                let Some(damage) = effect.damage else { continue };
                let target = enemies
                    .iter()
                    .find(|e| !e.is_dead() && e.position.distance(effect.position) < hit_radius);
                if let Some(enemy) = target {
                    outcome.damaged.push((enemy.id, damage));
                    outcome.consumed.push(effect.id);
                }
            }
            EffectKind::Strike { stunned_only } => {
                let (Some(damage), Some(radius)) = (effect.damage, effect.radius) else {
                    continue;
                };
                for enemy in enemies.enemies_in_radius(effect.position, radius) {
                    if !stunned_only || enemy.is_stunned() || outcome.stunned.contains(&enemy.id) {
                        outcome.damaged.push((enemy.id, damage));
                    }
                }
                outcome.spent.push(effect.id);
            }
            EffectKind::Area | EffectKind::Burst(_) => {}
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectSpawn;
    use crate::sim::enemy::EnemyStatus;

    fn setup() -> (EffectRegistry, EnemyRegistry, Tuning) {
        (EffectRegistry::new(), EnemyRegistry::new(), Tuning::default())
    }

    #[test]
    fn test_projectile_hits_and_is_consumed() {
        let (mut effects, mut enemies, tuning) = setup();
        let enemy = enemies.insert_at(Vec3::new(0.0, 1.0, 5.0), 1.0, &tuning);
        let ball = effects.spawn(EffectSpawn::projectile(Vec3::new(0.0, 1.0, 4.0), Vec3::Z, 15.0, 3.0, 30.0));

        let outcome = resolve(&effects, &enemies, &tuning);
        assert_eq!(outcome.damaged, vec![(enemy, 30.0)]);
        assert_eq!(outcome.consumed, vec![ball]);

        let applied = outcome.apply(&mut effects, &mut enemies, &tuning);
        assert_eq!(applied.hits.len(), 1);
        assert_eq!(enemies.get(enemy).unwrap().health, 70.0);
        assert_eq!(enemies.get(enemy).unwrap().hit_flash, tuning.enemy.hit_flash);
        assert!(effects.get(ball).is_none());

        // Second scan finds nothing left to do
        let again = resolve(&effects, &enemies, &tuning);
        assert!(again.is_empty());
        again.apply(&mut effects, &mut enemies, &tuning);
        assert_eq!(enemies.get(enemy).unwrap().health, 70.0);
    }

    #[test]
    fn test_projectile_miss() {
        let (mut effects, mut enemies, tuning) = setup();
        enemies.insert_at(Vec3::new(0.0, 1.0, 5.0), 1.0, &tuning);
        effects.spawn(EffectSpawn::projectile(Vec3::new(0.0, 1.0, 3.4), Vec3::Z, 15.0, 3.0, 30.0));
        assert!(resolve(&effects, &enemies, &tuning).is_empty());
    }

    #[test]
    fn test_projectile_tie_goes_to_earliest_spawned() {
        let (mut effects, mut enemies, tuning) = setup();
        // The later enemy is closer, but spawn order decides
        let first = enemies.insert_at(Vec3::new(1.0, 1.0, 0.0), 1.0, &tuning);
        let second = enemies.insert_at(Vec3::new(0.2, 1.0, 0.0), 1.0, &tuning);
        effects.spawn(EffectSpawn::projectile(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 15.0, 3.0, 30.0));

        let outcome = resolve(&effects, &enemies, &tuning);
        assert_eq!(outcome.damaged, vec![(first, 30.0)]);
        outcome.apply(&mut effects, &mut enemies, &tuning);
        assert_eq!(enemies.get(second).unwrap().health, 100.0);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_stun_ring_scenario() {
        let (mut effects, mut enemies, tuning) = setup();
        let id = enemies.insert_at(Vec3::new(4.0, 0.0, 0.0), 1.0, &tuning);
        effects.spawn(EffectSpawn::stun_ring(Vec3::ZERO, 5.0, 3.0));

        let applied = resolve(&effects, &enemies, &tuning).apply(&mut effects, &mut enemies, &tuning);
        assert_eq!(applied.newly_stunned, vec![id]);
        assert_eq!(enemies.get(id).unwrap().stun_time, 3.0);

        // 3.1 seconds of ticking without the ring
        effects.clear();
        for _ in 0..31 {
            enemies.tick(0.1, Vec3::ZERO, &tuning);
        }
        assert_eq!(enemies.get(id).unwrap().status(), EnemyStatus::Active);

        enemies.tick(0.1, Vec3::ZERO, &tuning);
        assert!(enemies.get(id).unwrap().position.x < 4.0, "pursuit resumed");
    }

    #[test]
    fn test_restun_is_not_newly_stunned() {
        let (mut effects, mut enemies, tuning) = setup();
        let id = enemies.insert_at(Vec3::new(2.0, 0.0, 0.0), 1.0, &tuning);
        effects.spawn(EffectSpawn::stun_ring(Vec3::ZERO, 5.0, 3.0));

        resolve(&effects, &enemies, &tuning).apply(&mut effects, &mut enemies, &tuning);
        enemies.tick(1.0, Vec3::ZERO, &tuning);
        assert_eq!(enemies.get(id).unwrap().stun_time, 2.0);

        let applied = resolve(&effects, &enemies, &tuning).apply(&mut effects, &mut enemies, &tuning);
        assert!(applied.newly_stunned.is_empty());
        assert_eq!(enemies.get(id).unwrap().stun_time, 3.0);
    }

    #[test]
    fn test_enemy_outside_ring_untouched() {
        let (mut effects, mut enemies, tuning) = setup();
        enemies.insert_at(Vec3::new(6.0, 0.0, 0.0), 1.0, &tuning);
        effects.spawn(EffectSpawn::stun_ring(Vec3::ZERO, 5.0, 3.0));
        assert!(resolve(&effects, &enemies, &tuning).stunned.is_empty());
    }

    #[test]
    fn test_strike_lands_once() {
        let (mut effects, mut enemies, tuning) = setup();
        let a = enemies.insert_at(Vec3::new(0.5, 1.0, 0.0), 1.0, &tuning);
        let b = enemies.insert_at(Vec3::new(-0.5, 1.0, 0.0), 1.0, &tuning);
        let punch = effects.spawn(EffectSpawn::strike(Vec3::new(0.0, 1.0, 0.0), 1.5, 20.0, 0.5, false));

        let outcome = resolve(&effects, &enemies, &tuning);
        assert_eq!(outcome.damaged, vec![(a, 20.0), (b, 20.0)]);
        assert_eq!(outcome.spent, vec![punch]);
        outcome.apply(&mut effects, &mut enemies, &tuning);

        // Still visible, no longer harmful
        assert!(effects.get(punch).is_some());
        assert!(resolve(&effects, &enemies, &tuning).is_empty());
        assert_eq!(enemies.get(a).unwrap().health, 80.0);
    }

    #[test]
    fn test_drain_only_hits_stunned() {
        let (mut effects, mut enemies, tuning) = setup();
        let awake = enemies.insert_at(Vec3::new(1.0, 1.0, 0.0), 1.0, &tuning);
        let dazed = enemies.insert_at(Vec3::new(-1.0, 1.0, 0.0), 1.0, &tuning);
        enemies.stun(dazed, 3.0);
        effects.spawn(EffectSpawn::strike(Vec3::ZERO, 5.0, 50.0, 2.0, true));

        resolve(&effects, &enemies, &tuning).apply(&mut effects, &mut enemies, &tuning);
        assert_eq!(enemies.get(awake).unwrap().health, 100.0);
        assert_eq!(enemies.get(dazed).unwrap().health, 50.0);
    }

    #[test]
    fn test_drain_sees_stun_from_same_scan() {
        let (mut effects, mut enemies, tuning) = setup();
        let id = enemies.insert_at(Vec3::new(3.0, 1.0, 0.0), 1.0, &tuning);
        // Drain listed ahead of the ring
        effects.spawn(EffectSpawn::strike(Vec3::ZERO, 5.0, 50.0, 2.0, true));
        effects.spawn(EffectSpawn::stun_ring(Vec3::ZERO, 5.0, 3.0));

        let outcome = resolve(&effects, &enemies, &tuning);
        assert_eq!(outcome.stunned, vec![id]);
        assert_eq!(outcome.damaged, vec![(id, 50.0)]);

        let applied = outcome.apply(&mut effects, &mut enemies, &tuning);
        assert_eq!(applied.newly_stunned, vec![id]);
        assert_eq!(enemies.get(id).unwrap().health, 50.0);
    }

    #[test]
    fn test_dead_enemies_ignored() {
        let (mut effects, mut enemies, tuning) = setup();
        let dead = enemies.insert_at(Vec3::new(0.0, 1.0, 0.0), 1.0, &tuning);
        let alive = enemies.insert_at(Vec3::new(0.5, 1.0, 0.0), 1.0, &tuning);
        enemies.damage(dead, 1000.0);
        effects.spawn(EffectSpawn::projectile(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 15.0, 3.0, 30.0));

        let outcome = resolve(&effects, &enemies, &tuning);
        assert_eq!(outcome.damaged, vec![(alive, 30.0)]);
    }
}
