//! Transient effects: projectiles, rings, strikes and particle bursts
//!
//! Every effect ages by the frame delta and disappears once its age reaches
//! its lifetime. Projectiles additionally travel along their direction and
//! are consumed by the collision scan on their first hit.

use glam::Vec3;

use super::ability::Ability;
use crate::consts::MAX_EFFECTS;

/// Stable identifier of an effect within one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(u32);

/// Look of a purely visual burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstStyle {
    /// Purple sparks where an attack connects
    Spark,
    /// Dark puff where an enemy dies
    Smoke,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    /// Travels along `direction`, damages the first enemy it touches
    Projectile,
    /// Stationary ring; stuns enemies within `radius` while alive when `stuns`
    Area,
    /// Stationary one-shot damage within `radius`
    Strike {
        /// Only enemies that are stunned at scan time take damage
        stunned_only: bool,
    },
    /// Visual only
    Burst(BurstStyle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub id: EffectHandle,
    pub kind: EffectKind,
    pub position: Vec3,
    /// Unit travel direction (projectiles) or facing (everything else)
    pub direction: Vec3,
    pub speed: f32,
    pub age: f32,
    pub lifetime: f32,
    pub radius: Option<f32>,
    /// Damage still to be dealt; `None` once spent or for harmless effects
    pub damage: Option<f32>,
    pub stuns: bool,
    pub source: Option<Ability>,
    /// Cosmetic particle layout seed
    pub seed: u32,
}

impl Effect {
    /// Fraction of lifetime elapsed, 0..=1
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.age / self.lifetime).clamp(0.0, 1.0)
    }

    /// Ring pulse multiplier applied to `radius` when drawing
    pub fn pulse_scale(&self) -> f32 {
        1.0 + 0.2 * (self.progress() * std::f32::consts::PI * 10.0).sin()
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Description of an effect to add to the registry
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSpawn {
    pub kind: EffectKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub lifetime: f32,
    pub radius: Option<f32>,
    pub damage: Option<f32>,
    pub stuns: bool,
    pub source: Option<Ability>,
}

impl EffectSpawn {
    fn stationary(kind: EffectKind, position: Vec3, lifetime: f32) -> Self {
        Self {
            kind,
            position,
            direction: Vec3::Z,
            speed: 0.0,
            lifetime,
            radius: None,
            damage: None,
            stuns: false,
            source: None,
        }
    }

    pub fn projectile(position: Vec3, direction: Vec3, speed: f32, lifetime: f32, damage: f32) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::Z),
            speed,
            damage: Some(damage),
            ..Self::stationary(EffectKind::Projectile, position, lifetime)
        }
    }

    pub fn stun_ring(position: Vec3, radius: f32, lifetime: f32) -> Self {
        Self {
            radius: Some(radius),
            stuns: true,
            ..Self::stationary(EffectKind::Area, position, lifetime)
        }
    }

    pub fn strike(position: Vec3, radius: f32, damage: f32, lifetime: f32, stunned_only: bool) -> Self {
        Self {
            radius: Some(radius),
            damage: (damage > 0.0).then_some(damage),
            ..Self::stationary(EffectKind::Strike { stunned_only }, position, lifetime)
        }
    }

    pub fn burst(position: Vec3, style: BurstStyle, lifetime: f32) -> Self {
        Self::stationary(EffectKind::Burst(style), position, lifetime)
    }

    pub fn with_source(mut self, ability: Ability) -> Self {
        self.source = Some(ability);
        self
    }
}

/// Owns every live effect in spawn order
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: Vec<Effect>,
    next_id: u32,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect. When over capacity the oldest visual burst is dropped;
    /// gameplay effects are never evicted.
    pub fn spawn(&mut self, spawn: EffectSpawn) -> EffectHandle {
        let id = EffectHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        self.effects.push(Effect {
            id,
            kind: spawn.kind,
            position: spawn.position,
            direction: spawn.direction,
            speed: spawn.speed,
            age: 0.0,
            lifetime: spawn.lifetime.max(0.0),
            radius: spawn.radius,
            damage: spawn.damage,
            stuns: spawn.stuns,
            source: spawn.source,
            seed: id.0.wrapping_mul(0x9E37_79B9),
        });

        if self.effects.len() > MAX_EFFECTS {
            let oldest_burst = self
                .effects
                .iter()
                .position(|e| matches!(e.kind, EffectKind::Burst(_)));
            if let Some(index) = oldest_burst {
                self.effects.remove(index);
            }
        }

        id
    }

    /// Age every effect, move projectiles, and drop the expired ones.
    /// Returns how many expired.
    pub fn tick(&mut self, dt: f32) -> usize {
        let dt = dt.max(0.0);
        for effect in &mut self.effects {
            effect.age += dt;
            if effect.kind == EffectKind::Projectile {
                effect.position += effect.direction * effect.speed * dt;
            }
        }

        let before = self.effects.len();
        self.effects.retain(|e| !e.is_expired());
        before - self.effects.len()
    }

    /// Remove an effect early. Unknown or already-removed handles are a no-op.
    pub fn consume(&mut self, handle: EffectHandle) -> bool {
        match self.effects.iter().position(|e| e.id == handle) {
            Some(index) => {
                self.effects.remove(index);
                true
            }
            None => false,
        }
    }

    /// Clear the damage of a strike that has landed; it stays for visuals
    pub fn mark_spent(&mut self, handle: EffectHandle) -> bool {
        match self.effects.iter_mut().find(|e| e.id == handle) {
            Some(effect) => effect.damage.take().is_some(),
            None => false,
        }
    }

    pub fn get(&self, handle: EffectHandle) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ring() -> EffectSpawn {
        EffectSpawn::stun_ring(Vec3::ZERO, 5.0, 1.0)
    }

    #[test]
    fn test_expires_exactly_at_lifetime() {
        let mut effects = EffectRegistry::new();
        effects.spawn(ring());

        assert_eq!(effects.tick(0.5), 0);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.tick(0.25), 0);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.tick(0.25), 1);
        assert!(effects.is_empty());

        // Already gone, stays gone
        assert_eq!(effects.tick(0.25), 0);
    }

    #[test]
    fn test_adjacent_expiries_in_one_tick() {
        let mut effects = EffectRegistry::new();
        let first = effects.spawn(EffectSpawn::stun_ring(Vec3::ZERO, 5.0, 0.5));
        let second = effects.spawn(EffectSpawn::strike(Vec3::ZERO, 1.5, 20.0, 0.5, false));
        let survivor = effects.spawn(EffectSpawn::stun_ring(Vec3::X, 5.0, 2.0));
        let third = effects.spawn(EffectSpawn::burst(Vec3::ZERO, BurstStyle::Spark, 0.4));
        let fourth = effects.spawn(EffectSpawn::burst(Vec3::ZERO, BurstStyle::Smoke, 0.3));

        assert_eq!(effects.tick(0.5), 4);
        assert_eq!(effects.len(), 1);
        for gone in [first, second, third, fourth] {
            assert!(effects.get(gone).is_none());
        }
        // Aged exactly once
        assert_eq!(effects.get(survivor).unwrap().age, 0.5);

        assert_eq!(effects.tick(0.5), 0);
        assert_eq!(effects.get(survivor).unwrap().age, 1.0);
    }

    #[test]
    fn test_projectile_travels() {
        let mut effects = EffectRegistry::new();
        let id = effects.spawn(EffectSpawn::projectile(Vec3::Y, Vec3::X, 15.0, 3.0, 30.0));
        effects.tick(0.5);
        let ball = effects.get(id).unwrap();
        assert!((ball.position - Vec3::new(7.5, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_stationary_effects_stay_put() {
        let mut effects = EffectRegistry::new();
        let id = effects.spawn(EffectSpawn::strike(Vec3::ONE, 1.5, 20.0, 0.5, false));
        effects.tick(0.25);
        assert_eq!(effects.get(id).unwrap().position, Vec3::ONE);
    }

    #[test]
    fn test_consume_is_idempotent() {
        let mut effects = EffectRegistry::new();
        let id = effects.spawn(ring());
        assert!(effects.consume(id));
        assert!(!effects.consume(id));
        assert!(effects.get(id).is_none());
    }

    #[test]
    fn test_mark_spent_once() {
        let mut effects = EffectRegistry::new();
        let id = effects.spawn(EffectSpawn::strike(Vec3::ZERO, 1.5, 20.0, 0.5, false));
        assert!(effects.mark_spent(id));
        assert!(!effects.mark_spent(id));
        assert_eq!(effects.get(id).unwrap().damage, None);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_zero_damage_strike_is_harmless() {
        let spawn = EffectSpawn::strike(Vec3::ZERO, 5.0, 0.0, 1.0, false);
        assert_eq!(spawn.damage, None);
    }

    #[test]
    fn test_handles_are_unique_after_removal() {
        let mut effects = EffectRegistry::new();
        let a = effects.spawn(ring());
        effects.consume(a);
        let b = effects.spawn(ring());
        assert_ne!(a, b);
    }

    #[test]
    fn test_cap_evicts_oldest_burst_only() {
        let mut effects = EffectRegistry::new();
        let ball = effects.spawn(EffectSpawn::projectile(Vec3::ZERO, Vec3::Z, 1.0, 100.0, 1.0));
        let first_burst = effects.spawn(EffectSpawn::burst(Vec3::ZERO, BurstStyle::Spark, 100.0));
        for _ in 0..MAX_EFFECTS {
            effects.spawn(EffectSpawn::burst(Vec3::ZERO, BurstStyle::Smoke, 100.0));
        }
        assert_eq!(effects.len(), MAX_EFFECTS);
        assert!(effects.get(ball).is_some());
        assert!(effects.get(first_burst).is_none());
    }

    #[test]
    fn test_pulse_scale_bounds() {
        let mut effects = EffectRegistry::new();
        let id = effects.spawn(ring());
        assert!((effects.get(id).unwrap().pulse_scale() - 1.0).abs() < 1e-5);
        effects.tick(0.05);
        // progress 0.05 puts sin at its peak
        assert!((effects.get(id).unwrap().pulse_scale() - 1.2).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_never_outlives_lifetime(
            lifetime in 0.01f32..5.0,
            dts in prop::collection::vec(0.0f32..0.5, 1..60),
        ) {
            let mut effects = EffectRegistry::new();
            let id = effects.spawn(EffectSpawn::stun_ring(Vec3::ZERO, 1.0, lifetime));
            let mut age = 0.0f32;
            for dt in dts {
                effects.tick(dt);
                age += dt;
                match effects.get(id) {
                    Some(effect) => prop_assert!(effect.age < effect.lifetime),
                    None => prop_assert!(age >= lifetime),
                }
            }
        }
    }
}
