//! Player resources, cooldowns and movement

use glam::{Vec2, Vec3};

use super::ability::Ability;
use crate::consts::GROUND_HALF_EXTENT;
use crate::tuning::{AbilitySpec, Tuning};
use crate::{facing_to_yaw, yaw_to_facing};

/// Cosmetic animation state, driven by movement and casts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlayerAnim {
    #[default]
    Idle,
    Walk,
    /// Attack pose with seconds left before returning to Idle/Walk
    Attack { remaining: f32 },
}

/// The player-controlled ghost
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Feet position on the ground plane (y = 0)
    pub position: Vec3,
    /// Facing angle in radians, 0 = +Z
    pub yaw: f32,
    pub health: f32,
    pub energy: f32,
    /// Remaining cooldown per ability, indexed by `Ability::index()`
    pub cooldowns: [f32; Ability::COUNT],
    pub anim: PlayerAnim,
    /// Seconds of red tint left after being hit
    pub hit_flash: f32,
}

impl PlayerState {
    /// Full health and energy, at the origin, facing away from the camera
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: std::f32::consts::PI,
            health: tuning.player.max_health,
            energy: tuning.player.max_energy,
            cooldowns: [0.0; Ability::COUNT],
            anim: PlayerAnim::Idle,
            hit_flash: 0.0,
        }
    }

    pub fn reset(&mut self, tuning: &Tuning) {
        *self = Self::new(tuning);
    }

    /// Advance cooldowns, energy regen and visual timers.
    ///
    /// Cooldowns stop at 0 and energy at max; a negative `dt` is treated as 0.
    pub fn tick(&mut self, dt: f32, tuning: &Tuning) {
        let dt = dt.max(0.0);

        for cooldown in &mut self.cooldowns {
            *cooldown = (*cooldown - dt).max(0.0);
        }
        self.energy = (self.energy + tuning.player.energy_regen * dt).min(tuning.player.max_energy);
        self.hit_flash = (self.hit_flash - dt).max(0.0);

        if let PlayerAnim::Attack { remaining } = self.anim {
            let remaining = remaining - dt;
            self.anim = if remaining > 0.0 {
                PlayerAnim::Attack { remaining }
            } else {
                PlayerAnim::Idle
            };
        }
    }

    /// Walk along a ground-plane direction (x = world X, y = world Z).
    ///
    /// The direction is normalized, so diagonals are no faster. A zero
    /// direction leaves position and facing alone.
    pub fn move_by(&mut self, direction: Vec2, dt: f32, tuning: &Tuning) {
        let dt = dt.max(0.0);
        let moving = direction.length_squared() > 1e-6;

        if moving {
            let dir = direction.normalize();
            let step = Vec3::new(dir.x, 0.0, dir.y);
            self.position += step * tuning.player.move_speed * dt;
            self.position.x = self.position.x.clamp(-GROUND_HALF_EXTENT, GROUND_HALF_EXTENT);
            self.position.z = self.position.z.clamp(-GROUND_HALF_EXTENT, GROUND_HALF_EXTENT);
            self.yaw = facing_to_yaw(step);
        }

        // Attack pose wins until it runs out
        if !matches!(self.anim, PlayerAnim::Attack { .. }) {
            self.anim = if moving { PlayerAnim::Walk } else { PlayerAnim::Idle };
        }
    }

    #[inline]
    pub fn facing(&self) -> Vec3 {
        yaw_to_facing(self.yaw)
    }

    #[inline]
    pub fn cooldown(&self, ability: Ability) -> f32 {
        self.cooldowns[ability.index()]
    }

    /// Remaining cooldown as 0-100 for the HUD
    pub fn cooldown_percent(&self, ability: Ability, spec: &AbilitySpec) -> f32 {
        if spec.cooldown <= 0.0 {
            return 0.0;
        }
        (self.cooldown(ability) * 100.0 / spec.cooldown).clamp(0.0, 100.0)
    }

    /// Off cooldown and enough energy
    pub fn can_cast(&self, ability: Ability, spec: &AbilitySpec) -> bool {
        self.cooldown(ability) <= 0.0 && self.energy >= spec.energy_cost
    }

    /// Start the cooldown, pay the energy and strike the attack pose.
    /// Callers check `can_cast` first.
    pub fn commit_cast(&mut self, ability: Ability, spec: &AbilitySpec) {
        self.cooldowns[ability.index()] = spec.cooldown;
        self.energy = (self.energy - spec.energy_cost).max(0.0);
        self.anim = PlayerAnim::Attack {
            remaining: spec.cast_duration,
        };
    }

    /// Apply damage, returning the amount actually removed
    pub fn take_damage(&mut self, amount: f32, flash: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.hit_flash = flash;
        before - self.health
    }

    /// Restore health up to `max`, returning the amount actually restored
    pub fn heal(&mut self, amount: f32, max: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).min(max);
        self.health - before
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_full() {
        let tuning = Tuning::default();
        let player = PlayerState::new(&tuning);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.energy, 100.0);
        assert!(player.cooldowns.iter().all(|&c| c == 0.0));
        // Faces -Z, away from the follow camera
        assert!((player.facing() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_tick_regenerates_and_clamps() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        player.energy = 90.0;
        player.cooldowns[Ability::Hypnosis.index()] = 0.5;

        player.tick(1.0, &tuning);
        assert_eq!(player.energy, 95.0);
        assert_eq!(player.cooldown(Ability::Hypnosis), 0.0);

        player.tick(10.0, &tuning);
        assert_eq!(player.energy, 100.0);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        player.energy = 50.0;
        player.cooldowns[0] = 1.0;
        player.tick(-5.0, &tuning);
        assert_eq!(player.energy, 50.0);
        assert_eq!(player.cooldowns[0], 1.0);
    }

    #[test]
    fn test_attack_anim_expires() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        player.commit_cast(Ability::ShadowPunch, tuning.abilities.get(Ability::ShadowPunch));
        assert!(matches!(player.anim, PlayerAnim::Attack { .. }));

        // Walking doesn't cancel the attack pose
        player.move_by(Vec2::X, 0.1, &tuning);
        assert!(matches!(player.anim, PlayerAnim::Attack { .. }));

        player.tick(0.5, &tuning);
        assert_eq!(player.anim, PlayerAnim::Idle);
    }

    #[test]
    fn test_move_faces_direction() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        player.move_by(Vec2::new(1.0, 0.0), 1.0, &tuning);
        assert!((player.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert!((player.facing() - Vec3::X).length() < 1e-5);
        assert_eq!(player.anim, PlayerAnim::Walk);

        player.move_by(Vec2::ZERO, 1.0, &tuning);
        assert_eq!(player.anim, PlayerAnim::Idle);
        assert!((player.facing() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_diagonal_not_faster() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        player.move_by(Vec2::new(1.0, 1.0), 1.0, &tuning);
        assert!((player.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_move_clamped_to_ground() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        player.move_by(Vec2::new(0.0, -1.0), 100.0, &tuning);
        assert_eq!(player.position.z, -GROUND_HALF_EXTENT);
    }

    #[test]
    fn test_damage_and_heal_clamp() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        assert_eq!(player.take_damage(30.0, 0.2), 30.0);
        assert_eq!(player.hit_flash, 0.2);
        assert_eq!(player.heal(50.0, 100.0), 30.0);
        assert_eq!(player.health, 100.0);
        assert_eq!(player.take_damage(500.0, 0.2), 100.0);
        assert!(player.is_dead());
        assert_eq!(player.health, 0.0);
    }

    #[test]
    fn test_cooldown_percent() {
        let tuning = Tuning::default();
        let mut player = PlayerState::new(&tuning);
        let spec = *tuning.abilities.get(Ability::DreamEater);
        player.commit_cast(Ability::DreamEater, &spec);
        assert_eq!(player.cooldown_percent(Ability::DreamEater, &spec), 100.0);
        player.tick(4.0, &tuning);
        assert_eq!(player.cooldown_percent(Ability::DreamEater, &spec), 50.0);

        let instant = AbilitySpec {
            cooldown: 0.0,
            ..spec
        };
        assert_eq!(player.cooldown_percent(Ability::DreamEater, &instant), 0.0);
    }

    proptest! {
        #[test]
        fn prop_tick_keeps_resources_in_range(
            start_energy in 0.0f32..=100.0,
            cooldowns in prop::array::uniform4(0.0f32..10.0),
            dts in prop::collection::vec(0.0f32..2.0, 1..50),
        ) {
            let tuning = Tuning::default();
            let mut player = PlayerState::new(&tuning);
            player.energy = start_energy;
            player.cooldowns = cooldowns;

            for dt in dts {
                player.tick(dt, &tuning);
                prop_assert!(player.cooldowns.iter().all(|&c| c >= 0.0));
                prop_assert!((0.0..=100.0).contains(&player.energy));
            }
        }

        #[test]
        fn prop_health_stays_in_range(
            ops in prop::collection::vec((any::<bool>(), 0.0f32..200.0), 1..30),
        ) {
            let tuning = Tuning::default();
            let mut player = PlayerState::new(&tuning);
            for (hurt, amount) in ops {
                if hurt {
                    player.take_damage(amount, 0.2);
                } else {
                    player.heal(amount, tuning.player.max_health);
                }
                prop_assert!((0.0..=100.0).contains(&player.health));
            }
        }
    }
}
