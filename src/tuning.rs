//! Data-driven game balance
//!
//! Every gameplay number lives here. Defaults match the shipped game; a
//! `tuning.json` served next to the wasm bundle can override any subset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Ability;

/// Errors raised while loading a balance file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Per-ability numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilitySpec {
    /// Seconds before the ability can be cast again
    pub cooldown: f32,
    /// Energy deducted on a successful cast
    pub energy_cost: f32,
    /// Damage dealt by the emitted effect (0 = none)
    pub damage: f32,
    /// Length of the attack animation (cosmetic)
    pub cast_duration: f32,
}

/// Fixed-size lookup table, one entry per ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTable {
    pub shadow_ball: AbilitySpec,
    pub hypnosis: AbilitySpec,
    pub dream_eater: AbilitySpec,
    pub shadow_punch: AbilitySpec,
}

impl AbilityTable {
    pub fn get(&self, ability: Ability) -> &AbilitySpec {
        match ability {
            Ability::ShadowBall => &self.shadow_ball,
            Ability::Hypnosis => &self.hypnosis,
            Ability::DreamEater => &self.dream_eater,
            Ability::ShadowPunch => &self.shadow_punch,
        }
    }

    #[cfg(test)]
    pub fn get_mut(&mut self, ability: Ability) -> &mut AbilitySpec {
        match ability {
            Ability::ShadowBall => &mut self.shadow_ball,
            Ability::Hypnosis => &mut self.hypnosis,
            Ability::DreamEater => &mut self.dream_eater,
            Ability::ShadowPunch => &mut self.shadow_punch,
        }
    }
}

impl Default for AbilityTable {
    fn default() -> Self {
        Self {
            shadow_ball: AbilitySpec {
                cooldown: 2.0,
                energy_cost: 20.0,
                damage: 30.0,
                cast_duration: 0.5,
            },
            hypnosis: AbilitySpec {
                cooldown: 5.0,
                energy_cost: 30.0,
                damage: 0.0, // Stun only
                cast_duration: 1.0,
            },
            dream_eater: AbilitySpec {
                cooldown: 8.0,
                energy_cost: 40.0,
                damage: 50.0,
                cast_duration: 1.5,
            },
            shadow_punch: AbilitySpec {
                cooldown: 1.0,
                energy_cost: 10.0,
                damage: 20.0,
                cast_duration: 0.3,
            },
        }
    }
}

/// Player resources and movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub max_energy: f32,
    /// Energy regenerated per second
    pub energy_regen: f32,
    /// Ground speed in units/second
    pub move_speed: f32,
    /// Health restored by Dream Eater
    pub drain_heal: f32,
    /// Red flash after taking a hit (seconds)
    pub hit_flash: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_energy: 100.0,
            energy_regen: 5.0,
            move_speed: 5.0,
            drain_heal: 20.0,
            hit_flash: 0.2,
        }
    }
}

/// Shadow Ball projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub lifetime: f32,
    /// Launch height above the player's feet
    pub spawn_height: f32,
    /// Hit distance between projectile and enemy centers
    pub collision_radius: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 15.0,
            lifetime: 3.0,
            spawn_height: 1.0,
            collision_radius: 1.5,
        }
    }
}

/// Hypnosis ring, Dream Eater drain and Shadow Punch strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaTuning {
    pub stun_radius: f32,
    pub stun_ring_lifetime: f32,
    pub stun_duration: f32,
    pub drain_radius: f32,
    pub drain_lifetime: f32,
    /// Melee reach; the punch lands half this distance in front of the player
    pub punch_range: f32,
    pub punch_radius: f32,
    pub punch_lifetime: f32,
}

impl Default for AreaTuning {
    fn default() -> Self {
        Self {
            stun_radius: 5.0,
            stun_ring_lifetime: 3.0,
            stun_duration: 3.0,
            drain_radius: 5.0,
            drain_lifetime: 2.0,
            punch_range: 2.0,
            punch_radius: 1.5,
            punch_lifetime: 0.5,
        }
    }
}

/// Enemy spawning and behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Population cap
    pub max_enemies: usize,
    /// Spawn circle radius around the player
    pub spawn_radius: f32,
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    pub spawn_height: f32,
    pub health: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Damage per melee hit on the player
    pub damage: f32,
    /// Ground distance at which melee hits land
    pub attack_range: f32,
    /// Seconds between melee hits
    pub attack_cooldown: f32,
    /// Red flash after taking a hit (seconds)
    pub hit_flash: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            max_enemies: 5,
            spawn_radius: 20.0,
            spawn_interval: 5.0,
            spawn_height: 1.0,
            health: 100.0,
            min_speed: 0.5,
            max_speed: 2.0,
            damage: 10.0,
            attack_range: 2.0,
            attack_cooldown: 1.0,
            hit_flash: 0.2,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub abilities: AbilityTable,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub area: AreaTuning,
    pub enemy: EnemyTuning,
}

impl Tuning {
    /// Parse and validate a balance file. Missing sections keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, value })
            }
        }
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, value })
            }
        }

        for ability in Ability::ALL {
            let spec = self.abilities.get(ability);
            non_negative("abilities.cooldown", spec.cooldown)?;
            non_negative("abilities.damage", spec.damage)?;
            non_negative("abilities.cast_duration", spec.cast_duration)?;
            non_negative("abilities.energy_cost", spec.energy_cost)?;
            if spec.energy_cost > self.player.max_energy {
                return Err(TuningError::OutOfRange {
                    field: "abilities.energy_cost",
                    value: spec.energy_cost,
                });
            }
        }

        positive("player.max_health", self.player.max_health)?;
        positive("player.max_energy", self.player.max_energy)?;
        non_negative("player.energy_regen", self.player.energy_regen)?;
        non_negative("player.move_speed", self.player.move_speed)?;
        non_negative("player.drain_heal", self.player.drain_heal)?;

        positive("projectile.lifetime", self.projectile.lifetime)?;
        non_negative("projectile.speed", self.projectile.speed)?;
        positive("projectile.collision_radius", self.projectile.collision_radius)?;

        positive("area.stun_radius", self.area.stun_radius)?;
        non_negative("area.stun_duration", self.area.stun_duration)?;
        positive("area.drain_radius", self.area.drain_radius)?;
        positive("area.punch_radius", self.area.punch_radius)?;

        positive("enemy.spawn_interval", self.enemy.spawn_interval)?;
        positive("enemy.health", self.enemy.health)?;
        non_negative("enemy.min_speed", self.enemy.min_speed)?;
        if self.enemy.max_speed < self.enemy.min_speed {
            return Err(TuningError::OutOfRange {
                field: "enemy.max_speed",
                value: self.enemy.max_speed,
            });
        }
        non_negative("enemy.attack_cooldown", self.enemy.attack_cooldown)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "enemy": { "max_enemies": 8 } }"#).unwrap();
        assert_eq!(tuning.enemy.max_enemies, 8);
        assert_eq!(tuning.enemy.spawn_radius, 20.0);
        assert_eq!(tuning.abilities, AbilityTable::default());
    }

    #[test]
    fn test_ability_lookup_by_enum() {
        let table = AbilityTable::default();
        assert_eq!(table.get(Ability::ShadowBall).cooldown, 2.0);
        assert_eq!(table.get(Ability::Hypnosis).energy_cost, 30.0);
        assert_eq!(table.get(Ability::DreamEater).damage, 50.0);
        assert_eq!(table.get(Ability::ShadowPunch).cast_duration, 0.3);
    }

    #[test]
    fn test_rejects_negative_cooldown() {
        let mut tuning = Tuning::default();
        tuning.abilities.get_mut(Ability::Hypnosis).cooldown = -1.0;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::OutOfRange { field: "abilities.cooldown", .. })
        ));
    }

    #[test]
    fn test_rejects_cost_above_max_energy() {
        let mut tuning = Tuning::default();
        tuning.abilities.get_mut(Ability::DreamEater).energy_cost = 150.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_shipped_file_matches_defaults() {
        let shipped = Tuning::from_json(include_str!("../assets/tuning.json")).unwrap();
        assert_eq!(shipped, Tuning::default());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(TuningError::Parse(_))));
    }
}
