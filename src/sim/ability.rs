//! Ability identifiers and the cast gate
//!
//! A cast either commits completely (cooldown set, energy deducted, one
//! effect emitted) or does nothing at all.

use serde::{Deserialize, Serialize};

use super::effects::{EffectRegistry, EffectSpawn};
use super::player::PlayerState;
use crate::tuning::Tuning;

/// The four player abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Projectile that damages the first enemy it touches
    ShadowBall,
    /// Ring that stuns enemies inside it
    Hypnosis,
    /// Heals the player and drains stunned enemies nearby
    DreamEater,
    /// Short-range melee strike
    ShadowPunch,
}

impl Ability {
    pub const COUNT: usize = 4;
    pub const ALL: [Ability; Ability::COUNT] = [
        Ability::ShadowBall,
        Ability::Hypnosis,
        Ability::DreamEater,
        Ability::ShadowPunch,
    ];

    /// Index into per-ability arrays
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Ability::ShadowBall => 0,
            Ability::Hypnosis => 1,
            Ability::DreamEater => 2,
            Ability::ShadowPunch => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Ability::ShadowBall => "Shadow Ball",
            Ability::Hypnosis => "Hypnosis",
            Ability::DreamEater => "Dream Eater",
            Ability::ShadowPunch => "Shadow Punch",
        }
    }

    /// HUD element id for this ability's slot
    pub fn dom_id(self) -> &'static str {
        match self {
            Ability::ShadowBall => "shadow-ball",
            Ability::Hypnosis => "hypnosis",
            Ability::DreamEater => "dream-eater",
            Ability::ShadowPunch => "shadow-punch",
        }
    }
}

/// Attempt to cast `ability`.
///
/// Returns false and leaves every piece of state untouched when the ability is
/// cooling down or the player lacks energy.
pub fn try_cast(
    ability: Ability,
    player: &mut PlayerState,
    tuning: &Tuning,
    effects: &mut EffectRegistry,
) -> bool {
    let spec = tuning.abilities.get(ability);
    if !player.can_cast(ability, spec) {
        log::debug!(
            "{} rejected (cooldown {:.2}s, energy {:.1}/{:.1})",
            ability.name(),
            player.cooldown(ability),
            player.energy,
            spec.energy_cost
        );
        return false;
    }

    player.commit_cast(ability, spec);

    let facing = player.facing();
    let spawn = match ability {
        Ability::ShadowBall => {
            let p = &tuning.projectile;
            EffectSpawn::projectile(
                player.position + glam::Vec3::Y * p.spawn_height,
                facing,
                p.speed,
                p.lifetime,
                spec.damage,
            )
        }
        Ability::Hypnosis => EffectSpawn::stun_ring(
            player.position,
            tuning.area.stun_radius,
            tuning.area.stun_ring_lifetime,
        ),
        Ability::DreamEater => {
            player.heal(tuning.player.drain_heal, tuning.player.max_health);
            EffectSpawn::strike(
                player.position,
                tuning.area.drain_radius,
                spec.damage,
                tuning.area.drain_lifetime,
                true,
            )
        }
        Ability::ShadowPunch => {
            let a = &tuning.area;
            EffectSpawn::strike(
                player.position + facing * (a.punch_range / 2.0),
                a.punch_radius,
                spec.damage,
                a.punch_lifetime,
                false,
            )
        }
    };
    effects.spawn(spawn.with_source(ability));

    log::debug!("{} cast, energy now {:.1}", ability.name(), player.energy);
    true
}
