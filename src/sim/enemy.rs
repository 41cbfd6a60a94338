//! Enemy population: spawning, pursuit, melee and stun
//!
//! Enemies walk straight at the player on the ground plane and hit once per
//! attack cooldown while in melee range. Damage to the player is reported
//! back to the caller instead of being applied here.

use glam::Vec3;
use rand::Rng;

use crate::tuning::Tuning;
use crate::{facing_to_yaw, ground_delta, ground_distance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

/// Per-enemy state machine: `Active <-> Stunned -> Dead`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyStatus {
    Active,
    Stunned,
    Dead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    pub position: Vec3,
    /// Facing angle, turned toward the player while pursuing
    pub yaw: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    /// Damage per melee hit
    pub damage: f32,
    /// Seconds of stun left; stunned while > 0
    pub stun_time: f32,
    /// Seconds until the next melee hit may land
    pub attack_cooldown: f32,
    pub hit_flash: f32,
}

impl Enemy {
    pub fn status(&self) -> EnemyStatus {
        if self.health <= 0.0 {
            EnemyStatus::Dead
        } else if self.stun_time > 0.0 {
            EnemyStatus::Stunned
        } else {
            EnemyStatus::Active
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.status() == EnemyStatus::Stunned
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// A melee hit on the player, reported by `EnemyRegistry::tick`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub enemy: EnemyId,
    pub amount: f32,
    /// Attacker position when the hit landed
    pub position: Vec3,
}

/// All enemies in spawn order
#[derive(Debug, Clone, Default)]
pub struct EnemyRegistry {
    enemies: Vec<Enemy>,
    next_id: u32,
    spawn_timer: f32,
}

impl EnemyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate time and make one spawn attempt every `spawn_interval`.
    ///
    /// The timer resets on every attempt, so a long delta still yields at
    /// most one spawn.
    pub fn advance_spawn_timer<R: Rng>(
        &mut self,
        dt: f32,
        rng: &mut R,
        player_pos: Vec3,
        tuning: &Tuning,
    ) -> Option<EnemyId> {
        self.spawn_timer += dt.max(0.0);
        if self.spawn_timer < tuning.enemy.spawn_interval {
            return None;
        }
        self.spawn_timer = 0.0;
        self.try_spawn(rng, player_pos, tuning)
    }

    /// Spawn one enemy on the spawn circle around the player, unless the
    /// population is at the cap
    pub fn try_spawn<R: Rng>(&mut self, rng: &mut R, player_pos: Vec3, tuning: &Tuning) -> Option<EnemyId> {
        let t = &tuning.enemy;
        if self.alive_count() >= t.max_enemies {
            log::trace!("Spawn skipped, {} enemies at cap", self.alive_count());
            return None;
        }

        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed = t.min_speed + rng.random::<f32>() * (t.max_speed - t.min_speed);
        let position = Vec3::new(
            player_pos.x + angle.cos() * t.spawn_radius,
            t.spawn_height,
            player_pos.z + angle.sin() * t.spawn_radius,
        );

        let id = EnemyId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.enemies.push(Enemy {
            id,
            position,
            yaw: facing_to_yaw(ground_delta(position, player_pos)),
            health: t.health,
            max_health: t.health,
            speed,
            damage: t.damage,
            stun_time: 0.0,
            attack_cooldown: 0.0,
            hit_flash: 0.0,
        });
        log::debug!("Enemy {} spawned at ({:.1}, {:.1}), speed {:.2}", id.0, position.x, position.z, speed);
        Some(id)
    }

    /// Advance every enemy by `dt` and collect melee hits on the player.
    ///
    /// Stunned enemies only count their stun down. An enemy whose stun runs
    /// out this tick starts moving again on the next one. Dead enemies are
    /// removed at the end.
    pub fn tick(&mut self, dt: f32, player_pos: Vec3, tuning: &Tuning) -> Vec<DamageEvent> {
        let dt = dt.max(0.0);
        let t = &tuning.enemy;
        let mut hits = Vec::new();

        for enemy in &mut self.enemies {
            if enemy.is_dead() {
                continue;
            }
            enemy.hit_flash = (enemy.hit_flash - dt).max(0.0);

            if enemy.stun_time > 0.0 {
                enemy.stun_time = (enemy.stun_time - dt).max(0.0);
                continue;
            }

            let to_player = ground_delta(enemy.position, player_pos);
            let dist = to_player.length();
            if dist > f32::EPSILON {
                let step = (enemy.speed * dt).min(dist);
                enemy.position += to_player / dist * step;
                enemy.yaw = facing_to_yaw(to_player);
            }

            enemy.attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);
            if ground_distance(enemy.position, player_pos) < t.attack_range && enemy.attack_cooldown <= 0.0 {
                enemy.attack_cooldown = t.attack_cooldown;
                hits.push(DamageEvent {
                    enemy: enemy.id,
                    amount: enemy.damage,
                    position: enemy.position,
                });
            }
        }

        self.remove_dead();
        hits
    }

    /// Subtract health, returning what is left. Dead or unknown enemies are
    /// left alone.
    pub fn damage(&mut self, id: EnemyId, amount: f32) -> Option<f32> {
        let enemy = self.get_mut(id)?;
        if enemy.is_dead() {
            return None;
        }
        enemy.health = (enemy.health - amount.max(0.0)).max(0.0);
        Some(enemy.health)
    }

    /// Set the stun timer to `duration`. Re-stunning overwrites, never stacks.
    pub fn stun(&mut self, id: EnemyId, duration: f32) -> bool {
        match self.get_mut(id) {
            Some(enemy) if !enemy.is_dead() => {
                enemy.stun_time = duration.max(0.0);
                true
            }
            _ => false,
        }
    }

    /// Take every dead enemy out of the registry
    pub fn remove_dead(&mut self) -> Vec<Enemy> {
        if !self.enemies.iter().any(Enemy::is_dead) {
            return Vec::new();
        }
        let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut self.enemies)
            .into_iter()
            .partition(Enemy::is_dead);
        self.enemies = alive;
        dead
    }

    /// Living enemies whose center is within `radius` of `point`
    pub fn enemies_in_radius(&self, point: Vec3, radius: f32) -> impl Iterator<Item = &Enemy> {
        self.enemies
            .iter()
            .filter(move |e| !e.is_dead() && e.position.distance(point) <= radius)
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }

    /// Remove every enemy and restart the spawn timer
    pub fn reset(&mut self) {
        self.enemies.clear();
        self.spawn_timer = 0.0;
    }

    /// Place an enemy directly (tests and scripted setups)
    pub fn insert_at(&mut self, position: Vec3, speed: f32, tuning: &Tuning) -> EnemyId {
        let id = EnemyId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.enemies.push(Enemy {
            id,
            position,
            yaw: 0.0,
            health: tuning.enemy.health,
            max_health: tuning.enemy.health,
            speed,
            damage: tuning.enemy.damage,
            stun_time: 0.0,
            attack_cooldown: 0.0,
            hit_flash: 0.0,
        });
        id
    }
}
