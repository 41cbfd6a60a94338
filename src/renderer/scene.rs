//! Game state to triangle lists
//!
//! `build` is pure: the same state, model and settings always produce the
//! same vertices. Opaque geometry is depth tested and written; translucent
//! geometry is sorted back to front from the eye and drawn afterwards.

use glam::{Mat4, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

use super::shapes::{self, mix, with_alpha};
use super::vertex::{Vertex, colors};
use crate::asset_loading::PlayerModel;
use crate::consts::GROUND_HALF_EXTENT;
use crate::settings::Settings;
use crate::sim::{BurstStyle, Effect, EffectKind, Enemy, GameState, PlayerAnim, PlayerState};
use crate::yaw_to_facing;

const GROUND_TILE: f32 = 5.0;
/// Decals float just above the ground to win the depth test
const DECAL_LIFT: f32 = 0.02;
const RING_LIFT: f32 = 0.05;
const RING_SEGMENTS: u32 = 48;
const RING_WIDTH: f32 = 0.2;
const GRAVITY: f32 = -9.8;

const ENEMY_RADIUS: f32 = 1.0;
const SHADOW_BALL_RADIUS: f32 = 0.5;
const HEALTH_BAR_WIDTH: f32 = 1.5;
const HEALTH_BAR_HEIGHT: f32 = 0.12;

/// One frame of geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub opaque: Vec<Vertex>,
    pub translucent: Vec<Vertex>,
}

impl SceneMesh {
    pub fn vertex_count(&self) -> usize {
        self.opaque.len() + self.translucent.len()
    }
}

/// Translucent pieces waiting to be depth sorted
struct Layer {
    eye: Vec3,
    items: Vec<(f32, Vec<Vertex>)>,
}

impl Layer {
    fn new(eye: Vec3) -> Self {
        Self { eye, items: Vec::new() }
    }

    fn push(&mut self, anchor: Vec3, vertices: Vec<Vertex>) {
        if !vertices.is_empty() {
            self.items.push((anchor.distance_squared(self.eye), vertices));
        }
    }

    /// Farthest first
    fn flatten(mut self) -> Vec<Vertex> {
        self.items.sort_by(|a, b| b.0.total_cmp(&a.0));
        self.items.into_iter().flat_map(|(_, v)| v).collect()
    }
}

/// Build the scene as seen from `eye`
pub fn build(state: &GameState, model: &PlayerModel, settings: &Settings, eye: Vec3) -> SceneMesh {
    let segments = settings.quality.sphere_segments();
    let mut opaque = Vec::new();
    let mut layer = Layer::new(eye);

    shapes::ground(
        &mut opaque,
        GROUND_HALF_EXTENT,
        GROUND_TILE,
        colors::GROUND,
        colors::GROUND_ALT,
    );

    player(&mut opaque, &mut layer, &state.player, model, settings, state.time);
    for enemy in state.enemies.iter() {
        self::enemy(&mut opaque, &mut layer, enemy, settings, state.time, segments);
    }
    for effect in state.effects.iter() {
        self::effect(&mut opaque, &mut layer, effect, settings, segments);
    }

    SceneMesh {
        opaque,
        translucent: layer.flatten(),
    }
}

/// Vertical float offset of the idle/walk loop
pub fn bob_offset(anim: PlayerAnim, time: f32) -> f32 {
    let (height, freq) = match anim {
        PlayerAnim::Walk => (0.3, 1.0),
        _ => (0.2, 0.5),
    };
    height * (0.5 + 0.5 * (time * freq * TAU).sin())
}

/// Forward lunge of the attack pose
pub fn lunge_offset(anim: PlayerAnim) -> f32 {
    match anim {
        PlayerAnim::Attack { remaining } => 0.4 * (remaining / 0.3).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn player(
    opaque: &mut Vec<Vertex>,
    layer: &mut Layer,
    player: &PlayerState,
    model: &PlayerModel,
    settings: &Settings,
    time: f32,
) {
    let lift = if settings.reduced_motion {
        0.0
    } else {
        bob_offset(player.anim, time)
    };
    let origin = player.position + Vec3::Y * lift + player.facing() * lunge_offset(player.anim);
    let transform = Mat4::from_rotation_translation(Quat::from_rotation_y(player.yaw), origin);
    let tint = (settings.effective_hit_flash() && player.hit_flash > 0.0).then_some((colors::HIT_FLASH, 0.6));

    shapes::mesh(
        opaque,
        &model.positions,
        &model.colors,
        &model.indices,
        transform,
        tint,
    );

    let mut shadow = Vec::new();
    shapes::disc(
        &mut shadow,
        player.position.with_y(DECAL_LIFT),
        0.8,
        colors::SHADOW,
        24,
    );
    layer.push(player.position, shadow);
}

fn enemy(
    opaque: &mut Vec<Vertex>,
    layer: &mut Layer,
    enemy: &Enemy,
    settings: &Settings,
    time: f32,
    segments: u32,
) {
    let mut body = if enemy.is_stunned() {
        colors::ENEMY_STUNNED
    } else {
        colors::ENEMY
    };
    if settings.effective_hit_flash() && enemy.hit_flash > 0.0 {
        body = mix(body, colors::HIT_FLASH, 0.6);
    }
    shapes::sphere(opaque, enemy.position, Vec3::splat(ENEMY_RADIUS), body, segments);

    let facing = yaw_to_facing(enemy.yaw);
    let side = Vec3::Y.cross(facing).normalize_or(Vec3::X);
    for s in [-1.0, 1.0] {
        let eye = enemy.position + facing * 0.85 + side * (0.35 * s) + Vec3::Y * 0.3;
        shapes::sphere(opaque, eye, Vec3::splat(0.15), colors::ENEMY_EYE, 6);
    }

    if enemy.is_stunned() {
        let spin = if settings.reduced_motion { 0.0 } else { time * 3.0 };
        for k in 0..3 {
            let angle = spin + k as f32 / 3.0 * TAU;
            let star = enemy.position + Vec3::new(angle.cos() * 0.6, 1.4, angle.sin() * 0.6);
            shapes::octahedron(opaque, star, 0.12, colors::STUN_STAR);
        }
    }

    let mut shadow = Vec::new();
    shapes::disc(
        &mut shadow,
        enemy.position.with_y(DECAL_LIFT),
        0.9,
        colors::SHADOW,
        24,
    );
    layer.push(enemy.position.with_y(0.0), shadow);

    let fraction = enemy.health_fraction();
    if fraction < 1.0 {
        let corner = enemy.position + Vec3::new(-HEALTH_BAR_WIDTH * 0.5, 1.5, 0.0);
        let mut bar = Vec::new();
        shapes::billboard_bar(&mut bar, corner, HEALTH_BAR_WIDTH, HEALTH_BAR_HEIGHT, colors::HEALTH_BACK);
        shapes::billboard_bar(
            &mut bar,
            corner + Vec3::Z * 0.02,
            HEALTH_BAR_WIDTH * fraction,
            HEALTH_BAR_HEIGHT,
            colors::HEALTH_FILL,
        );
        layer.push(corner, bar);
    }
}

fn effect(opaque: &mut Vec<Vertex>, layer: &mut Layer, effect: &Effect, settings: &Settings, segments: u32) {
    let fade = 1.0 - effect.progress();
    let pulse = if settings.effective_pulse() {
        effect.pulse_scale()
    } else {
        1.0
    };
    let radius = effect.radius.unwrap_or(1.0);
    let ground = effect.position.with_y(RING_LIFT);
    let mut out = Vec::new();

    match effect.kind {
        EffectKind::Projectile => {
            shapes::sphere(
                opaque,
                effect.position,
                Vec3::splat(SHADOW_BALL_RADIUS),
                colors::SHADOW_BALL,
                segments,
            );
            shapes::glow_sphere(
                &mut out,
                effect.position,
                SHADOW_BALL_RADIUS * 1.6 * pulse,
                colors::SHADOW_BALL_GLOW,
                segments,
            );
            if settings.particles {
                for k in 1..=4 {
                    let t = k as f32 / 4.0;
                    let p = effect.position - effect.direction * (0.35 * k as f32);
                    shapes::octahedron(
                        &mut out,
                        p,
                        0.2 * (1.0 - t * 0.6),
                        with_alpha(colors::SHADOW_BALL, 0.6 * (1.0 - t)),
                    );
                }
            }
        }
        EffectKind::Area => {
            let outer = radius * pulse;
            shapes::ring(
                &mut out,
                ground,
                (outer - RING_WIDTH).max(0.0),
                outer,
                colors::HYPNOSIS,
                RING_SEGMENTS,
            );
        }
        EffectKind::Strike { stunned_only: true } => {
            let outer = radius * (0.2 + 0.8 * effect.progress());
            let color = colors::DREAM_EATER;
            shapes::ring(
                &mut out,
                ground,
                (outer - RING_WIDTH * 2.0).max(0.0),
                outer,
                with_alpha(color, color[3] * fade),
                RING_SEGMENTS,
            );
            particles(&mut out, effect, settings.burst_particles(), color, -2.0, 2.5);
        }
        EffectKind::Strike { stunned_only: false } => {
            let color = colors::SHADOW_PUNCH;
            shapes::glow_sphere(
                &mut out,
                effect.position,
                radius * (0.5 + 0.5 * effect.progress()),
                with_alpha(color, color[3] * fade),
                segments,
            );
            particles(&mut out, effect, settings.burst_particles(), color, GRAVITY, 3.0);
        }
        EffectKind::Burst(BurstStyle::Spark) => {
            particles(&mut out, effect, settings.burst_particles(), colors::SPARK, GRAVITY, 4.0);
        }
        EffectKind::Burst(BurstStyle::Smoke) => {
            particles(&mut out, effect, settings.burst_particles(), colors::SMOKE, 1.5, 1.5);
        }
    }

    layer.push(effect.position, out);
}

/// Seeded particle spray: each particle flies out, falls under `gravity`
/// (negative = down) and fades with the effect's progress.
fn particles(out: &mut Vec<Vertex>, effect: &Effect, count: usize, color: [f32; 4], gravity: f32, speed: f32) {
    if count == 0 {
        return;
    }
    let mut rng = Pcg32::seed_from_u64(effect.seed as u64);
    let fade = 1.0 - effect.progress();
    let age = effect.age;
    for _ in 0..count {
        let angle = rng.random::<f32>() * TAU;
        let up = 0.5 + rng.random::<f32>();
        let v = Vec3::new(angle.cos(), up, angle.sin()) * (speed * (0.5 + 0.5 * rng.random::<f32>()));
        let mut p = effect.position + v * age + Vec3::Y * (0.5 * gravity * age * age);
        p.y = p.y.max(DECAL_LIFT);
        let size = 0.03 + 0.12 * fade;
        shapes::octahedron(out, p, size, with_alpha(color, color[3] * fade));
    }
}
