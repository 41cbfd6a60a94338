//! Vertex types for 3D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// World-space vertex with a pre-lit color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, z: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y, z],
            color,
        }
    }

    #[inline]
    pub fn at(p: Vec3, color: [f32; 4]) -> Self {
        Self::new(p.x, p.y, p.z, color)
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const GROUND: [f32; 4] = [0.13, 0.13, 0.14, 1.0];
    pub const GROUND_ALT: [f32; 4] = [0.11, 0.1, 0.13, 1.0];
    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.45];
    pub const ENEMY: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
    pub const ENEMY_STUNNED: [f32; 4] = [0.5, 0.0, 0.5, 1.0];
    pub const ENEMY_EYE: [f32; 4] = [0.1, 0.0, 0.1, 1.0];
    pub const HIT_FLASH: [f32; 4] = [1.0, 0.25, 0.25, 1.0];
    pub const STUN_STAR: [f32; 4] = [1.0, 0.9, 0.3, 1.0];
    pub const HEALTH_BACK: [f32; 4] = [0.15, 0.0, 0.0, 0.8];
    pub const HEALTH_FILL: [f32; 4] = [0.9, 0.1, 0.2, 0.9];
    pub const SHADOW_BALL: [f32; 4] = [0.54, 0.17, 0.89, 1.0];
    pub const SHADOW_BALL_GLOW: [f32; 4] = [0.29, 0.0, 0.51, 0.35];
    pub const HYPNOSIS: [f32; 4] = [1.0, 0.0, 1.0, 0.5];
    pub const DREAM_EATER: [f32; 4] = [1.0, 0.0, 0.0, 0.45];
    pub const SHADOW_PUNCH: [f32; 4] = [0.08, 0.0, 0.12, 0.6];
    pub const SPARK: [f32; 4] = [0.8, 0.4, 1.0, 0.9];
    pub const SMOKE: [f32; 4] = [0.05, 0.02, 0.08, 0.8];
    /// Clear color and fog color
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
}
