//! Shape generation for 3D primitives
//!
//! Every solid is flat shaded on the CPU: each triangle gets its color
//! scaled by a fixed ambient + directional term from its face normal.
//! Triangles wind counter-clockwise seen from outside.

use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

use super::vertex::Vertex;

const AMBIENT: f32 = 0.4;
const DIFFUSE: f32 = 0.6;

fn light_dir() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0).normalize()
}

/// Lambert term for a face normal
pub fn shade(color: [f32; 4], normal: Vec3) -> [f32; 4] {
    let k = AMBIENT + DIFFUSE * normal.normalize_or_zero().dot(light_dir()).max(0.0);
    [color[0] * k, color[1] * k, color[2] * k, color[3]]
}

/// Push one lit triangle
pub fn triangle(out: &mut Vec<Vertex>, a: Vec3, b: Vec3, c: Vec3, color: [f32; 4]) {
    let lit = shade(color, (b - a).cross(c - a));
    out.push(Vertex::at(a, lit));
    out.push(Vertex::at(b, lit));
    out.push(Vertex::at(c, lit));
}

/// Push one unlit triangle (ground, decals, translucent effects)
pub fn flat_triangle(out: &mut Vec<Vertex>, a: Vec3, b: Vec3, c: Vec3, color: [f32; 4]) {
    out.push(Vertex::at(a, color));
    out.push(Vertex::at(b, color));
    out.push(Vertex::at(c, color));
}

/// Checkered ground square centered on the origin, facing up
pub fn ground(out: &mut Vec<Vertex>, half_extent: f32, tile: f32, a: [f32; 4], b: [f32; 4]) {
    let tiles = ((half_extent * 2.0) / tile).ceil() as i32;
    for i in 0..tiles {
        for j in 0..tiles {
            let x0 = -half_extent + i as f32 * tile;
            let z0 = -half_extent + j as f32 * tile;
            let x1 = (x0 + tile).min(half_extent);
            let z1 = (z0 + tile).min(half_extent);
            let color = if (i + j) % 2 == 0 { a } else { b };
            let p00 = Vec3::new(x0, 0.0, z0);
            let p01 = Vec3::new(x0, 0.0, z1);
            let p11 = Vec3::new(x1, 0.0, z1);
            let p10 = Vec3::new(x1, 0.0, z0);
            flat_triangle(out, p00, p01, p11, color);
            flat_triangle(out, p00, p11, p10, color);
        }
    }
}

/// Flat disc lying on a horizontal plane, facing up
pub fn disc(out: &mut Vec<Vertex>, center: Vec3, radius: f32, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    for i in 0..segments {
        let t1 = i as f32 / segments as f32 * TAU;
        let t2 = (i + 1) as f32 / segments as f32 * TAU;
        let p1 = center + Vec3::new(t1.cos(), 0.0, t1.sin()) * radius;
        let p2 = center + Vec3::new(t2.cos(), 0.0, t2.sin()) * radius;
        flat_triangle(out, center, p2, p1, color);
    }
}

/// Flat ring lying on a horizontal plane, facing up
pub fn ring(out: &mut Vec<Vertex>, center: Vec3, inner: f32, outer: f32, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    for i in 0..segments {
        let t1 = i as f32 / segments as f32 * TAU;
        let t2 = (i + 1) as f32 / segments as f32 * TAU;
        let d1 = Vec3::new(t1.cos(), 0.0, t1.sin());
        let d2 = Vec3::new(t2.cos(), 0.0, t2.sin());
        let inner1 = center + d1 * inner;
        let inner2 = center + d2 * inner;
        let outer1 = center + d1 * outer;
        let outer2 = center + d2 * outer;

        // Two triangles per segment
        flat_triangle(out, inner1, inner2, outer1, color);
        flat_triangle(out, inner2, outer2, outer1, color);
    }
}

/// Ellipsoid with per-axis radii, lit per face
pub fn sphere(out: &mut Vec<Vertex>, center: Vec3, radii: Vec3, color: [f32; 4], segments: u32) {
    let rings = segments.max(3);
    let sectors = rings * 2;
    let point = |i: u32, j: u32| {
        let theta = i as f32 / rings as f32 * PI;
        let phi = j as f32 / sectors as f32 * TAU;
        center + Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()) * radii
    };

    for i in 0..rings {
        for j in 0..sectors {
            let a = point(i, j);
            let b = point(i + 1, j);
            let c = point(i + 1, j + 1);
            let d = point(i, j + 1);
            // Pole rows collapse to one triangle
            if i != rings - 1 {
                triangle(out, a, c, b, color);
            }
            if i != 0 {
                triangle(out, a, d, c, color);
            }
        }
    }
}

/// Unlit translucent sphere for glows
pub fn glow_sphere(out: &mut Vec<Vertex>, center: Vec3, radius: f32, color: [f32; 4], segments: u32) {
    let start = out.len();
    sphere(out, center, Vec3::splat(radius), color, segments);
    for v in &mut out[start..] {
        v.color = color;
    }
}

/// Small diamond used for particles and stun stars
pub fn octahedron(out: &mut Vec<Vertex>, center: Vec3, radius: f32, color: [f32; 4]) {
    let top = center + Vec3::Y * radius;
    let bottom = center - Vec3::Y * radius;
    let sides = [
        center + Vec3::X * radius,
        center + Vec3::Z * radius,
        center - Vec3::X * radius,
        center - Vec3::Z * radius,
    ];
    for k in 0..4 {
        let cur = sides[k];
        let next = sides[(k + 1) % 4];
        triangle(out, top, next, cur, color);
        triangle(out, bottom, cur, next, color);
    }
}

/// Upright quad facing +Z (toward the follow camera)
pub fn billboard_bar(out: &mut Vec<Vertex>, left_bottom: Vec3, width: f32, height: f32, color: [f32; 4]) {
    let bl = left_bottom;
    let br = bl + Vec3::X * width;
    let tr = br + Vec3::Y * height;
    let tl = bl + Vec3::Y * height;
    flat_triangle(out, bl, br, tr, color);
    flat_triangle(out, bl, tr, tl, color);
}

/// Indexed mesh transformed into the world, lit per face, tinted
pub fn mesh(
    out: &mut Vec<Vertex>,
    positions: &[Vec3],
    colors: &[[f32; 3]],
    indices: &[u32],
    transform: Mat4,
    tint: Option<([f32; 4], f32)>,
) {
    let world: Vec<Vec3> = positions.iter().map(|&p| transform.transform_point3(p)).collect();
    for tri in indices.chunks_exact(3) {
        let [ia, ib, ic] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(&a), Some(&b), Some(&c)) = (world.get(ia), world.get(ib), world.get(ic)) else {
            continue;
        };
        let rgb = colors.get(ia).copied().unwrap_or([1.0, 1.0, 1.0]);
        let mut color = [rgb[0], rgb[1], rgb[2], 1.0];
        if let Some((tint, amount)) = tint {
            color = mix(color, tint, amount);
        }
        triangle(out, a, b, c, color);
    }
}

/// Linear blend between two colors
pub fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Same color with a different alpha
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}
