//! Stencil counting for shadow volumes
//!
//! The shadow pass clears the stencil to the mid value `M`, then draws the
//! volume twice with depth testing against the scene: back faces decrement,
//! front faces increment. Along any eye ray the two cancel unless the
//! visible surface sits inside a volume, so `stencil == M` means lit.
//!
//! `StencilProbe` runs the same count on the CPU for a single eye ray.

use glam::{Vec3, Vec4};
use std::sync::Once;

use super::occluder::VERTICES_PER_EDGE;

static NO_STENCIL: Once = Once::new();

/// Warn that shadows are off; only the first call per process logs
pub fn shadows_disabled(reason: &str) {
    NO_STENCIL.call_once(|| log::warn!("{reason}, shadows disabled"));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilConfig {
    bits: u32,
}

impl StencilConfig {
    /// Configuration for a stencil buffer with `bits` bits, or `None` (and a
    /// one-time warning) when there is no stencil to count in
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits == 0 {
            shadows_disabled("No stencil buffer available");
            return None;
        }
        Some(Self { bits: bits.min(31) })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Value the pass clears to, and the value that means lit
    pub fn mid(&self) -> u32 {
        1 << (self.bits - 1)
    }

    pub fn mask(&self) -> u32 {
        (1u32 << self.bits) - 1
    }
}

/// CPU evaluation of the two-pass stencil count
#[derive(Debug, Clone)]
pub struct StencilProbe {
    config: StencilConfig,
    /// Volume sides truncated at a finite distance
    quads: Vec<[Vec3; 4]>,
}

impl StencilProbe {
    /// Take a shadow volume in the layout `Occluder::silhouette_volume`
    /// emits. Vertices at infinity are pulled in to `reach` times their
    /// direction from the matching near vertex, which must pass every
    /// surface probed.
    pub fn new(config: StencilConfig, volume: &[Vec4], reach: f32) -> Self {
        let quads = volume
            .chunks_exact(VERTICES_PER_EDGE)
            .map(|q| {
                let v1 = q[0].truncate();
                let v0 = q[1].truncate();
                let v0_far = v0 + q[2].truncate() * reach;
                let v1_far = v1 + q[5].truncate() * reach;
                [v1, v0, v0_far, v1_far]
            })
            .collect();
        Self { config, quads }
    }

    /// Stencil value left behind for the surface point `surface` seen from
    /// `eye`
    pub fn stencil_at(&self, eye: Vec3, surface: Vec3) -> u32 {
        let dir = surface - eye;
        let mut count: i64 = self.config.mid() as i64;
        for q in &self.quads {
            for tri in [[q[0], q[1], q[2]], [q[0], q[2], q[3]]] {
                let Some(t) = ray_triangle(eye, dir, &tri) else {
                    continue;
                };
                // Only faces in front of the surface pass the depth test
                if t <= 0.0 || t >= 1.0 {
                    continue;
                }
                let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
                if normal.dot(dir) < 0.0 {
                    count += 1;
                } else {
                    count -= 1;
                }
            }
        }
        // Both passes wrap
        (count.rem_euclid(self.config.mask() as i64 + 1)) as u32
    }

    pub fn in_shadow(&self, eye: Vec3, surface: Vec3) -> bool {
        self.stencil_at(eye, surface) != self.config.mid()
    }
}

/// Moller-Trumbore; returns the ray parameter of the hit
fn ray_triangle(origin: Vec3, dir: Vec3, tri: &[Vec3; 3]) -> Option<f32> {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-12 {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - tri[0];
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    Some(e2.dot(q) * inv)
}
