//! Lathed occluder tessellation
//!
//! Round occluders (pieces, hinges) are surfaces of revolution about local
//! z. Ring positions are staged in a flat `Grid3` that callers keep and
//! reuse, so changing accuracy does not reallocate once the grid has grown
//! to the largest size used.

use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

use super::occluder::OccluderGeometry;

/// Flat 3D array of `f32`, indexed `(i, j, k)` with `k` fastest
#[derive(Debug, Clone, Default)]
pub struct Grid3 {
    data: Vec<f32>,
    dims: [usize; 3],
}

impl Grid3 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reshape, zeroing the contents; keeps the existing allocation when it
    /// is big enough
    pub fn resize(&mut self, ni: usize, nj: usize, nk: usize) {
        self.dims = [ni, nj, nk];
        self.data.clear();
        self.data.resize(ni * nj * nk, 0.0);
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline]
    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let [ni, nj, nk] = self.dims;
        debug_assert!(i < ni && j < nj && k < nk, "grid index ({i}, {j}, {k}) out of range");
        (i * nj + j) * nk + k
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.data[self.index(i, j, k)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f32) {
        let index = self.index(i, j, k);
        self.data[index] = value;
    }
}

impl OccluderGeometry {
    /// Revolve `profile` (radius, height) about z in `segments` steps
    ///
    /// The profile runs bottom to top with positive radii; both ends are
    /// closed with flat caps.
    pub fn lathe(profile: &[Vec2], segments: usize, grid: &mut Grid3) -> Self {
        assert!(profile.len() >= 2, "lathe profile needs at least two points");
        assert!(segments >= 3, "lathe needs at least three segments");

        let rings = profile.len();
        grid.resize(rings, segments, 3);
        for (i, p) in profile.iter().enumerate() {
            for j in 0..segments {
                let angle = TAU * j as f32 / segments as f32;
                grid.set(i, j, 0, p.x * angle.cos());
                grid.set(i, j, 1, p.x * angle.sin());
                grid.set(i, j, 2, p.y);
            }
        }

        let mut vertices = Vec::with_capacity(rings * segments);
        for i in 0..rings {
            for j in 0..segments {
                vertices.push(Vec3::new(grid.get(i, j, 0), grid.get(i, j, 1), grid.get(i, j, 2)));
            }
        }

        let at = |ring: usize, seg: usize| (ring * segments + seg % segments) as u32;
        let mut loops = Vec::with_capacity((rings - 1) * segments + 2);
        // Bottom cap faces -z: clockwise seen from above
        loops.push((0..segments).rev().map(|j| at(0, j)).collect());
        for i in 0..rings - 1 {
            for j in 0..segments {
                loops.push(vec![at(i, j), at(i, j + 1), at(i + 1, j + 1), at(i + 1, j)]);
            }
        }
        loops.push((0..segments).map(|j| at(rings - 1, j)).collect());

        Self::from_faces(vertices, loops)
    }
}

/// Cylinder with bevelled rims, base on z = 0
pub fn bevelled_cylinder(radius: f32, height: f32, bevel: f32) -> Vec<Vec2> {
    let bevel = bevel.min(height / 2.0).min(radius);
    vec![
        Vec2::new(radius - bevel, 0.0),
        Vec2::new(radius, bevel),
        Vec2::new(radius, height - bevel),
        Vec2::new(radius - bevel, height),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::Occluder;
    use glam::Vec4;
    use std::rc::Rc;

    #[test]
    fn test_grid_indexing() {
        let mut grid = Grid3::new();
        grid.resize(2, 3, 4);
        grid.set(1, 2, 3, 7.0);
        grid.set(0, 0, 0, 1.0);
        assert_eq!(grid.get(1, 2, 3), 7.0);
        assert_eq!(grid.get(0, 0, 0), 1.0);
        assert_eq!(grid.get(1, 0, 0), 0.0);
        assert_eq!(grid.dims(), [2, 3, 4]);
    }

    #[test]
    fn test_grid_reuses_allocation() {
        let mut grid = Grid3::new();
        grid.resize(4, 32, 3);
        let capacity = grid.capacity();
        grid.resize(4, 8, 3);
        grid.resize(4, 16, 3);
        assert_eq!(grid.capacity(), capacity);
        assert_eq!(grid.get(3, 15, 2), 0.0);
    }

    #[test]
    fn test_lathe_is_closed() {
        let mut grid = Grid3::new();
        let profile = bevelled_cylinder(0.5, 0.2, 0.03);
        let geometry = OccluderGeometry::lathe(&profile, 16, &mut grid);
        // Quads between 4 rings plus two caps
        assert_eq!(geometry.faces().len(), 3 * 16 + 2);
        assert_eq!(geometry.vertices().len(), 4 * 16);
        // Every ring edge and every rung, each shared by two faces
        assert_eq!(geometry.edges().len(), 4 * 16 + 3 * 16);
    }

    #[test]
    fn test_lathe_planes_point_outward() {
        let mut grid = Grid3::new();
        let geometry = OccluderGeometry::lathe(&bevelled_cylinder(0.5, 0.2, 0.03), 12, &mut grid);
        let inside = Vec4::new(0.0, 0.0, 0.1, 1.0);
        for face in geometry.faces() {
            assert!(face.plane.dot(inside) < 0.0);
        }
    }

    #[test]
    fn test_more_segments_give_more_silhouette() {
        let mut grid = Grid3::new();
        let profile = bevelled_cylinder(0.5, 0.2, 0.03);
        let light = Vec4::new(3.0, 1.0, 4.0, 1.0);
        let mut count = |segments: usize| {
            let geometry = OccluderGeometry::lathe(&profile, segments, &mut grid);
            let occluder = Occluder::new(Rc::new(geometry));
            let mut out = Vec::new();
            occluder.silhouette_volume(light, &mut out);
            out.len()
        };
        let low = count(8);
        let high = count(32);
        assert!(high > low);
    }
}
