//! Shadow-casting geometry and silhouette extrusion
//!
//! An occluder is a closed polyhedron used only for shadows. Faces are wound
//! counter-clockwise seen from outside, and every edge knows the two faces
//! it separates, so the silhouette for a light is the set of edges whose
//! faces disagree on facing the light.

use glam::{Mat4, Vec3, Vec4};
use std::collections::HashMap;
use std::rc::Rc;

/// Each silhouette edge emits two triangles
pub const VERTICES_PER_EDGE: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Vertex loop, counter-clockwise seen from outside
    pub indices: Vec<u32>,
    /// Outward plane: `xyz` is the unit normal, `w` the offset (n.p + w = 0)
    pub plane: Vec4,
}

impl Face {
    /// Whether the face looks toward a homogeneous light position
    #[inline]
    pub fn faces_light(&self, light: Vec4) -> bool {
        self.plane.dot(light) > 0.0
    }
}

/// Edge between two faces; `a -> b` follows the winding of `faces[0]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
    pub faces: [usize; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccluderGeometry {
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    edges: Vec<Edge>,
}

impl OccluderGeometry {
    /// Build from vertex loops, working out planes and edge adjacency
    ///
    /// The mesh must be closed: an edge used by only one face never shows
    /// up in a silhouette.
    pub fn from_faces(vertices: Vec<Vec3>, loops: Vec<Vec<u32>>) -> Self {
        let faces: Vec<Face> = loops
            .into_iter()
            .map(|indices| {
                let plane = face_plane(&vertices, &indices);
                Face { indices, plane }
            })
            .collect();

        let mut open: HashMap<(u32, u32), (u32, u32, usize)> = HashMap::new();
        let mut edges = Vec::new();
        for (f, face) in faces.iter().enumerate() {
            let n = face.indices.len();
            for i in 0..n {
                let a = face.indices[i];
                let b = face.indices[(i + 1) % n];
                let key = (a.min(b), a.max(b));
                match open.remove(&key) {
                    Some((first_a, first_b, first)) => edges.push(Edge {
                        a: first_a,
                        b: first_b,
                        faces: [first, f],
                    }),
                    None => {
                        open.insert(key, (a, b, f));
                    }
                }
            }
        }
        if !open.is_empty() {
            log::warn!("occluder mesh has {} unpaired edges", open.len());
        }

        Self {
            vertices,
            faces,
            edges,
        }
    }

    /// Axis-aligned box of `size`, centred on the origin
    pub fn cuboid(size: Vec3) -> Self {
        let h = size / 2.0;
        // Index bits: x | y << 1 | z << 2
        let vertices = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();
        let loops = vec![
            vec![0, 4, 6, 2], // -x
            vec![1, 3, 7, 5], // +x
            vec![0, 1, 5, 4], // -y
            vec![2, 6, 7, 3], // +y
            vec![0, 2, 3, 1], // -z
            vec![4, 5, 7, 6], // +z
        ];
        Self::from_faces(vertices, loops)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Newell's method, which tolerates slightly non-planar loops
fn face_plane(vertices: &[Vec3], indices: &[u32]) -> Vec4 {
    let mut normal = Vec3::ZERO;
    let mut centroid = Vec3::ZERO;
    let n = indices.len();
    for i in 0..n {
        let p = vertices[indices[i] as usize];
        let q = vertices[indices[(i + 1) % n] as usize];
        normal += Vec3::new(
            (p.y - q.y) * (p.z + q.z),
            (p.z - q.z) * (p.x + q.x),
            (p.x - q.x) * (p.y + q.y),
        );
        centroid += p;
    }
    let normal = normal.normalize_or_zero();
    let centroid = centroid / n.max(1) as f32;
    normal.extend(-normal.dot(centroid))
}

/// Placed instance of shared occluder geometry
#[derive(Debug, Clone)]
pub struct Occluder {
    geometry: Rc<OccluderGeometry>,
    pub transform: Mat4,
    pub visible: bool,
}

impl Occluder {
    pub fn new(geometry: Rc<OccluderGeometry>) -> Self {
        Self {
            geometry,
            transform: Mat4::IDENTITY,
            visible: true,
        }
    }

    pub fn geometry(&self) -> &OccluderGeometry {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Rc<OccluderGeometry>) {
        self.geometry = geometry;
    }

    /// Append this occluder's shadow volume sides to `out`
    ///
    /// `light` is homogeneous: `w = 1` for a point light, `w = 0` for a
    /// direction pointing toward the light. Output is in world space; the
    /// far vertices have `w = 0` (at infinity) and every silhouette edge
    /// contributes `VERTICES_PER_EDGE` vertices, wound so the volume's
    /// outside is front facing.
    pub fn silhouette_volume(&self, light: Vec4, out: &mut Vec<Vec4>) {
        if !self.visible {
            return;
        }

        let local_light = self.transform.inverse() * light;
        let geometry = &*self.geometry;

        for edge in &geometry.edges {
            let lit0 = geometry.faces[edge.faces[0]].faces_light(local_light);
            let lit1 = geometry.faces[edge.faces[1]].faces_light(local_light);
            if lit0 == lit1 {
                continue;
            }

            // Walk the edge in the lit face's winding
            let (i0, i1) = if lit0 {
                (edge.a, edge.b)
            } else {
                (edge.b, edge.a)
            };
            let v0 = geometry.vertices[i0 as usize];
            let v1 = geometry.vertices[i1 as usize];
            let v0_far = extrude(v0, local_light);
            let v1_far = extrude(v1, local_light);

            let v0 = self.transform * v0.extend(1.0);
            let v1 = self.transform * v1.extend(1.0);
            let v0_far = self.transform * v0_far;
            let v1_far = self.transform * v1_far;

            out.extend_from_slice(&[v1, v0, v0_far, v1, v0_far, v1_far]);
        }
    }
}

/// Project `v` away from the light onto the plane at infinity
#[inline]
fn extrude(v: Vec3, light: Vec4) -> Vec4 {
    (v * light.w - light.truncate()).extend(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Rc<OccluderGeometry> {
        Rc::new(OccluderGeometry::cuboid(Vec3::splat(2.0)))
    }

    #[test]
    fn test_cuboid_is_closed() {
        let cube = OccluderGeometry::cuboid(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cube.vertices().len(), 8);
        assert_eq!(cube.faces().len(), 6);
        assert_eq!(cube.edges().len(), 12);
    }

    #[test]
    fn test_cuboid_planes_point_outward() {
        let cube = OccluderGeometry::cuboid(Vec3::splat(2.0));
        for face in cube.faces() {
            // Origin is inside: n.0 + w < 0
            assert!(face.plane.w < 0.0);
            assert!((face.plane.truncate().length() - 1.0).abs() < 1e-6);
            for &i in &face.indices {
                let p = cube.vertices()[i as usize];
                assert!(face.plane.dot(p.extend(1.0)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_overhead_light_outlines_top_face() {
        let occluder = Occluder::new(unit_cube());
        let mut out = Vec::new();
        occluder.silhouette_volume(Vec4::new(0.0, 0.0, 10.0, 1.0), &mut out);
        assert_eq!(out.len(), 4 * VERTICES_PER_EDGE);

        for quad in out.chunks_exact(VERTICES_PER_EDGE) {
            // Near vertices on the top rim, far vertices heading down
            assert_eq!(quad[0].w, 1.0);
            assert!((quad[0].z - 1.0).abs() < 1e-6);
            assert_eq!(quad[2].w, 0.0);
            assert!(quad[2].z < 0.0);
        }
    }

    #[test]
    fn test_volume_sides_face_outward() {
        let occluder = Occluder::new(unit_cube());
        let mut out = Vec::new();
        occluder.silhouette_volume(Vec4::new(0.0, 0.0, 10.0, 1.0), &mut out);

        for quad in out.chunks_exact(VERTICES_PER_EDGE) {
            let v1 = quad[0].truncate();
            let v0 = quad[1].truncate();
            let far = v0 + quad[2].truncate() * 10.0;
            let normal = (v0 - v1).cross(far - v1);
            let mid = (v0 + v1) / 2.0;
            // Outward means away from the cube's vertical axis
            let outward = Vec3::new(mid.x, mid.y, 0.0);
            assert!(normal.dot(outward) > 0.0);
        }
    }

    #[test]
    fn test_directional_light_extrudes_in_parallel() {
        let occluder = Occluder::new(unit_cube());
        let mut out = Vec::new();
        let towards = Vec4::new(0.3, 0.0, 1.0, 0.0);
        occluder.silhouette_volume(towards, &mut out);
        assert!(!out.is_empty());
        for v in out.iter().filter(|v| v.w == 0.0) {
            assert!((v.truncate() + towards.truncate()).length() < 1e-6);
        }
    }

    #[test]
    fn test_transform_moves_volume() {
        let mut occluder = Occluder::new(unit_cube());
        occluder.transform = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let mut out = Vec::new();
        occluder.silhouette_volume(Vec4::new(5.0, 0.0, 10.0, 1.0), &mut out);
        assert_eq!(out.len(), 4 * VERTICES_PER_EDGE);
        for v in out.iter().filter(|v| v.w == 1.0) {
            assert!((v.x - 5.0).abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_hidden_occluder_casts_nothing() {
        let mut occluder = Occluder::new(unit_cube());
        occluder.visible = false;
        let mut out = Vec::new();
        occluder.silhouette_volume(Vec4::new(0.0, 0.0, 10.0, 1.0), &mut out);
        assert!(out.is_empty());
    }
}
