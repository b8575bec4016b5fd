//! Flat-shaded triangle meshes declared by scene components.

use glam::Vec3;

/// Indexed triangle mesh with one normal per vertex.
///
/// Triangles are wound counter-clockwise when viewed from the side their
/// normal points to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl MeshGeometry {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned box with unit edges centred on the origin.
    #[must_use]
    pub fn unit_cube() -> Self {
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut mesh = Self::new();
        for (normal, u, v) in FACES {
            let center = normal * 0.5;
            let u = u * 0.5;
            let v = v * 0.5;
            mesh.push_quad([
                center - u - v,
                center + u - v,
                center + u + v,
                center - u + v,
            ]);
        }
        mesh
    }

    /// Regular icosahedron with the provided circumradius.
    #[must_use]
    pub fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let corners = [
            Vec3::new(-1.0, t, 0.0),
            Vec3::new(1.0, t, 0.0),
            Vec3::new(-1.0, -t, 0.0),
            Vec3::new(1.0, -t, 0.0),
            Vec3::new(0.0, -1.0, t),
            Vec3::new(0.0, 1.0, t),
            Vec3::new(0.0, -1.0, -t),
            Vec3::new(0.0, 1.0, -t),
            Vec3::new(t, 0.0, -1.0),
            Vec3::new(t, 0.0, 1.0),
            Vec3::new(-t, 0.0, -1.0),
            Vec3::new(-t, 0.0, 1.0),
        ]
        .map(|corner| corner.normalize() * radius);

        const FACES: [[usize; 3]; 20] = [
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        let mut mesh = Self::new();
        for [a, b, c] in FACES {
            mesh.push_triangle([corners[a], corners[b], corners[c]]);
        }
        mesh
    }

    /// Appends a triangle with its own flat normal.
    pub fn push_triangle(&mut self, corners: [Vec3; 3]) {
        let [a, b, c] = corners;
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let base = self.next_index();
        for corner in corners {
            self.positions.push(corner);
            self.normals.push(normal);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Appends a planar quad, split along its first diagonal.
    pub fn push_quad(&mut self, corners: [Vec3; 4]) {
        let [a, b, c, d] = corners;
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let base = self.next_index();
        for corner in corners {
            self.positions.push(corner);
            self.normals.push(normal);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        debug_assert!((d - a).dot(normal).abs() <= 1e-3, "quad must be planar");
    }

    /// Appends a triangle fan around `center` sharing a single normal.
    ///
    /// `rim` must be ordered counter-clockwise around `normal`.
    pub fn push_fan(&mut self, center: Vec3, rim: &[Vec3], normal: Vec3) {
        if rim.len() < 2 {
            return;
        }

        let base = self.next_index();
        self.positions.push(center);
        self.normals.push(normal);
        for point in rim {
            self.positions.push(*point);
            self.normals.push(normal);
        }

        let rim_len = rim.len() as u32;
        for offset in 0..rim_len {
            let current = base + 1 + offset;
            let next = base + 1 + (offset + 1) % rim_len;
            self.indices.extend_from_slice(&[base, current, next]);
        }
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex normals, parallel to [`positions`](Self::positions).
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Triangle list indices.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices stored in the mesh.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles stored in the mesh.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates over triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|triangle| {
            [
                self.positions[triangle[0] as usize],
                self.positions[triangle[1] as usize],
                self.positions[triangle[2] as usize],
            ]
        })
    }

    fn next_index(&self) -> u32 {
        self.positions.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward_winding(mesh: &MeshGeometry) {
        for [a, b, c] in mesh.triangles() {
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(
                normal.dot(centroid) > 0.0,
                "triangle {a:?} {b:?} {c:?} faces inward"
            );
        }
    }

    #[test]
    fn unit_cube_has_six_outward_quads() {
        let cube = MeshGeometry::unit_cube();

        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube
            .positions()
            .iter()
            .all(|p| p.abs().max_element() <= 0.5 + 1e-6));
        assert_outward_winding(&cube);
    }

    #[test]
    fn icosahedron_vertices_lie_on_sphere() {
        let gem = MeshGeometry::icosahedron(1.0);

        assert_eq!(gem.triangle_count(), 20);
        assert!(gem
            .positions()
            .iter()
            .all(|p| (p.length() - 1.0).abs() <= 1e-5));
        assert_outward_winding(&gem);
    }

    #[test]
    fn fan_closes_the_rim() {
        let mut mesh = MeshGeometry::new();
        let rim = [Vec3::X, Vec3::Y, Vec3::NEG_X, Vec3::NEG_Y];
        mesh.push_fan(Vec3::ZERO, &rim, Vec3::Z);

        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(&mesh.indices()[9..], &[0, 4, 1]);
        assert!(mesh.normals().iter().all(|n| *n == Vec3::Z));
    }

    #[test]
    fn fan_ignores_degenerate_rims() {
        let mut mesh = MeshGeometry::new();
        mesh.push_fan(Vec3::ZERO, &[Vec3::X], Vec3::Z);
        assert_eq!(mesh.vertex_count(), 0);
    }
}
