//! Chunked CPU-side instancing for macroquad's immediate-mode mesh API.

use glam::Mat4;
use holiday_scene_rendering::{Lighting, SceneMesh};
use macroquad::models::{draw_mesh, Mesh, Vertex};

use crate::{to_macroquad_color, to_macroquad_vec3};

/// Vertices macroquad accepts in a single draw call.
const MAX_VERTICES: usize = 10_000;
/// Indices macroquad accepts in a single draw call.
const MAX_INDICES: usize = 5_000;

/// Number of instances of a mesh that fit into one draw call.
pub(crate) fn instances_per_chunk(vertex_count: usize, index_count: usize) -> usize {
    if vertex_count == 0 || index_count == 0 {
        return 0;
    }
    (MAX_VERTICES / vertex_count)
        .min(MAX_INDICES / index_count)
        .max(1)
}

/// Reusable buffers for transforming and shading instances before drawing.
#[derive(Debug, Default)]
pub(crate) struct MeshBatcher {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl MeshBatcher {
    /// Draws every instance of `mesh`, lit by `lighting`.
    pub(crate) fn draw(&mut self, mesh: &SceneMesh, lighting: &Lighting) {
        let geometry = &mesh.geometry;
        let per_chunk = instances_per_chunk(geometry.vertex_count(), geometry.indices().len());
        if per_chunk == 0 {
            return;
        }

        for chunk in mesh.instances.chunks(per_chunk) {
            self.vertices.clear();
            self.indices.clear();
            for instance in chunk {
                self.append(mesh, instance, lighting);
            }
            self.flush();
        }
    }

    fn append(&mut self, mesh: &SceneMesh, instance: &Mat4, lighting: &Lighting) {
        let geometry = &mesh.geometry;
        let base = self.vertices.len() as u16;

        for (position, normal) in geometry.positions().iter().zip(geometry.normals()) {
            let world = instance.transform_point3(*position);
            let world_normal = instance.transform_vector3(*normal).normalize_or_zero();
            let color = mesh.material.shade(world, world_normal, lighting);
            self.vertices.push(Vertex {
                position: to_macroquad_vec3(world),
                uv: macroquad::math::vec2(0.0, 0.0),
                color: to_macroquad_color(color),
            });
        }
        self.indices
            .extend(geometry.indices().iter().map(|index| base + *index as u16));
    }

    fn flush(&mut self) {
        if self.indices.is_empty() {
            return;
        }
        let chunk = Mesh {
            vertices: std::mem::take(&mut self.vertices),
            indices: std::mem::take(&mut self.indices),
            texture: None,
        };
        draw_mesh(&chunk);

        let Mesh {
            vertices, indices, ..
        } = chunk;
        self.vertices = vertices;
        self.indices = indices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holiday_scene_core::geometry::MeshGeometry;

    #[test]
    fn cubes_and_gems_fit_the_index_budget() {
        let cube = MeshGeometry::unit_cube();
        let per_chunk = instances_per_chunk(cube.vertex_count(), cube.indices().len());
        assert!(per_chunk * cube.indices().len() <= MAX_INDICES);
        assert!(per_chunk * cube.vertex_count() <= MAX_VERTICES);
        assert!(per_chunk >= 100);

        let gem = MeshGeometry::icosahedron(1.0);
        let per_chunk = instances_per_chunk(gem.vertex_count(), gem.indices().len());
        assert!(per_chunk * gem.indices().len() <= MAX_INDICES);
        assert!(per_chunk >= 60);
    }

    #[test]
    fn empty_geometry_draws_nothing() {
        assert_eq!(instances_per_chunk(0, 0), 0);
    }
}
