//! Beveled extrusion of closed planar outlines.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use holiday_scene_core::geometry::MeshGeometry;

/// Extrusion depth and bevel profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtrudeSettings {
    /// Distance between the front and back faces before beveling.
    pub depth: f32,
    /// Whether bevel rings are added around both faces.
    pub bevel_enabled: bool,
    /// How far each bevel extends along the extrusion axis.
    pub bevel_thickness: f32,
    /// How far each bevel grows the outline outward.
    pub bevel_size: f32,
    /// Number of rings forming each quarter-round bevel.
    pub bevel_segments: u32,
}

/// Offset of each outline vertex that moves both adjacent edges outward by one unit.
///
/// `outline` must be ordered counter-clockwise.
#[must_use]
pub fn miter_offsets(outline: &[Vec2]) -> Vec<Vec2> {
    let len = outline.len();
    (0..len)
        .map(|index| {
            let previous = outline[(index + len - 1) % len];
            let current = outline[index];
            let next = outline[(index + 1) % len];

            let incoming = edge_normal(previous, current);
            let outgoing = edge_normal(current, next);
            let denominator = 1.0 + incoming.dot(outgoing);
            if denominator <= f32::EPSILON {
                return incoming;
            }
            (incoming + outgoing) / denominator
        })
        .collect()
}

fn edge_normal(from: Vec2, to: Vec2) -> Vec2 {
    let edge = to - from;
    Vec2::new(edge.y, -edge.x).normalize_or_zero()
}

/// Ring of outline points at a fixed depth, grown outward by `offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ring {
    z: f32,
    offset: f32,
}

fn rings(settings: &ExtrudeSettings) -> Vec<Ring> {
    if !settings.bevel_enabled || settings.bevel_segments == 0 {
        return vec![
            Ring { z: 0.0, offset: 0.0 },
            Ring {
                z: settings.depth,
                offset: 0.0,
            },
        ];
    }

    let segments = settings.bevel_segments;
    let profile = |step: u32| {
        let angle = step as f32 / segments as f32 * FRAC_PI_2;
        (
            settings.bevel_thickness * angle.cos(),
            settings.bevel_size * angle.sin(),
        )
    };

    let back = (0..=segments).map(|step| {
        let (z, offset) = profile(step);
        Ring { z: -z, offset }
    });
    let front = (0..=segments).rev().map(|step| {
        let (z, offset) = profile(step);
        Ring {
            z: settings.depth + z,
            offset,
        }
    });
    back.chain(front).collect()
}

/// Extrudes a counter-clockwise outline that is star-shaped around the origin.
///
/// Both caps are fan-triangulated from the origin; side walls are flat quads
/// between consecutive rings.
#[must_use]
pub fn extrude(outline: &[Vec2], settings: &ExtrudeSettings) -> MeshGeometry {
    let mut mesh = MeshGeometry::new();
    if outline.len() < 3 {
        return mesh;
    }

    let offsets = miter_offsets(outline);
    let rings = rings(settings);
    let ring_points = |ring: &Ring| -> Vec<Vec3> {
        outline
            .iter()
            .zip(&offsets)
            .map(|(point, offset)| (*point + *offset * ring.offset).extend(ring.z))
            .collect()
    };

    let layers: Vec<Vec<Vec3>> = rings.iter().map(ring_points).collect();
    for pair in layers.windows(2) {
        let (near, far) = (&pair[0], &pair[1]);
        let len = near.len();
        for index in 0..len {
            let next = (index + 1) % len;
            mesh.push_quad([near[index], near[next], far[next], far[index]]);
        }
    }

    if let (Some(back), Some(front)) = (layers.first(), layers.last()) {
        let back_rim: Vec<Vec3> = back.iter().rev().copied().collect();
        mesh.push_fan(Vec3::new(0.0, 0.0, back[0].z), &back_rim, Vec3::NEG_Z);
        mesh.push_fan(Vec3::new(0.0, 0.0, front[0].z), front, Vec3::Z);
    }

    mesh
}
