#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Star topper crowning the tree: a beveled five-pointed star that spins,
//! bobs and pulses, surrounded by sparkles and lit by a golden point light.

pub mod extrude;

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec2, Vec3};
use holiday_scene_core::{
    geometry::MeshGeometry, Event, FrameTime, MotionTiming, PointLight, Rgb, Transform,
};
use holiday_scene_system_sparkles::{SparkleField, SparkleSpec};

use self::extrude::{extrude, ExtrudeSettings};

/// Radius of the star's points.
pub const OUTER_RADIUS: f32 = 1.2;

/// Radius of the star's inner corners.
pub const INNER_RADIUS: f32 = 0.5;

/// Number of points on the star.
pub const POINTS: usize = 5;

/// Z-rotation added per reference frame, in radians.
pub const SPIN_PER_FRAME: f32 = 0.01;

/// Height the star bobs around, relative to its anchor.
pub const BOB_CENTER: f32 = 8.0;

/// Peak vertical deviation of the bob.
pub const BOB_AMPLITUDE: f32 = 0.2;

/// Angular frequency of the bob in radians per second.
pub const BOB_FREQUENCY: f32 = 1.5;

/// Peak relative deviation of the pulse.
pub const PULSE_AMPLITUDE: f32 = 0.1;

/// Angular frequency of the pulse in radians per second.
pub const PULSE_FREQUENCY: f32 = 2.0;

/// Bevel profile applied to the star.
pub const EXTRUDE_SETTINGS: ExtrudeSettings = ExtrudeSettings {
    depth: 0.15,
    bevel_enabled: true,
    bevel_thickness: 0.05,
    bevel_size: 0.05,
    bevel_segments: 2,
};

/// Counter-clockwise star outline alternating outer and inner radii, starting
/// at the bottom point.
#[must_use]
pub fn star_outline(points: usize, outer_radius: f32, inner_radius: f32) -> Vec<Vec2> {
    (0..points * 2)
        .map(|index| {
            let angle = index as f32 * PI / points as f32 - FRAC_PI_2;
            let radius = if index % 2 == 0 {
                outer_radius
            } else {
                inner_radius
            };
            Vec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// Beveled star mesh with the default proportions.
#[must_use]
pub fn star_geometry() -> MeshGeometry {
    extrude(
        &star_outline(POINTS, OUTER_RADIUS, INNER_RADIUS),
        &EXTRUDE_SETTINGS,
    )
}

/// Local height of the star at `elapsed` seconds.
#[must_use]
pub fn bob_height(elapsed: f32) -> f32 {
    BOB_CENTER + (elapsed * BOB_FREQUENCY).sin() * BOB_AMPLITUDE
}

/// Uniform scale of the star at `elapsed` seconds.
#[must_use]
pub fn pulse_scale(elapsed: f32) -> f32 {
    1.0 + (elapsed * PULSE_FREQUENCY).sin() * PULSE_AMPLITUDE
}

/// Sparkle fields surrounding the star.
#[must_use]
pub fn sparkle_specs() -> [SparkleSpec; 2] {
    [
        SparkleSpec {
            count: 100,
            extent: Vec3::splat(3.0),
            center: Vec3::ZERO,
            size: 3.0,
            speed: 0.4,
            opacity: 0.8,
            color: Rgb::from_hex(0xFFD700),
        },
        SparkleSpec {
            count: 50,
            extent: Vec3::splat(2.5),
            center: Vec3::ZERO,
            size: 2.0,
            speed: 0.3,
            opacity: 0.6,
            color: Rgb::from_hex(0xFFB7C5),
        },
    ]
}

/// Configuration parameters required to construct the star system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Seed for the sparkle streams.
    pub seed: u64,
    /// How per-frame constants map onto frame durations.
    pub timing: MotionTiming,
    /// World-space anchor of the star group.
    pub anchor: Vec3,
}

impl Config {
    /// Default anchor of the star group.
    pub const DEFAULT_ANCHOR: Vec3 = Vec3::new(0.0, 8.0, 0.0);

    /// Creates a configuration anchored at [`Self::DEFAULT_ANCHOR`].
    #[must_use]
    pub const fn new(seed: u64, timing: MotionTiming) -> Self {
        Self {
            seed,
            timing,
            anchor: Self::DEFAULT_ANCHOR,
        }
    }
}

/// System that animates the star from stage events.
#[derive(Debug)]
pub struct StarTopper {
    anchor: Vec3,
    timing: MotionTiming,
    geometry: MeshGeometry,
    transform: Transform,
    sparkles: Vec<SparkleField>,
}

impl StarTopper {
    /// Builds the star mesh once and scatters the sparkles.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let sparkles = sparkle_specs()
            .into_iter()
            .zip(0_u64..)
            .map(|(spec, stream)| SparkleField::seeded(spec, config.seed.wrapping_add(stream)))
            .collect();

        Self {
            anchor: config.anchor,
            timing: config.timing,
            geometry: star_geometry(),
            transform: Transform::from_translation(Vec3::new(0.0, bob_height(0.0), 0.0)),
            sparkles,
        }
    }

    /// Consumes stage events, advancing on ticks.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::TimeAdvanced { frame } = event {
                self.advance(frame);
            }
        }
    }

    fn advance(&mut self, frame: &FrameTime) {
        let elapsed = frame.elapsed();
        self.transform.rotation.z += self.timing.increment(SPIN_PER_FRAME, frame);
        self.transform.translation.y = bob_height(elapsed);
        self.transform.scale = Vec3::splat(pulse_scale(elapsed));

        for field in &mut self.sparkles {
            field.advance(frame);
        }
    }

    /// Star mesh in local space.
    #[must_use]
    pub const fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    /// Star transform relative to the anchor.
    #[must_use]
    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// World matrix of the anchor group.
    #[must_use]
    pub fn anchor_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.anchor)
    }

    /// World matrix of the star mesh.
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.anchor_matrix() * self.transform.matrix()
    }

    /// Light shining from the anchor.
    #[must_use]
    pub fn light(&self) -> PointLight {
        PointLight {
            position: Vec3::ZERO,
            intensity: 3.0,
            color: Rgb::from_hex(0xFFD700),
            distance: 15.0,
        }
    }

    /// Sparkle fields relative to the anchor.
    #[must_use]
    pub fn sparkles(&self) -> &[SparkleField] {
        &self.sparkles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_alternates_radii_starting_at_bottom_point() {
        let outline = star_outline(POINTS, OUTER_RADIUS, INNER_RADIUS);

        assert_eq!(outline.len(), 10);
        assert!((outline[0] - Vec2::new(0.0, -OUTER_RADIUS)).length() <= 1e-6);
        for (index, point) in outline.iter().enumerate() {
            let expected = if index % 2 == 0 {
                OUTER_RADIUS
            } else {
                INNER_RADIUS
            };
            assert!((point.length() - expected).abs() <= 1e-6);
        }
    }

    #[test]
    fn outline_winds_counter_clockwise() {
        let outline = star_outline(POINTS, OUTER_RADIUS, INNER_RADIUS);
        let doubled_area: f32 = outline
            .iter()
            .zip(outline.iter().cycle().skip(1))
            .map(|(a, b)| a.perp_dot(*b))
            .sum();
        assert!(doubled_area > 0.0);
    }
}
