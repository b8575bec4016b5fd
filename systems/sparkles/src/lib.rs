#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ambient sparkle fields floating around the text labels and the star.
//!
//! Sparkle positions are a pure function of the elapsed time: each point
//! drifts around a fixed base position along a per-point Lissajous curve, so
//! advancing twice to the same instant yields the same layout.

use glam::Vec3;
use holiday_scene_core::{FrameTime, Rgb};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Maximum offset of a sparkle from its base position along each axis.
pub const DRIFT_AMPLITUDE: f32 = 0.2;

/// Declarative description of a sparkle field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparkleSpec {
    /// Number of sparkles in the field.
    pub count: usize,
    /// Size of the box the base positions are scattered in.
    pub extent: Vec3,
    /// Centre of the box relative to the owning component.
    pub center: Vec3,
    /// Point size in screen units.
    pub size: f32,
    /// Drift speed in radians per second.
    pub speed: f32,
    /// Opacity in the range 0.0..=1.0.
    pub opacity: f32,
    /// Sparkle tint.
    pub color: Rgb,
}

/// Offset of a sparkle from its base position at `elapsed` seconds.
#[must_use]
pub fn drift(base: Vec3, noise: f32, elapsed: f32, speed: f32) -> Vec3 {
    let phase = elapsed * speed;
    let seed = base.x * noise;
    Vec3::new(
        (phase + seed * 300.0).cos(),
        (phase + seed * 100.0).sin(),
        (phase + seed * 200.0).cos(),
    ) * DRIFT_AMPLITUDE
}

/// Sparkle field with fixed base positions and per-frame drifting points.
#[derive(Clone, Debug)]
pub struct SparkleField {
    spec: SparkleSpec,
    bases: Vec<Vec3>,
    noise: Vec<f32>,
    points: Vec<Vec3>,
}

impl SparkleField {
    /// Scatters `spec.count` sparkles using the provided random stream.
    pub fn generate<R: Rng>(spec: SparkleSpec, rng: &mut R) -> Self {
        let mut bases = Vec::with_capacity(spec.count);
        let mut noise = Vec::with_capacity(spec.count);
        for _ in 0..spec.count {
            let unit = Vec3::new(rng.gen(), rng.gen(), rng.gen()) - Vec3::splat(0.5);
            bases.push(spec.center + unit * spec.extent);
            noise.push(rng.gen());
        }

        let mut field = Self {
            spec,
            points: bases.clone(),
            bases,
            noise,
        };
        field.place(0.0);
        field
    }

    /// Scatters sparkles using a dedicated stream derived from `seed`.
    #[must_use]
    pub fn seeded(spec: SparkleSpec, seed: u64) -> Self {
        Self::generate(spec, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Moves every sparkle to its position for `frame`.
    pub fn advance(&mut self, frame: &FrameTime) {
        self.place(frame.elapsed());
    }

    fn place(&mut self, elapsed: f32) {
        let speed = self.spec.speed;
        for ((point, base), noise) in self.points.iter_mut().zip(&self.bases).zip(&self.noise) {
            *point = *base + drift(*base, *noise, elapsed, speed);
        }
    }

    /// Description the field was generated from.
    #[must_use]
    pub const fn spec(&self) -> &SparkleSpec {
        &self.spec
    }

    /// Current sparkle positions relative to the owning component.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}
