#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic tree decoration system driving two pools of instanced objects.
//!
//! Every pool member owns a resting position on the tree and a dispersed
//! position on a surrounding shell, both sampled once at creation. Each frame
//! the member's current position is smoothed toward whichever layout the
//! active [`AnimationMode`] selects, so mode flips reverse motion smoothly
//! instead of teleporting.

pub mod placement;

use glam::{Mat4, Vec3};
use holiday_scene_core::{AnimationMode, Event, FrameTime, MotionTiming, Transform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Fraction of the remaining distance covered per reference frame.
pub const SMOOTHING_FACTOR: f32 = 0.05;

/// Default number of cubes in the cube pool.
pub const CUBE_COUNT: usize = 1000;

/// Default number of gems in the gem pool.
pub const GEM_COUNT: usize = 1000;

/// Kinds of decoration pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    /// Box-shaped decorations.
    Cube,
    /// Icosahedron-shaped decorations.
    Gem,
}

/// Pair of rotation axes a pool spins around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpinAxes {
    /// Spin around the X and Y axes.
    XY,
    /// Spin around the X and Z axes.
    XZ,
}

impl SpinAxes {
    /// Unit mask selecting the spinning axes.
    #[must_use]
    pub const fn mask(self) -> Vec3 {
        match self {
            Self::XY => Vec3::new(1.0, 1.0, 0.0),
            Self::XZ => Vec3::new(1.0, 0.0, 1.0),
        }
    }
}

/// Staggered scale oscillation `base + sin(t * frequency + index * phase_step) * amplitude`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    /// Scale around which members oscillate.
    pub base: f32,
    /// Peak deviation from the base scale.
    pub amplitude: f32,
    /// Angular frequency in radians per second.
    pub frequency: f32,
    /// Phase offset added per member index.
    pub phase_step: f32,
}

impl Pulse {
    /// Scale of member `index` at `elapsed` seconds.
    #[must_use]
    pub fn scale_at(&self, elapsed: f32, index: usize) -> f32 {
        let phase = elapsed * self.frequency + index as f32 * self.phase_step;
        self.base + phase.sin() * self.amplitude
    }
}

/// Constants describing a single decoration pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoolConfig {
    /// Number of members in the pool.
    pub count: usize,
    /// Radius of the tree layout at its base.
    pub rest_radius: f32,
    /// Inner radius of the dispersal shell.
    pub dispersal_min: f32,
    /// Outer radius of the dispersal shell.
    pub dispersal_max: f32,
    /// Axes each member spins around.
    pub spin_axes: SpinAxes,
    /// Rotation added to each spinning axis per reference frame, in radians.
    pub spin_rate: f32,
    /// Scale oscillation applied to every member.
    pub pulse: Pulse,
}

impl PoolConfig {
    /// Cube pool constants.
    pub const CUBES: Self = Self {
        count: CUBE_COUNT,
        rest_radius: 2.8,
        dispersal_min: 20.0,
        dispersal_max: 35.0,
        spin_axes: SpinAxes::XY,
        spin_rate: 0.02,
        pulse: Pulse {
            base: 0.12,
            amplitude: 0.03,
            frequency: 1.0,
            phase_step: 1.0,
        },
    };

    /// Gem pool constants.
    pub const GEMS: Self = Self {
        count: GEM_COUNT,
        rest_radius: 2.5,
        dispersal_min: 18.0,
        dispersal_max: 30.0,
        spin_axes: SpinAxes::XZ,
        spin_rate: 0.015,
        pulse: Pulse {
            base: 0.1,
            amplitude: 0.02,
            frequency: 0.8,
            phase_step: 0.5,
        },
    };

    /// Default constants for the provided pool kind.
    #[must_use]
    pub const fn for_kind(kind: DecorationKind) -> Self {
        match kind {
            DecorationKind::Cube => Self::CUBES,
            DecorationKind::Gem => Self::GEMS,
        }
    }
}

/// Single instanced decoration identified by its index in the pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Member {
    rest: Vec3,
    dispersed: Vec3,
    current: Vec3,
    rotation: Vec3,
}

impl Member {
    fn new(rest: Vec3, dispersed: Vec3) -> Self {
        Self {
            rest,
            dispersed,
            current: rest,
            rotation: Vec3::ZERO,
        }
    }

    /// Position on the tree layout.
    #[must_use]
    pub const fn rest(&self) -> Vec3 {
        self.rest
    }

    /// Position on the dispersal shell.
    #[must_use]
    pub const fn dispersed(&self) -> Vec3 {
        self.dispersed
    }

    /// Current interpolated position.
    #[must_use]
    pub const fn current(&self) -> Vec3 {
        self.current
    }

    /// Accumulated Euler rotation.
    #[must_use]
    pub const fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Target selected by `mode`.
    #[must_use]
    pub const fn target(&self, mode: AnimationMode) -> Vec3 {
        match mode {
            AnimationMode::Tree => self.rest,
            AnimationMode::Exploded => self.dispersed,
        }
    }
}

/// Per-instance transforms owned by a pool and uploaded by the host.
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    transforms: Vec<Mat4>,
    dirty: bool,
}

impl InstanceBuffer {
    fn with_len(len: usize) -> Self {
        Self {
            transforms: vec![Mat4::IDENTITY; len],
            dirty: true,
        }
    }

    fn write(&mut self, index: usize, transform: Mat4) {
        if let Some(slot) = self.transforms.get_mut(index) {
            *slot = transform;
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the buffer changed since the last flush.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of instance transforms in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the buffer holds no transforms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Read-only view of the transforms regardless of the dirty flag.
    #[must_use]
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Returns the transforms when they changed since the last flush and
    /// clears the dirty flag.
    pub fn flush(&mut self) -> Option<&[Mat4]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(&self.transforms)
    }
}

/// Fixed-size pool of decorations sharing one instance buffer.
#[derive(Clone, Debug)]
pub struct DecorationPool {
    config: PoolConfig,
    members: Vec<Member>,
    buffer: InstanceBuffer,
}

impl DecorationPool {
    /// Samples both target layouts for every member of a new pool.
    pub fn generate<R: Rng>(config: PoolConfig, rng: &mut R) -> Self {
        let members = (0..config.count)
            .map(|_| {
                let rest = placement::sample_rest_position(rng, config.rest_radius);
                let dispersed = placement::sample_dispersed_position(
                    rng,
                    config.dispersal_min,
                    config.dispersal_max,
                );
                Member::new(rest, dispersed)
            })
            .collect::<Vec<_>>();

        let mut pool = Self {
            config,
            buffer: InstanceBuffer::with_len(members.len()),
            members,
        };
        pool.write_transforms(0.0);
        pool
    }

    /// Moves every member one frame toward the target selected by `mode`.
    pub fn advance(&mut self, mode: AnimationMode, frame: &FrameTime, timing: MotionTiming) {
        let smoothing = timing.smoothing(SMOOTHING_FACTOR, frame);
        let spin = self.config.spin_axes.mask() * timing.increment(self.config.spin_rate, frame);

        for member in &mut self.members {
            let target = member.target(mode);
            member.current += (target - member.current) * smoothing;
            member.rotation += spin;
        }

        self.write_transforms(frame.elapsed());
    }

    fn write_transforms(&mut self, elapsed: f32) {
        for (index, member) in self.members.iter().enumerate() {
            let transform = Transform {
                translation: member.current,
                rotation: member.rotation,
                scale: Vec3::ONE,
            }
            .with_uniform_scale(self.config.pulse.scale_at(elapsed, index));
            self.buffer.write(index, transform.matrix());
        }
        self.buffer.mark_dirty();
    }

    /// Constants the pool was generated with.
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Members ordered by their fixed index.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Instance buffer holding the latest transforms.
    #[must_use]
    pub const fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    /// Flushes the instance buffer; see [`InstanceBuffer::flush`].
    pub fn flush(&mut self) -> Option<&[Mat4]> {
        self.buffer.flush()
    }

    /// Mean distance between current positions and the targets of `mode`.
    #[must_use]
    pub fn mean_distance_to(&self, mode: AnimationMode) -> f32 {
        if self.members.is_empty() {
            return 0.0;
        }
        let total: f32 = self
            .members
            .iter()
            .map(|member| member.current.distance(member.target(mode)))
            .sum();
        total / self.members.len() as f32
    }
}

/// Configuration parameters required to construct the decoration system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Seed for the placement random stream.
    pub seed: u64,
    /// How per-frame constants map onto frame durations.
    pub timing: MotionTiming,
    /// Cube pool constants.
    pub cubes: PoolConfig,
    /// Gem pool constants.
    pub gems: PoolConfig,
}

impl Config {
    /// Creates a configuration using the default pools.
    #[must_use]
    pub const fn new(seed: u64, timing: MotionTiming) -> Self {
        Self {
            seed,
            timing,
            cubes: PoolConfig::CUBES,
            gems: PoolConfig::GEMS,
        }
    }
}

/// System that animates both decoration pools from stage events.
#[derive(Debug)]
pub struct TreeDecorations {
    cubes: DecorationPool,
    gems: DecorationPool,
    mode: AnimationMode,
    timing: MotionTiming,
}

impl TreeDecorations {
    /// Creates both pools, sampling cubes before gems from one seeded stream.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let cubes = DecorationPool::generate(config.cubes, &mut rng);
        let gems = DecorationPool::generate(config.gems, &mut rng);

        Self {
            cubes,
            gems,
            mode: AnimationMode::Tree,
            timing: config.timing,
        }
    }

    /// Consumes stage events, tracking mode changes and advancing on ticks.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AnimationModeChanged { mode } => self.mode = *mode,
                Event::TimeAdvanced { frame } => self.advance(frame),
                Event::ViewerMoved { .. } => {}
            }
        }
    }

    fn advance(&mut self, frame: &FrameTime) {
        self.cubes.advance(self.mode, frame, self.timing);
        self.gems.advance(self.mode, frame, self.timing);
    }

    /// Mode the pools are currently settling toward.
    #[must_use]
    pub const fn mode(&self) -> AnimationMode {
        self.mode
    }

    /// Pool holding decorations of the provided kind.
    #[must_use]
    pub const fn pool(&self, kind: DecorationKind) -> &DecorationPool {
        match kind {
            DecorationKind::Cube => &self.cubes,
            DecorationKind::Gem => &self.gems,
        }
    }

    /// Flushes the instance buffer of the provided pool.
    pub fn flush(&mut self, kind: DecorationKind) -> Option<&[Mat4]> {
        match kind {
            DecorationKind::Cube => self.cubes.flush(),
            DecorationKind::Gem => self.gems.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_returns_snapshot_once_per_dirty_frame() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut config = PoolConfig::CUBES;
        config.count = 4;
        let mut pool = DecorationPool::generate(config, &mut rng);

        assert_eq!(pool.flush().map(|transforms| transforms.len()), Some(4));
        assert!(pool.flush().is_none());

        let frame = FrameTime::START.advanced(std::time::Duration::from_millis(16));
        pool.advance(AnimationMode::Tree, &frame, MotionTiming::PerFrame);
        assert!(pool.buffer().is_dirty());
        assert!(pool.flush().is_some());
        assert!(!pool.buffer().is_dirty());
    }

    #[test]
    fn rotation_accumulates_on_configured_axes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut config = PoolConfig::GEMS;
        config.count = 2;
        let mut pool = DecorationPool::generate(config, &mut rng);
        let frame = FrameTime::new(1, 0.1, 0.1);

        for _ in 0..10 {
            pool.advance(AnimationMode::Tree, &frame, MotionTiming::PerFrame);
        }

        let rotation = pool.members()[1].rotation();
        assert!((rotation.x - 0.15).abs() <= 1e-5);
        assert_eq!(rotation.y, 0.0);
        assert!((rotation.z - 0.15).abs() <= 1e-5);
    }

    #[test]
    fn pulse_staggers_members_by_index() {
        let pulse = PoolConfig::CUBES.pulse;
        let first = pulse.scale_at(0.0, 0);
        let second = pulse.scale_at(0.0, 1);

        assert!((first - 0.12).abs() <= 1e-6);
        assert!((second - (0.12 + 1.0_f32.sin() * 0.03)).abs() <= 1e-6);
        assert!((0.09..=0.15).contains(&pulse.scale_at(12.3, 997)));
    }

    #[test]
    fn empty_pool_reports_zero_distance() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut config = PoolConfig::CUBES;
        config.count = 0;
        let pool = DecorationPool::generate(config, &mut rng);

        assert!(pool.buffer().is_empty());
        assert_eq!(pool.mean_distance_to(AnimationMode::Exploded), 0.0);
    }
}
