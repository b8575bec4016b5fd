#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Holiday greeting: two text labels wrapped in golden particle clouds.
//!
//! The whole group yaws to face the viewer every frame, the labels pulse
//! gently, and the particle clouds shimmer with a small vertical jitter.

use glam::{Mat4, Vec3};
use holiday_scene_core::{Event, FrameTime, PointLight, Rgb, Transform};
use holiday_scene_system_sparkles::{SparkleField, SparkleSpec};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Peak vertical displacement added to a particle per reference frame.
pub const JITTER_AMPLITUDE: f32 = 0.0005;

/// Angular frequency of the particle jitter in radians per second.
pub const JITTER_FREQUENCY: f32 = 2.0;

/// Phase offset per flat-buffer offset of a particle.
pub const JITTER_PHASE_STEP: f32 = 0.1;

/// Angular frequency of the label pulse in radians per second.
pub const PULSE_FREQUENCY: f32 = 1.5;

/// Peak relative deviation of the label pulse.
pub const PULSE_AMPLITUDE: f32 = 0.03;

/// Factor applied to the secondary label's pulse.
pub const SECONDARY_LABEL_DAMPING: f32 = 0.98;

/// Rectangular band of particles scattered around one line of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleLine {
    /// Number of particles in the band.
    pub count: usize,
    /// Horizontal extent of the band.
    pub width: f32,
    /// Height of the band's centre.
    pub center_y: f32,
    /// Vertical extent of the band.
    pub height: f32,
    /// Depth extent of the band.
    pub depth: f32,
}

impl ParticleLine {
    /// Band around the "Happy Holidays!" line.
    pub const PRIMARY: Self = Self {
        count: 100,
        width: 5.0,
        center_y: 10.5,
        height: 0.6,
        depth: 0.5,
    };

    /// Band around the "from Ran" line.
    pub const SECONDARY: Self = Self {
        count: 60,
        width: 3.0,
        center_y: 9.7,
        height: 0.5,
        depth: 0.4,
    };

    fn sample<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let x = (rng.gen::<f32>() - 0.5) * self.width;
        let y = self.center_y + (rng.gen::<f32>() - 0.5) * self.height;
        let z = (rng.gen::<f32>() - 0.5) * self.depth;
        Vec3::new(x, y, z)
    }
}

/// Vertical displacement applied to the particle at flat-buffer `offset`.
#[must_use]
pub fn jitter_offset(elapsed: f32, offset: usize) -> f32 {
    (elapsed * JITTER_FREQUENCY + offset as f32 * JITTER_PHASE_STEP).sin() * JITTER_AMPLITUDE
}

/// Uniform scale of the primary label at `elapsed` seconds.
#[must_use]
pub fn label_pulse(elapsed: f32) -> f32 {
    1.0 + (elapsed * PULSE_FREQUENCY).sin() * PULSE_AMPLITUDE
}

/// Yaw that turns a group at `origin` to face `viewer` around the vertical axis.
///
/// A viewer directly above or below the group yields a yaw of zero.
#[must_use]
pub fn facing_yaw(origin: Vec3, viewer: Vec3) -> f32 {
    let direction = viewer - origin;
    direction.x.atan2(direction.z)
}

/// Flat buffer of particle coordinates stored as consecutive `x, y, z` triples.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleCloud {
    coordinates: Vec<f32>,
}

impl ParticleCloud {
    /// Scatters every line's particles, in line order, into one buffer.
    pub fn generate<R: Rng>(lines: &[ParticleLine], rng: &mut R) -> Self {
        let total: usize = lines.iter().map(|line| line.count).sum();
        let mut coordinates = Vec::with_capacity(total * 3);
        for line in lines {
            for _ in 0..line.count {
                coordinates.extend_from_slice(&line.sample(rng).to_array());
            }
        }
        Self { coordinates }
    }

    /// Adds the jitter for `elapsed` to every particle.
    ///
    /// The jitter is a displacement applied once per frame, so it is never
    /// scaled by frame duration.
    pub fn jitter(&mut self, elapsed: f32) {
        for offset in (0..self.coordinates.len()).step_by(3) {
            if let Some(y) = self.coordinates.get_mut(offset + 1) {
                *y += jitter_offset(elapsed, offset);
            }
        }
    }

    /// Raw coordinate buffer.
    #[must_use]
    pub fn coordinates(&self) -> &[f32] {
        &self.coordinates
    }

    /// Number of particles in the cloud.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coordinates.len() / 3
    }

    /// Whether the cloud holds no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Iterates over particle positions.
    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.coordinates
            .chunks_exact(3)
            .map(|triple| Vec3::new(triple[0], triple[1], triple[2]))
    }
}

/// Line of text rendered by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    /// Text content.
    pub content: &'static str,
    /// Anchor position relative to the group.
    pub anchor: Vec3,
    /// Glyph height in world units.
    pub font_size: f32,
    /// Outline thickness in world units.
    pub outline_width: f32,
    /// Current uniform scale.
    pub scale: f32,
}

impl TextLabel {
    fn new(content: &'static str, anchor: Vec3, font_size: f32, outline_width: f32) -> Self {
        Self {
            content,
            anchor,
            font_size,
            outline_width,
            scale: 1.0,
        }
    }

    /// Transform relative to the group.
    #[must_use]
    pub fn local_transform(&self) -> Transform {
        Transform::from_translation(self.anchor).with_uniform_scale(self.scale)
    }
}

/// Configuration parameters required to construct the text system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Seed for the particle and sparkle streams.
    pub seed: u64,
    /// World-space position of the group.
    pub position: Vec3,
    /// Viewer position assumed until the stage reports one.
    pub viewer: Vec3,
    /// Particle band around the primary label.
    pub primary_line: ParticleLine,
    /// Particle band around the secondary label.
    pub secondary_line: ParticleLine,
}

impl Config {
    /// Creates a configuration using the default particle bands.
    #[must_use]
    pub const fn new(seed: u64, viewer: Vec3) -> Self {
        Self {
            seed,
            position: Vec3::ZERO,
            viewer,
            primary_line: ParticleLine::PRIMARY,
            secondary_line: ParticleLine::SECONDARY,
        }
    }
}

/// Sparkle fields surrounding the labels.
#[must_use]
pub fn sparkle_specs() -> [SparkleSpec; 3] {
    [
        SparkleSpec {
            count: 100,
            extent: Vec3::new(6.0, 1.5, 2.0),
            center: Vec3::new(0.0, 10.5, 0.0),
            size: 3.0,
            speed: 0.3,
            opacity: 0.6,
            color: Rgb::from_hex(0xE8C875),
        },
        SparkleSpec {
            count: 60,
            extent: Vec3::new(4.0, 1.2, 1.5),
            center: Vec3::new(0.0, 9.7, 0.0),
            size: 2.5,
            speed: 0.25,
            opacity: 0.5,
            color: Rgb::from_hex(0xD4AF37),
        },
        SparkleSpec {
            count: 80,
            extent: Vec3::new(5.0, 2.0, 2.0),
            center: Vec3::new(0.0, 10.1, 0.0),
            size: 2.0,
            speed: 0.4,
            opacity: 0.5,
            color: Rgb::from_hex(0xFFB7C5),
        },
    ]
}

/// Soft golden lights placed just in front of each label.
#[must_use]
pub fn lights() -> [PointLight; 2] {
    [
        PointLight {
            position: Vec3::new(0.0, 10.5, 0.5),
            intensity: 1.2,
            color: Rgb::from_hex(0xE8C875),
            distance: 8.0,
        },
        PointLight {
            position: Vec3::new(0.0, 9.7, 0.5),
            intensity: 1.0,
            color: Rgb::from_hex(0xE8C875),
            distance: 6.0,
        },
    ]
}

/// System that animates the greeting group from stage events.
#[derive(Debug)]
pub struct HolidayText {
    position: Vec3,
    yaw: f32,
    viewer: Vec3,
    cloud: ParticleCloud,
    labels: [TextLabel; 2],
    sparkles: Vec<SparkleField>,
}

impl HolidayText {
    /// Scatters the particle clouds and sparkles and places both labels.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let lines = [config.primary_line, config.secondary_line];
        let cloud = ParticleCloud::generate(&lines, &mut rng);
        let sparkles = sparkle_specs()
            .into_iter()
            .map(|spec| SparkleField::generate(spec, &mut rng))
            .collect();

        Self {
            position: config.position,
            yaw: facing_yaw(config.position, config.viewer),
            viewer: config.viewer,
            cloud,
            labels: [
                TextLabel::new("Happy Holidays!", Vec3::new(0.0, 10.5, 0.0), 0.45, 0.01),
                TextLabel::new("from Ran", Vec3::new(0.0, 9.7, 0.0), 0.35, 0.008),
            ],
            sparkles,
        }
    }

    /// Consumes stage events, tracking the viewer and advancing on ticks.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ViewerMoved { position } => self.viewer = *position,
                Event::TimeAdvanced { frame } => self.advance(frame),
                Event::AnimationModeChanged { .. } => {}
            }
        }
    }

    fn advance(&mut self, frame: &FrameTime) {
        let elapsed = frame.elapsed();
        self.cloud.jitter(elapsed);
        self.yaw = facing_yaw(self.position, self.viewer);

        let scale = label_pulse(elapsed);
        let [primary, secondary] = &mut self.labels;
        primary.scale = scale;
        secondary.scale = scale * SECONDARY_LABEL_DAMPING;

        for field in &mut self.sparkles {
            field.advance(frame);
        }
    }

    /// Current yaw of the group in radians.
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// World transform of the group.
    #[must_use]
    pub fn group_transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: Vec3::new(0.0, self.yaw, 0.0),
            scale: Vec3::ONE,
        }
    }

    /// World matrix of the group.
    #[must_use]
    pub fn group_matrix(&self) -> Mat4 {
        self.group_transform().matrix()
    }

    /// Particle cloud in group space.
    #[must_use]
    pub const fn cloud(&self) -> &ParticleCloud {
        &self.cloud
    }

    /// Both labels, primary first.
    #[must_use]
    pub const fn labels(&self) -> &[TextLabel; 2] {
        &self.labels
    }

    /// Sparkle fields in group space.
    #[must_use]
    pub fn sparkles(&self) -> &[SparkleField] {
        &self.sparkles
    }
}
