//! File-backed configuration for the showcase.

use glam::Vec3;
use holiday_scene_core::MotionTiming;
use holiday_scene_rendering::{CameraRig, RenderingError};
use holiday_scene_system_holiday_text::ParticleLine;
use holiday_scene_system_tree_decorations::{DecorationKind, PoolConfig};
use serde::Deserialize;
use thiserror::Error;

/// Seed used when neither the file nor the command line provides one.
pub const DEFAULT_SEED: u64 = 2024;

/// Errors raised while loading or validating a [`ShowcaseConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse showcase configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A numeric field is NaN or infinite.
    #[error("`{field}` must be finite")]
    NonFinite {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// A pool's rest radius or dispersal lower bound is negative.
    #[error("{kind:?} radii must not be negative (received {radius})")]
    NegativeRadius {
        /// Pool the radius belongs to.
        kind: DecorationKind,
        /// Rejected radius.
        radius: f32,
    },
    /// A pool's dispersal band has its lower bound above the upper bound.
    #[error("{kind:?} dispersal band is inverted ({min} > {max})")]
    InvertedBand {
        /// Pool the band belongs to.
        kind: DecorationKind,
        /// Lower bound of the band.
        min: f32,
        /// Upper bound of the band.
        max: f32,
    },
    /// Normalized timing needs a positive reference rate.
    #[error("reference rate must be positive (received {reference_hz})")]
    InvalidReferenceRate {
        /// Rejected rate.
        reference_hz: f32,
    },
    /// The camera settings describe a degenerate projection.
    #[error(transparent)]
    Camera(#[from] RenderingError),
}

/// Optional overrides applied on top of a pool's defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolOverrides {
    /// Number of members.
    pub count: Option<usize>,
    /// Base radius of the rest cone.
    pub rest_radius: Option<f32>,
    /// Inner radius of the dispersal band.
    pub dispersal_min: Option<f32>,
    /// Outer radius of the dispersal band.
    pub dispersal_max: Option<f32>,
}

impl PoolOverrides {
    /// Applies the overrides to `base`.
    #[must_use]
    pub fn apply(&self, base: PoolConfig) -> PoolConfig {
        PoolConfig {
            count: self.count.unwrap_or(base.count),
            rest_radius: self.rest_radius.unwrap_or(base.rest_radius),
            dispersal_min: self.dispersal_min.unwrap_or(base.dispersal_min),
            dispersal_max: self.dispersal_max.unwrap_or(base.dispersal_max),
            ..base
        }
    }
}

/// Particle counts for the greeting.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextSettings {
    /// Particles around the primary label.
    pub primary_particles: usize,
    /// Particles around the secondary label.
    pub secondary_particles: usize,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            primary_particles: ParticleLine::PRIMARY.count,
            secondary_particles: ParticleLine::SECONDARY.count,
        }
    }
}

/// Orbit camera settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    /// Height of the point the camera looks at.
    pub target_height: f32,
    /// Horizontal distance from the tree axis.
    pub radius: f32,
    /// Eye height.
    pub height: f32,
    /// Angular speed in radians per second.
    pub orbit_speed: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            target_height: 4.5,
            radius: 26.0,
            height: 5.0,
            orbit_speed: 0.15,
            fov_degrees: 55.0,
        }
    }
}

impl CameraSettings {
    /// Builds the camera rig described by these settings.
    pub fn rig(&self) -> Result<CameraRig, RenderingError> {
        CameraRig::new(
            Vec3::new(0.0, self.target_height, 0.0),
            self.radius,
            self.height,
            self.orbit_speed,
            self.fov_degrees,
        )
    }
}

/// Complete showcase configuration.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowcaseConfig {
    /// Scene seed every component derives its random stream from.
    pub seed: u64,
    /// How per-frame constants map onto frame durations.
    pub motion_timing: MotionTiming,
    /// Cube pool overrides.
    pub cubes: PoolOverrides,
    /// Gem pool overrides.
    pub gems: PoolOverrides,
    /// Greeting particle counts.
    pub text: TextSettings,
    /// Orbit camera.
    pub camera: CameraSettings,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            motion_timing: MotionTiming::default(),
            cubes: PoolOverrides::default(),
            gems: PoolOverrides::default(),
            text: TextSettings::default(),
            camera: CameraSettings::default(),
        }
    }
}

impl ShowcaseConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolved configuration of the requested pool.
    #[must_use]
    pub fn pool(&self, kind: DecorationKind) -> PoolConfig {
        let overrides = match kind {
            DecorationKind::Cube => &self.cubes,
            DecorationKind::Gem => &self.gems,
        };
        overrides.apply(PoolConfig::for_kind(kind))
    }

    /// Checks every numeric field for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let MotionTiming::Normalized { reference_hz } = self.motion_timing {
            if !reference_hz.is_finite() || reference_hz <= 0.0 {
                return Err(ConfigError::InvalidReferenceRate { reference_hz });
            }
        }

        for kind in [DecorationKind::Cube, DecorationKind::Gem] {
            validate_pool(kind, &self.pool(kind))?;
        }

        let camera = &self.camera;
        for (field, value) in [
            ("camera.target_height", camera.target_height),
            ("camera.height", camera.height),
            ("camera.orbit_speed", camera.orbit_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }
        let _ = camera.rig()?;

        Ok(())
    }
}

fn validate_pool(kind: DecorationKind, pool: &PoolConfig) -> Result<(), ConfigError> {
    let fields = match kind {
        DecorationKind::Cube => [
            "cubes.rest_radius",
            "cubes.dispersal_min",
            "cubes.dispersal_max",
        ],
        DecorationKind::Gem => ["gems.rest_radius", "gems.dispersal_min", "gems.dispersal_max"],
    };
    for (field, value) in fields
        .into_iter()
        .zip([pool.rest_radius, pool.dispersal_min, pool.dispersal_max])
    {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { field });
        }
    }

    for radius in [pool.rest_radius, pool.dispersal_min] {
        if radius < 0.0 {
            return Err(ConfigError::NegativeRadius { kind, radius });
        }
    }
    if pool.dispersal_min > pool.dispersal_max {
        return Err(ConfigError::InvertedBand {
            kind,
            min: pool.dispersal_min,
            max: pool.dispersal_max,
        });
    }
    Ok(())
}
