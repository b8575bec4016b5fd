#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the holiday scene.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative stage, and the decorative systems. Adapters submit
//! [`Command`] values describing desired mutations, the stage executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems consume to advance their own buffers deterministically.

pub mod geometry;

use std::time::Duration;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Two-valued animation mode that selects which target layout the tree
/// decorations settle toward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationMode {
    /// Decorations rest on the cone-shaped tree layout.
    #[default]
    Tree,
    /// Decorations disperse onto the surrounding spherical shell.
    Exploded,
}

impl AnimationMode {
    /// Resolves the mode that results from applying `request` to `self`.
    ///
    /// This is the only transition function of the mode state machine. Every
    /// request is accepted; there is no terminal state.
    #[must_use]
    pub const fn transition(self, request: ModeRequest) -> Self {
        match request {
            ModeRequest::Toggle => match self {
                Self::Tree => Self::Exploded,
                Self::Exploded => Self::Tree,
            },
            ModeRequest::Set(mode) => mode,
        }
    }
}

/// External request that drives the animation mode state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeRequest {
    /// Flip between [`AnimationMode::Tree`] and [`AnimationMode::Exploded`].
    Toggle,
    /// Force the provided mode regardless of the current one.
    Set(AnimationMode),
}

/// Commands that express all permissible stage mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the animation clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a change of the animation mode.
    RequestMode {
        /// Transition to apply to the current mode.
        request: ModeRequest,
    },
    /// Reports the viewer's current world-space position.
    MoveViewer {
        /// World-space position of the viewer.
        position: Vec3,
    },
}

/// Events broadcast by the stage after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the animation clock advanced to a new frame.
    TimeAdvanced {
        /// Timing of the frame that just started.
        frame: FrameTime,
    },
    /// Announces that the animation mode changed.
    AnimationModeChanged {
        /// Mode that became active.
        mode: AnimationMode,
    },
    /// Announces that the viewer moved.
    ViewerMoved {
        /// New world-space position of the viewer.
        position: Vec3,
    },
}

/// Timing information for a single animation frame.
///
/// Elapsed time accumulates in double precision so long sessions do not drift.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    index: u64,
    elapsed: f64,
    delta: f32,
}

impl FrameTime {
    /// Clock state before the first frame.
    pub const START: Self = Self {
        index: 0,
        elapsed: 0.0,
        delta: 0.0,
    };

    /// Creates a frame timing snapshot from raw values.
    #[must_use]
    pub const fn new(index: u64, elapsed_seconds: f64, delta_seconds: f32) -> Self {
        Self {
            index,
            elapsed: elapsed_seconds,
            delta: delta_seconds,
        }
    }

    /// Returns the timing of the frame that follows `self` after `dt`.
    #[must_use]
    pub fn advanced(self, dt: Duration) -> Self {
        Self {
            index: self.index.saturating_add(1),
            elapsed: self.elapsed + dt.as_secs_f64(),
            delta: dt.as_secs_f32(),
        }
    }

    /// Number of frames started since the clock was created.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Seconds elapsed since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Seconds elapsed since the previous frame.
    #[must_use]
    pub const fn delta(&self) -> f32 {
        self.delta
    }
}

/// Governs how per-frame motion constants are applied.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionTiming {
    /// Apply every increment once per frame regardless of frame duration.
    PerFrame,
    /// Scale increments by the frame duration relative to a reference rate.
    Normalized {
        /// Frame rate at which normalized motion equals per-frame motion.
        reference_hz: f32,
    },
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self::Normalized {
            reference_hz: Self::REFERENCE_HZ,
        }
    }
}

impl MotionTiming {
    /// Display rate the per-frame constants were tuned for.
    pub const REFERENCE_HZ: f32 = 60.0;

    /// Most reference frames a single host frame may account for.
    ///
    /// Longer frames (a stalled or suspended window) advance motion as if
    /// only this many reference frames had passed.
    pub const MAX_FRAME_FRACTION: f32 = 6.0;

    /// Number of reference frames represented by `frame`.
    #[must_use]
    pub fn frame_fraction(self, frame: &FrameTime) -> f32 {
        match self {
            Self::PerFrame => 1.0,
            Self::Normalized { reference_hz } => {
                (frame.delta() * reference_hz).clamp(0.0, Self::MAX_FRAME_FRACTION)
            }
        }
    }

    /// Converts a per-frame increment into the increment for `frame`.
    #[must_use]
    pub fn increment(self, per_frame: f32, frame: &FrameTime) -> f32 {
        per_frame * self.frame_fraction(frame)
    }

    /// Converts a per-frame exponential smoothing factor into the factor for
    /// `frame`, so that `n` reference frames compound to the same result.
    #[must_use]
    pub fn smoothing(self, per_frame_factor: f32, frame: &FrameTime) -> f32 {
        match self {
            Self::PerFrame => per_frame_factor,
            Self::Normalized { .. } => {
                let frames = self.frame_fraction(frame);
                1.0 - (1.0 - per_frame_factor).powf(frames)
            }
        }
    }
}

/// Translation, Euler rotation and scale composed into a single transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position relative to the parent.
    pub translation: Vec3,
    /// Rotation in radians applied in X, Y, Z order.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Transform that leaves geometry untouched.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Creates a transform that only translates.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Replaces the scale with the same factor along every axis.
    #[must_use]
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Composes the transform into a column-major matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

/// Byte RGB color used by scene declarations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            red: ((hex >> 16) & 0xff) as u8,
            green: ((hex >> 8) & 0xff) as u8,
            blue: (hex & 0xff) as u8,
        }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Point light declared by a scene component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    /// Position relative to the declaring component.
    pub position: Vec3,
    /// Light intensity multiplier.
    pub intensity: f32,
    /// Light tint.
    pub color: Rgb,
    /// Distance at which the light's contribution reaches zero.
    pub distance: f32,
}

impl PointLight {
    /// Attenuation factor at `distance` from the light, falling linearly to zero.
    #[must_use]
    pub fn falloff(&self, distance: f32) -> f32 {
        if self.distance <= 0.0 {
            return 1.0;
        }
        (1.0 - distance / self.distance).clamp(0.0, 1.0)
    }
}
