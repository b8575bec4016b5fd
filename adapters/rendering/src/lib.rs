#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for holiday scene adapters.

use anyhow::Result as AnyResult;
use glam::{Mat4, Vec3};
use holiday_scene_core::{geometry::MeshGeometry, AnimationMode, PointLight, Rgb};
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a scene tint.
    #[must_use]
    pub const fn from_rgb(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    fn channels(self) -> Vec3 {
        Vec3::new(self.red, self.green, self.blue)
    }

    fn from_channels(channels: Vec3, alpha: f32) -> Self {
        let channels = channels.clamp(Vec3::ZERO, Vec3::ONE);
        Self::new(channels.x, channels.y, channels.z, alpha)
    }
}

/// Surface description for a mesh, mirroring a metal/roughness workflow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Base albedo.
    pub color: Color,
    /// Self-illumination tint.
    pub emissive: Color,
    /// Multiplier applied to the emissive tint.
    pub emissive_intensity: f32,
    /// Metalness in the range 0.0..=1.0.
    pub metalness: f32,
    /// Roughness in the range 0.0..=1.0.
    pub roughness: f32,
    /// Surface opacity.
    pub opacity: f32,
}

impl Material {
    /// Share of the diffuse response a fully metallic surface keeps.
    const METALLIC_DIFFUSE: f32 = 0.5;

    /// Creates an opaque material.
    #[must_use]
    pub const fn new(
        color: Color,
        emissive: Color,
        emissive_intensity: f32,
        metalness: f32,
        roughness: f32,
    ) -> Self {
        Self {
            color,
            emissive,
            emissive_intensity,
            metalness,
            roughness,
            opacity: 1.0,
        }
    }

    /// Flat-shaded color of a surface patch at `position` facing `normal`.
    #[must_use]
    pub fn shade(&self, position: Vec3, normal: Vec3, lighting: &Lighting) -> Color {
        let diffuse_weight = 1.0 - self.metalness.clamp(0.0, 1.0) * (1.0 - Self::METALLIC_DIFFUSE);
        let light = lighting.illuminate(position, normal);
        let diffuse = self.color.channels() * light * diffuse_weight;
        let sheen = lighting.key_alignment(normal).powi(8)
            * lighting.key_intensity
            * (1.0 - self.roughness.clamp(0.0, 1.0));
        let glow = self.emissive.channels() * self.emissive_intensity * EMISSIVE_WEIGHT;

        Color::from_channels(diffuse + Vec3::splat(sheen * self.metalness) + glow, self.opacity)
    }
}

/// Fraction of the emissive term that reaches the flat-shaded output.
pub const EMISSIVE_WEIGHT: f32 = 0.35;

/// Lighting environment shared by every mesh in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    /// Uniform light reaching every surface.
    pub ambient: f32,
    /// Direction the key light travels in.
    pub key_direction: Vec3,
    /// Strength of the key light.
    pub key_intensity: f32,
    /// Point lights expressed in world space.
    pub point_lights: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.35,
            key_direction: Vec3::new(-0.4, -1.0, -0.3),
            key_intensity: 0.6,
            point_lights: Vec::new(),
        }
    }
}

impl Lighting {
    /// Incoming light per channel at `position` on a surface facing `normal`.
    #[must_use]
    pub fn illuminate(&self, position: Vec3, normal: Vec3) -> Vec3 {
        let normal = normal.normalize_or_zero();
        let mut light = Vec3::splat(self.ambient + self.key_alignment(normal) * self.key_intensity);

        for point in &self.point_lights {
            let offset = point.position - position;
            let distance = offset.length();
            if distance <= f32::EPSILON {
                continue;
            }
            let facing = normal.dot(offset / distance).max(0.0);
            light += Color::from_rgb(point.color).channels()
                * point.intensity
                * point.falloff(distance)
                * facing;
        }

        light
    }

    fn key_alignment(&self, normal: Vec3) -> f32 {
        normal
            .normalize_or_zero()
            .dot(-self.key_direction.normalize_or_zero())
            .max(0.0)
    }
}

/// Mesh drawn once per instance transform.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneMesh {
    /// Geometry in local space.
    pub geometry: MeshGeometry,
    /// Surface applied to every instance.
    pub material: Material,
    /// World matrices, one per drawn instance.
    pub instances: Vec<Mat4>,
}

impl SceneMesh {
    /// Creates a mesh with no instances.
    #[must_use]
    pub fn new(geometry: MeshGeometry, material: Material) -> Self {
        Self {
            geometry,
            material,
            instances: Vec::new(),
        }
    }

    /// Replaces every instance transform.
    pub fn set_instances(&mut self, transforms: &[Mat4]) {
        self.instances.clear();
        self.instances.extend_from_slice(transforms);
    }
}

/// Set of world-space points sharing a size and color.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    /// World-space points.
    pub points: Vec<Vec3>,
    /// Edge length of each drawn point in world units.
    pub size: f32,
    /// Color including opacity.
    pub color: Color,
}

impl PointCloud {
    /// Creates an empty cloud.
    #[must_use]
    pub const fn new(size: f32, color: Color) -> Self {
        Self {
            points: Vec::new(),
            size,
            color,
        }
    }
}

/// Text anchored in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Displayed text.
    pub text: String,
    /// World-space anchor of the text center.
    pub position: Vec3,
    /// Glyph height in world units.
    pub height: f32,
    /// Fill color.
    pub color: Color,
    /// Outline color.
    pub outline: Color,
    /// Outline width in world units.
    pub outline_width: f32,
}

/// Camera circling a target at a fixed height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// Point the camera looks at.
    pub target: Vec3,
    /// Horizontal distance from the target.
    pub radius: f32,
    /// Eye height in world units.
    pub height: f32,
    /// Angular speed of the orbit in radians per second.
    pub orbit_speed: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl CameraRig {
    /// Fastest orbit, in radians per second, in either direction.
    pub const MAX_ORBIT_SPEED: f32 = 1.0;

    /// Creates a camera rig, rejecting degenerate projections and orbit speeds
    /// beyond [`Self::MAX_ORBIT_SPEED`].
    pub fn new(
        target: Vec3,
        radius: f32,
        height: f32,
        orbit_speed: f32,
        fov_degrees: f32,
    ) -> Result<Self, RenderingError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(RenderingError::InvalidOrbitRadius { radius });
        }
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            return Err(RenderingError::InvalidFieldOfView { fov_degrees });
        }
        if !(orbit_speed.abs() <= Self::MAX_ORBIT_SPEED) {
            return Err(RenderingError::InvalidOrbitSpeed { orbit_speed });
        }

        Ok(Self {
            target,
            radius,
            height,
            orbit_speed,
            fov_degrees,
        })
    }

    /// Eye position after orbiting `angle` radians from the +Z side of the target.
    #[must_use]
    pub fn position_at(&self, angle: f32) -> Vec3 {
        Vec3::new(
            self.target.x + angle.sin() * self.radius,
            self.height,
            self.target.z + angle.cos() * self.radius,
        )
    }
}

/// Scene description combining every drawable and the lighting environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Active animation mode.
    pub mode: AnimationMode,
    /// Camera used to view the scene.
    pub camera: CameraRig,
    /// Light reaching every surface.
    pub lighting: Lighting,
    /// Cube decorations.
    pub cubes: SceneMesh,
    /// Gem decorations.
    pub gems: SceneMesh,
    /// Star topper.
    pub star: SceneMesh,
    /// Particle cloud surrounding the greeting.
    pub text_particles: PointCloud,
    /// Greeting labels.
    pub labels: Vec<Label>,
    /// Ambient sparkle fields.
    pub sparkles: Vec<PointCloud>,
}

impl Scene {
    /// Creates a scene with the provided meshes and no dynamic content.
    #[must_use]
    pub fn new(
        camera: CameraRig,
        cubes: SceneMesh,
        gems: SceneMesh,
        star: SceneMesh,
        text_particles: PointCloud,
    ) -> Self {
        Self {
            mode: AnimationMode::default(),
            camera,
            lighting: Lighting::default(),
            cubes,
            gems,
            star,
            text_particles,
            labels: Vec::new(),
            sparkles: Vec::new(),
        }
    }

    /// Meshes in draw order.
    #[must_use]
    pub fn meshes(&self) -> [&SceneMesh; 3] {
        [&self.cubes, &self.gems, &self.star]
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a toggle press on this frame.
    pub mode_toggle: bool,
    /// World position of the viewer when it moved this frame.
    pub viewer_position: Option<Vec3>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting holiday scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, per-frame
    /// input captured by the adapter, and may mutate the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The orbit radius must be positive and finite.
    #[error("orbit radius must be positive (received {radius})")]
    InvalidOrbitRadius {
        /// Provided radius that failed validation.
        radius: f32,
    },
    /// The field of view must lie strictly between 0 and 180 degrees.
    #[error("field of view must lie in (0, 180) degrees (received {fov_degrees})")]
    InvalidFieldOfView {
        /// Provided field of view that failed validation.
        fov_degrees: f32,
    },
    /// The orbit speed must not exceed [`CameraRig::MAX_ORBIT_SPEED`] in magnitude.
    #[error("orbit speed must lie in [-1, 1] rad/s (received {orbit_speed})")]
    InvalidOrbitSpeed {
        /// Provided orbit speed that failed validation.
        orbit_speed: f32,
    },
}
