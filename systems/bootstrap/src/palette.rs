//! Materials and colors used by the showcase.

use holiday_scene_core::Rgb;
use holiday_scene_rendering::{Color, Material};

/// Night-sky clear color.
pub const CLEAR_COLOR: Color = Color::from_rgb_u8(8, 10, 24);

/// Lavender metallic cubes with a white glow.
pub const CUBE: Material = Material::new(
    Color::from_rgb(Rgb::from_hex(0xE6E6FA)),
    Color::from_rgb(Rgb::from_hex(0xFFFFFF)),
    0.5,
    0.9,
    0.1,
);

/// Mirror-like gems with a plum glow.
pub const GEM: Material = Material::new(
    Color::from_rgb(Rgb::from_hex(0xFFFFFF)),
    Color::from_rgb(Rgb::from_hex(0xDDA0DD)),
    0.6,
    1.0,
    0.05,
);

/// Gold star glowing at twice its base intensity.
pub const STAR: Material = Material::new(
    Color::from_rgb(Rgb::from_hex(0xFFD700)),
    Color::from_rgb(Rgb::from_hex(0xFFD700)),
    2.0,
    1.0,
    0.1,
);

/// Warm gold label fill.
pub const TEXT: Material = Material::new(
    Color::from_rgb(Rgb::from_hex(0xE8C875)),
    Color::from_rgb(Rgb::from_hex(0xD4AF37)),
    0.8,
    0.7,
    0.3,
);

/// Label outline.
pub const TEXT_OUTLINE: Color = Color::from_rgb(Rgb::from_hex(0xD4AF37));

/// Particles surrounding the labels.
pub const TEXT_PARTICLE: Color = Color::from_rgb(Rgb::from_hex(0xE8C875)).with_alpha(0.7);

/// Edge length of each greeting particle.
pub const TEXT_PARTICLE_SIZE: f32 = 0.1;

/// World units per unit of sparkle size.
pub const SPARKLE_SCALE: f32 = 0.025;
