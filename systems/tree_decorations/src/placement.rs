//! Randomised target layouts for decoration pools.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

/// Height of the lowest point of the tree layout.
pub const TREE_BASE_Y: f32 = -7.0;

/// Vertical extent of the tree layout.
pub const TREE_HEIGHT: f32 = 15.0;

/// Samples a resting position inside the cone-shaped tree.
///
/// The radius tapers linearly from `rest_radius` at the base to zero at the
/// tip, so equal height bands hold equal counts while the upper bands are
/// narrower.
pub fn sample_rest_position<R: Rng>(rng: &mut R, rest_radius: f32) -> Vec3 {
    let t: f32 = rng.gen();
    let y = t * TREE_HEIGHT + TREE_BASE_Y;
    let radius = (1.0 - t) * rest_radius;
    let angle = rng.gen::<f32>() * TAU;

    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// Samples a dispersed position on a spherical shell.
///
/// Azimuth and polar angle are each drawn uniformly, which clusters points
/// toward the poles; the radius is drawn uniformly from
/// `[dispersal_min, dispersal_max]`.
pub fn sample_dispersed_position<R: Rng>(
    rng: &mut R,
    dispersal_min: f32,
    dispersal_max: f32,
) -> Vec3 {
    let phi = rng.gen::<f32>() * TAU;
    let theta = rng.gen::<f32>() * PI;
    let radius = dispersal_min + rng.gen::<f32>() * (dispersal_max - dispersal_min);

    Vec3::new(
        radius * theta.sin() * phi.cos(),
        radius * theta.sin() * phi.sin(),
        radius * theta.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rest_positions_taper_with_height() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let position = sample_rest_position(&mut rng, 2.8);
            let t = (position.y - TREE_BASE_Y) / TREE_HEIGHT;
            let radial = Vec3::new(position.x, 0.0, position.z).length();

            assert!(radial <= (1.0 - t) * 2.8 + 1e-4);
        }
    }

    #[test]
    fn degenerate_band_yields_fixed_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let position = sample_dispersed_position(&mut rng, 25.0, 25.0);
            assert!((position.length() - 25.0).abs() <= 1e-3);
        }
    }
}
