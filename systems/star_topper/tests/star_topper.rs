use std::{f32::consts::PI, time::Duration};

use glam::Vec3;
use holiday_scene_core::{Command, Event, MotionTiming};
use holiday_scene_stage::{self as stage, query, Stage};
use holiday_scene_system_star_topper::{
    bob_height, pulse_scale, star_geometry, Config, StarTopper, BOB_AMPLITUDE, BOB_CENTER,
    PULSE_AMPLITUDE, SPIN_PER_FRAME,
};

fn tick(stage: &mut Stage, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    stage::apply(stage, Command::Tick { dt }, &mut events);
    events
}

#[test]
fn spin_accumulates_per_frame() {
    let mut stage = Stage::new();
    let mut star = StarTopper::new(Config::new(3, MotionTiming::PerFrame));

    for _ in 0..100 {
        star.handle(&tick(&mut stage, Duration::from_millis(16)));
    }

    let expected = 100.0 * SPIN_PER_FRAME;
    assert!((star.transform().rotation.z - expected).abs() <= 1e-4);
}

#[test]
fn normalized_spin_tracks_wall_time() {
    let mut fast_stage = Stage::new();
    let mut slow_stage = Stage::new();
    let timing = MotionTiming::default();
    let mut fast = StarTopper::new(Config::new(3, timing));
    let mut slow = StarTopper::new(Config::new(3, timing));

    for _ in 0..120 {
        fast.handle(&tick(&mut fast_stage, Duration::from_secs_f64(1.0 / 60.0)));
    }
    for _ in 0..60 {
        slow.handle(&tick(&mut slow_stage, Duration::from_secs_f64(1.0 / 30.0)));
    }

    let difference = fast.transform().rotation.z - slow.transform().rotation.z;
    assert!(difference.abs() <= 1e-4);
}

#[test]
fn bob_and_pulse_stay_within_bounds() {
    let mut stage = Stage::new();
    let mut star = StarTopper::new(Config::new(3, MotionTiming::default()));

    for _ in 0..300 {
        star.handle(&tick(&mut stage, Duration::from_millis(33)));
        let transform = star.transform();
        let elapsed = query::frame(&stage).elapsed();

        assert!((transform.translation.y - bob_height(elapsed)).abs() <= 1e-6);
        assert!((transform.translation.y - BOB_CENTER).abs() <= BOB_AMPLITUDE + 1e-6);
        assert!((transform.scale.x - pulse_scale(elapsed)).abs() <= 1e-6);
        assert!((transform.scale.x - 1.0).abs() <= PULSE_AMPLITUDE + 1e-6);
        assert_eq!(transform.scale, Vec3::splat(transform.scale.x));
    }
}

#[test]
fn bob_peaks_a_quarter_period_in() {
    let quarter = PI / 2.0 / 1.5;
    assert!((bob_height(quarter) - (BOB_CENTER + BOB_AMPLITUDE)).abs() <= 1e-5);
    assert!((pulse_scale(PI / 4.0) - (1.0 + PULSE_AMPLITUDE)).abs() <= 1e-5);
}

#[test]
fn star_sits_above_its_anchor() {
    let mut stage = Stage::new();
    let mut star = StarTopper::new(Config::new(3, MotionTiming::default()));
    star.handle(&tick(&mut stage, Duration::from_millis(16)));

    let origin = star.world_matrix().transform_point3(Vec3::ZERO);
    let expected_y = Config::DEFAULT_ANCHOR.y + star.transform().translation.y;
    assert!((origin.y - expected_y).abs() <= 1e-5);
    assert_eq!(origin.x, 0.0);
}

#[test]
fn star_mesh_is_beveled_and_closed_around_the_origin() {
    let mesh = star_geometry();

    assert!(mesh.triangle_count() > 0);
    assert_eq!(mesh.normals().len(), mesh.vertex_count());

    let (min_z, max_z) = mesh
        .positions()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.z), hi.max(p.z)));
    assert!((min_z + 0.05).abs() <= 1e-5);
    assert!((max_z - 0.2).abs() <= 1e-5);

    let reach = mesh
        .positions()
        .iter()
        .map(|p| p.truncate().length())
        .fold(0.0_f32, f32::max);
    assert!(reach > 1.2 && reach < 1.5);
}

#[test]
fn sparkles_and_light_accompany_the_star() {
    let mut stage = Stage::new();
    let mut star = StarTopper::new(Config::new(3, MotionTiming::default()));
    let before: Vec<Vec<Vec3>> = star
        .sparkles()
        .iter()
        .map(|field| field.points().to_vec())
        .collect();

    star.handle(&tick(&mut stage, Duration::from_secs(1)));

    let counts: Vec<usize> = star
        .sparkles()
        .iter()
        .map(|field| field.points().len())
        .collect();
    assert_eq!(counts, vec![100, 50]);
    assert!(star
        .sparkles()
        .iter()
        .zip(&before)
        .any(|(field, previous)| field.points() != previous.as_slice()));

    let light = star.light();
    assert_eq!(light.intensity, 3.0);
    assert_eq!(light.distance, 15.0);
}

#[test]
fn stalled_frame_spins_a_bounded_amount() {
    let mut stage = Stage::new();
    let mut star = StarTopper::new(Config::new(3, MotionTiming::default()));

    star.handle(&tick(&mut stage, Duration::from_secs(3)));

    let expected = SPIN_PER_FRAME * MotionTiming::MAX_FRAME_FRACTION;
    assert!((star.transform().rotation.z - expected).abs() <= 1e-6);
}
