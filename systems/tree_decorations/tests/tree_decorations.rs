use std::time::Duration;

use glam::Vec3;
use holiday_scene_core::{AnimationMode, Command, Event, ModeRequest, MotionTiming};
use holiday_scene_stage::{self as stage, Stage};
use holiday_scene_system_tree_decorations::{
    placement::{TREE_BASE_Y, TREE_HEIGHT},
    Config, DecorationKind, PoolConfig, TreeDecorations, SMOOTHING_FACTOR,
};

const FRAME: Duration = Duration::from_micros(16_667);
const KINDS: [DecorationKind; 2] = [DecorationKind::Cube, DecorationKind::Gem];

fn per_frame_decorations(seed: u64) -> TreeDecorations {
    TreeDecorations::new(Config::new(seed, MotionTiming::PerFrame))
}

fn request_mode(stage: &mut Stage, mode: AnimationMode) -> Vec<Event> {
    let mut events = Vec::new();
    stage::apply(
        stage,
        Command::RequestMode {
            request: ModeRequest::Set(mode),
        },
        &mut events,
    );
    events
}

fn tick(stage: &mut Stage) -> Vec<Event> {
    let mut events = Vec::new();
    stage::apply(stage, Command::Tick { dt: FRAME }, &mut events);
    events
}

fn positions(decorations: &TreeDecorations, kind: DecorationKind) -> Vec<Vec3> {
    decorations
        .pool(kind)
        .members()
        .iter()
        .map(|member| member.current())
        .collect()
}

#[test]
fn default_pools_hold_a_thousand_members() {
    let decorations = per_frame_decorations(1);

    assert_eq!(decorations.pool(DecorationKind::Cube).members().len(), 1000);
    assert_eq!(decorations.pool(DecorationKind::Gem).members().len(), 1000);
    assert_eq!(
        decorations.pool(DecorationKind::Cube).buffer().len(),
        decorations.pool(DecorationKind::Cube).members().len()
    );
}

#[test]
fn rest_positions_stay_inside_the_tree_cone() {
    let decorations = per_frame_decorations(0xC0FFEE);

    for kind in KINDS {
        let pool = decorations.pool(kind);
        let radius = pool.config().rest_radius;
        for member in pool.members() {
            let rest = member.rest();
            let radial = Vec3::new(rest.x, 0.0, rest.z).length();

            assert!(rest.y >= TREE_BASE_Y && rest.y <= TREE_BASE_Y + TREE_HEIGHT);
            assert!((-7.0..=8.0).contains(&rest.y));
            assert!(radial <= radius + 1e-4, "{kind:?} radial {radial}");
            assert_eq!(member.current(), rest);
        }
    }
}

#[test]
fn dispersed_positions_stay_inside_the_band() {
    let decorations = per_frame_decorations(0xBADC0DE);

    for (kind, band) in [
        (DecorationKind::Cube, 20.0..=35.0),
        (DecorationKind::Gem, 18.0..=30.0),
    ] {
        for member in decorations.pool(kind).members() {
            let distance = member.dispersed().length();
            assert!(
                distance >= band.start() - 1e-3 && distance <= band.end() + 1e-3,
                "{kind:?} dispersed distance {distance} outside {band:?}"
            );
        }
    }
}

#[test]
fn resting_mode_converges_back_onto_the_tree() {
    let mut stage = Stage::new();
    let mut decorations = per_frame_decorations(42);

    decorations.handle(&request_mode(&mut stage, AnimationMode::Exploded));
    for _ in 0..30 {
        decorations.handle(&tick(&mut stage));
    }
    decorations.handle(&request_mode(&mut stage, AnimationMode::Tree));

    let mut previous = decorations
        .pool(DecorationKind::Cube)
        .mean_distance_to(AnimationMode::Tree);
    for _ in 0..400 {
        decorations.handle(&tick(&mut stage));
        let distance = decorations
            .pool(DecorationKind::Cube)
            .mean_distance_to(AnimationMode::Tree);
        assert!(distance <= previous + 1e-6, "smoothing must be contractive");
        previous = distance;
    }

    for kind in KINDS {
        for member in decorations.pool(kind).members() {
            assert!(member.current().distance(member.rest()) <= 1e-3);
        }
    }
}

#[test]
fn consecutive_deltas_shrink_under_a_held_mode() {
    let mut stage = Stage::new();
    let mut decorations = per_frame_decorations(7);
    let initial_distances: Vec<f32> = decorations
        .pool(DecorationKind::Cube)
        .members()
        .iter()
        .map(|member| member.rest().distance(member.dispersed()))
        .collect();

    decorations.handle(&request_mode(&mut stage, AnimationMode::Exploded));
    for _ in 0..199 {
        decorations.handle(&tick(&mut stage));
    }
    let before = positions(&decorations, DecorationKind::Cube);
    decorations.handle(&tick(&mut stage));
    let after = positions(&decorations, DecorationKind::Cube);

    for ((previous, current), initial) in before.iter().zip(&after).zip(&initial_distances) {
        let delta = previous.distance(*current);
        assert!(delta < SMOOTHING_FACTOR * initial, "delta {delta} initial {initial}");
    }
}

#[test]
fn mode_flip_reverses_without_teleporting() {
    let mut stage = Stage::new();
    let mut decorations = per_frame_decorations(99);

    for _ in 0..50 {
        decorations.handle(&tick(&mut stage));
    }
    let frame_50 = positions(&decorations, DecorationKind::Cube);

    let mut events = request_mode(&mut stage, AnimationMode::Exploded);
    events.extend(tick(&mut stage));
    decorations.handle(&events);
    let frame_51 = positions(&decorations, DecorationKind::Cube);

    let members = decorations.pool(DecorationKind::Cube).members();
    for ((before, after), member) in frame_50.iter().zip(&frame_51).zip(members) {
        let target = member.dispersed();
        let to_target = target - *before;
        let step = *after - *before;

        assert!(step.dot(to_target) > 0.0, "step must head toward the target");
        assert!(after.distance(target) < before.distance(target));
        assert!(step.cross(to_target).length() <= 1e-3 * to_target.length_squared().max(1.0));
        assert!(step.length() <= SMOOTHING_FACTOR * to_target.length() + 1e-4);
    }
}

#[test]
fn flipping_mid_transition_never_exceeds_one_smoothing_step() {
    let mut stage = Stage::new();
    let mut decorations = per_frame_decorations(1234);
    let mut mode = AnimationMode::Tree;

    for frame in 0..120 {
        let mut events = Vec::new();
        if frame % 17 == 0 {
            mode = mode.transition(ModeRequest::Toggle);
            events.extend(request_mode(&mut stage, mode));
        }
        let before = positions(&decorations, DecorationKind::Gem);
        events.extend(tick(&mut stage));
        decorations.handle(&events);
        let after = positions(&decorations, DecorationKind::Gem);

        let members = decorations.pool(DecorationKind::Gem).members();
        for ((previous, current), member) in before.iter().zip(&after).zip(members) {
            let bound = SMOOTHING_FACTOR * previous.distance(member.target(mode));
            assert!(previous.distance(*current) <= bound + 1e-4);
        }
    }
}

#[test]
fn normalized_timing_is_frame_rate_independent() {
    let timing = MotionTiming::default();
    let mut fast = TreeDecorations::new(Config::new(5, timing));
    let mut slow = TreeDecorations::new(Config::new(5, timing));
    let mut fast_stage = Stage::new();
    let mut slow_stage = Stage::new();

    fast.handle(&request_mode(&mut fast_stage, AnimationMode::Exploded));
    slow.handle(&request_mode(&mut slow_stage, AnimationMode::Exploded));

    for _ in 0..60 {
        let mut events = Vec::new();
        stage::apply(
            &mut fast_stage,
            Command::Tick {
                dt: Duration::from_secs_f64(1.0 / 60.0),
            },
            &mut events,
        );
        fast.handle(&events);
    }
    for _ in 0..30 {
        let mut events = Vec::new();
        stage::apply(
            &mut slow_stage,
            Command::Tick {
                dt: Duration::from_secs_f64(1.0 / 30.0),
            },
            &mut events,
        );
        slow.handle(&events);
    }

    let fast_members = fast.pool(DecorationKind::Cube).members();
    let slow_members = slow.pool(DecorationKind::Cube).members();
    for (a, b) in fast_members.iter().zip(slow_members) {
        assert!(a.current().distance(b.current()) <= 1e-2);
        assert!((a.rotation() - b.rotation()).length() <= 1e-3);
    }
}

#[test]
fn custom_pool_sizes_are_honoured() {
    let mut config = Config::new(3, MotionTiming::PerFrame);
    config.cubes = PoolConfig {
        count: 12,
        ..PoolConfig::CUBES
    };
    config.gems = PoolConfig {
        count: 0,
        ..PoolConfig::for_kind(DecorationKind::Gem)
    };
    let mut decorations = TreeDecorations::new(config);

    assert_eq!(decorations.pool(DecorationKind::Cube).members().len(), 12);
    assert_eq!(decorations.flush(DecorationKind::Cube).map(<[_]>::len), Some(12));
    assert_eq!(decorations.flush(DecorationKind::Gem).map(<[_]>::len), Some(0));
    assert_eq!(decorations.mode(), AnimationMode::Tree);
}
