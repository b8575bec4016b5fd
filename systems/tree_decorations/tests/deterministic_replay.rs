use std::time::Duration;

use glam::Mat4;
use holiday_scene_core::{Command, Event, ModeRequest, MotionTiming};
use holiday_scene_stage::{self as stage, Stage};
use holiday_scene_system_tree_decorations::{Config, DecorationKind, TreeDecorations};

#[test]
fn deterministic_replay_produces_identical_buffers() {
    let first = replay(0x5EED, scripted_commands());
    let second = replay(0x5EED, scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn different_seeds_produce_different_layouts() {
    let first = replay(1, scripted_commands());
    let second = replay(2, scripted_commands());

    assert_ne!(first, second);
}

fn replay(seed: u64, commands: Vec<Command>) -> Vec<Mat4> {
    let mut stage = Stage::new();
    let mut decorations = TreeDecorations::new(Config::new(seed, MotionTiming::default()));

    for command in commands {
        let mut events: Vec<Event> = Vec::new();
        stage::apply(&mut stage, command, &mut events);
        decorations.handle(&events);
    }

    let mut transforms = Vec::new();
    for kind in [DecorationKind::Cube, DecorationKind::Gem] {
        transforms.extend_from_slice(decorations.pool(kind).buffer().transforms());
    }
    transforms
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = Vec::new();
    for frame in 0..180_u32 {
        if frame == 40 || frame == 130 {
            commands.push(Command::RequestMode {
                request: ModeRequest::Toggle,
            });
        }
        let jitter = u64::from(frame % 5);
        commands.push(Command::Tick {
            dt: Duration::from_millis(14 + jitter),
        });
    }
    commands
}
