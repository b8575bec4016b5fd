#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative stage state for the holiday scene.
//!
//! The stage owns the animation clock, the animation mode and the viewer's
//! position. It is the only place these values change; systems learn about
//! changes exclusively through the events emitted by [`apply`].

use glam::Vec3;
use holiday_scene_core::{AnimationMode, Command, Event, FrameTime};

/// Position the viewer is assumed to occupy before the host reports one.
pub const DEFAULT_VIEWER_POSITION: Vec3 = Vec3::new(0.0, 4.0, 22.0);

/// Represents the authoritative holiday stage state.
#[derive(Debug)]
pub struct Stage {
    frame: FrameTime,
    mode: AnimationMode,
    viewer: Vec3,
}

impl Stage {
    /// Creates a new stage resting in [`AnimationMode::Tree`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(AnimationMode::Tree)
    }

    /// Creates a new stage starting in the provided mode.
    #[must_use]
    pub fn with_mode(mode: AnimationMode) -> Self {
        Self {
            frame: FrameTime::START,
            mode,
            viewer: DEFAULT_VIEWER_POSITION,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the stage, emitting resulting events.
pub fn apply(stage: &mut Stage, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            stage.frame = stage.frame.advanced(dt);
            out_events.push(Event::TimeAdvanced { frame: stage.frame });
        }
        Command::RequestMode { request } => {
            let next = stage.mode.transition(request);
            if next != stage.mode {
                stage.mode = next;
                out_events.push(Event::AnimationModeChanged { mode: next });
            }
        }
        Command::MoveViewer { position } => {
            if position != stage.viewer && position.is_finite() {
                stage.viewer = position;
                out_events.push(Event::ViewerMoved { position });
            }
        }
    }
}

/// Query functions that provide read-only access to the stage state.
pub mod query {
    use glam::Vec3;
    use holiday_scene_core::{AnimationMode, FrameTime};

    use super::Stage;

    /// Timing of the most recent frame.
    #[must_use]
    pub fn frame(stage: &Stage) -> FrameTime {
        stage.frame
    }

    /// Currently active animation mode.
    #[must_use]
    pub fn animation_mode(stage: &Stage) -> AnimationMode {
        stage.mode
    }

    /// Last reported world-space position of the viewer.
    #[must_use]
    pub fn viewer_position(stage: &Stage) -> Vec3 {
        stage.viewer
    }
}
