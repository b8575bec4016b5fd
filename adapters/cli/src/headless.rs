//! Windowless playback at a fixed 60 Hz frame rate.

use std::time::Duration;

use holiday_scene_core::{AnimationMode, ModeRequest};
use holiday_scene_rendering::FrameInput;
use holiday_scene_system_bootstrap::Showcase;
use holiday_scene_system_tree_decorations::DecorationKind;
use tracing::info;

/// Duration of one simulated frame.
pub(crate) const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// State of the scene once headless playback finishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct HeadlessSummary {
    pub(crate) frames: u64,
    pub(crate) mode: AnimationMode,
    pub(crate) cube_distance: f32,
    pub(crate) gem_distance: f32,
    pub(crate) star_height: f32,
    pub(crate) text_yaw: f32,
}

/// Steps `showcase` for `frames` frames, switching to the exploded layout
/// right before frame `explode_at` when requested.
pub(crate) fn run(
    showcase: &mut Showcase,
    frames: u64,
    explode_at: Option<u64>,
) -> HeadlessSummary {
    for index in 0..frames {
        if explode_at == Some(index) {
            showcase.request_mode(ModeRequest::Set(AnimationMode::Exploded));
        }
        showcase.step(FRAME, FrameInput::default());
    }

    let mode = showcase.mode();
    let decorations = showcase.decorations();
    HeadlessSummary {
        frames: showcase.frame().index(),
        mode,
        cube_distance: decorations.pool(DecorationKind::Cube).mean_distance_to(mode),
        gem_distance: decorations.pool(DecorationKind::Gem).mean_distance_to(mode),
        star_height: showcase.star().transform().translation.y,
        text_yaw: showcase.text().yaw(),
    }
}

impl HeadlessSummary {
    /// Logs the final scene state at `info`.
    pub(crate) fn report(&self) {
        info!(
            frames = self.frames,
            mode = ?self.mode,
            cube_distance = self.cube_distance,
            gem_distance = self.gem_distance,
            star_height = self.star_height,
            text_yaw = self.text_yaw,
            "headless playback finished"
        );
    }
}
