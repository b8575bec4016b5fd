#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that composes the holiday scene.
//!
//! [`Showcase`] owns the authoritative stage and every decorative system. Each
//! frame it turns adapter input into stage commands, routes the resulting
//! events to the systems and copies their buffers into a rendering [`Scene`].

pub mod config;
pub mod palette;

use std::time::Duration;

use glam::{Mat4, Vec3};
use holiday_scene_core::{
    geometry::MeshGeometry, AnimationMode, Command, Event, FrameTime, ModeRequest,
};
use holiday_scene_rendering::{
    Color, FrameInput, Label, PointCloud, Presentation, Scene, SceneMesh,
};
use holiday_scene_stage::{self as stage, query, Stage};
use holiday_scene_system_holiday_text::{self as holiday_text, HolidayText};
use holiday_scene_system_sparkles::SparkleField;
use holiday_scene_system_star_topper::{self as star_topper, StarTopper};
use holiday_scene_system_tree_decorations::{
    self as tree_decorations, DecorationKind, TreeDecorations,
};
use tracing::{debug, info};

pub use self::config::{ConfigError, ShowcaseConfig};

/// Title of the window hosting the scene.
pub const WINDOW_TITLE: &str = "Holiday Scene";

const TEXT_STREAM: u64 = 0x7E47_5EED;
const STAR_STREAM: u64 = 0x57A2_5EED;

/// Stage plus every system animating the scene.
#[derive(Debug)]
pub struct Showcase {
    config: ShowcaseConfig,
    stage: Stage,
    decorations: TreeDecorations,
    text: HolidayText,
    star: StarTopper,
    events: Vec<Event>,
}

impl Showcase {
    /// Validates `config` and builds every system from its seed.
    pub fn new(config: ShowcaseConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let stage = Stage::new();
        let timing = config.motion_timing;

        let decorations = TreeDecorations::new(tree_decorations::Config {
            cubes: config.pool(DecorationKind::Cube),
            gems: config.pool(DecorationKind::Gem),
            ..tree_decorations::Config::new(config.seed, timing)
        });

        let mut text_config =
            holiday_text::Config::new(config.seed ^ TEXT_STREAM, query::viewer_position(&stage));
        text_config.primary_line.count = config.text.primary_particles;
        text_config.secondary_line.count = config.text.secondary_particles;

        let star = StarTopper::new(star_topper::Config::new(config.seed ^ STAR_STREAM, timing));

        debug!(seed = config.seed, ?timing, "showcase assembled");

        Ok(Self {
            config,
            stage,
            decorations,
            text: HolidayText::new(text_config),
            star,
            events: Vec::new(),
        })
    }

    /// Advances the scene by one frame.
    ///
    /// Viewer movement and mode requests are applied before the clock ticks so
    /// that every system observes them on the same frame.
    pub fn step(&mut self, dt: Duration, input: FrameInput) {
        self.events.clear();

        if let Some(position) = input.viewer_position {
            stage::apply(
                &mut self.stage,
                Command::MoveViewer { position },
                &mut self.events,
            );
        }
        if input.mode_toggle {
            stage::apply(
                &mut self.stage,
                Command::RequestMode {
                    request: ModeRequest::Toggle,
                },
                &mut self.events,
            );
        }
        stage::apply(&mut self.stage, Command::Tick { dt }, &mut self.events);

        self.dispatch();
    }

    /// Requests a mode change outside the regular frame flow.
    pub fn request_mode(&mut self, request: ModeRequest) {
        self.events.clear();
        stage::apply(
            &mut self.stage,
            Command::RequestMode { request },
            &mut self.events,
        );
        self.dispatch();
    }

    fn dispatch(&mut self) {
        for event in &self.events {
            if let Event::AnimationModeChanged { mode } = event {
                info!(?mode, frame = self.stage_frame().index(), "animation mode changed");
            }
        }

        self.decorations.handle(&self.events);
        self.text.handle(&self.events);
        self.star.handle(&self.events);
    }

    fn stage_frame(&self) -> FrameTime {
        query::frame(&self.stage)
    }

    /// Configuration the showcase was built from.
    #[must_use]
    pub const fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    /// Current animation mode.
    #[must_use]
    pub fn mode(&self) -> AnimationMode {
        query::animation_mode(&self.stage)
    }

    /// Current frame timing.
    #[must_use]
    pub fn frame(&self) -> FrameTime {
        self.stage_frame()
    }

    /// Tree decoration system.
    #[must_use]
    pub const fn decorations(&self) -> &TreeDecorations {
        &self.decorations
    }

    /// Greeting system.
    #[must_use]
    pub const fn text(&self) -> &HolidayText {
        &self.text
    }

    /// Star topper system.
    #[must_use]
    pub const fn star(&self) -> &StarTopper {
        &self.star
    }

    /// Builds the presentation with static geometry and the current frame's
    /// dynamic content.
    pub fn presentation(&mut self) -> Result<Presentation, ConfigError> {
        let mut scene = Scene::new(
            self.config.camera.rig()?,
            SceneMesh::new(MeshGeometry::unit_cube(), palette::CUBE),
            SceneMesh::new(MeshGeometry::icosahedron(1.0), palette::GEM),
            SceneMesh::new(self.star.geometry().clone(), palette::STAR),
            PointCloud::new(palette::TEXT_PARTICLE_SIZE, palette::TEXT_PARTICLE),
        );
        self.populate(&mut scene);

        Ok(Presentation::new(WINDOW_TITLE, palette::CLEAR_COLOR, scene))
    }

    /// Copies the systems' current state into `scene`.
    ///
    /// Decoration instances are only copied when their buffers were marked
    /// dirty since the previous call.
    pub fn populate(&mut self, scene: &mut Scene) {
        scene.mode = self.mode();

        if let Some(transforms) = self.decorations.flush(DecorationKind::Cube) {
            scene.cubes.set_instances(transforms);
        }
        if let Some(transforms) = self.decorations.flush(DecorationKind::Gem) {
            scene.gems.set_instances(transforms);
        }
        scene.star.set_instances(&[self.star.world_matrix()]);

        let group = self.text.group_matrix();
        scene.text_particles.points.clear();
        scene
            .text_particles
            .points
            .extend(self.text.cloud().points().map(|point| group.transform_point3(point)));

        scene.labels = self
            .text
            .labels()
            .iter()
            .map(|label| {
                let local = label.local_transform();
                Label {
                    text: label.content.to_owned(),
                    position: group.transform_point3(local.translation),
                    height: label.font_size * local.scale.y,
                    color: palette::TEXT.color,
                    outline: palette::TEXT_OUTLINE,
                    outline_width: label.outline_width * local.scale.y,
                }
            })
            .collect();

        let anchor = self.star.anchor_matrix();
        let fields = self
            .text
            .sparkles()
            .iter()
            .map(|field| (field, group))
            .chain(self.star.sparkles().iter().map(|field| (field, anchor)));
        if scene.sparkles.len() != self.text.sparkles().len() + self.star.sparkles().len() {
            scene.sparkles = fields
                .map(|(field, matrix)| sparkle_cloud(field, matrix))
                .collect();
        } else {
            for (cloud, (field, matrix)) in scene.sparkles.iter_mut().zip(fields) {
                write_points(&mut cloud.points, field.points(), matrix);
            }
        }

        scene.lighting.point_lights.clear();
        scene.lighting.point_lights.extend(
            holiday_text::lights()
                .into_iter()
                .map(|light| (light, group))
                .chain(std::iter::once((self.star.light(), anchor)))
                .map(|(mut light, matrix)| {
                    light.position = matrix.transform_point3(light.position);
                    light
                }),
        );
    }
}

fn sparkle_cloud(field: &SparkleField, matrix: Mat4) -> PointCloud {
    let spec = field.spec();
    let mut cloud = PointCloud::new(
        spec.size * palette::SPARKLE_SCALE,
        Color::from_rgb(spec.color).with_alpha(spec.opacity),
    );
    write_points(&mut cloud.points, field.points(), matrix);
    cloud
}

fn write_points(out: &mut Vec<Vec3>, points: &[Vec3], matrix: Mat4) {
    out.clear();
    out.extend(points.iter().map(|point| matrix.transform_point3(*point)));
}
