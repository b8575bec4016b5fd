#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the holiday scene.
//!
//! The scene is drawn as flat-shaded instanced meshes, cube-sprite point
//! clouds and screen-space labels. Default features stay off so the crate
//! builds without native audio libraries.
//!
//! Macroquad links its own `glam`, so every vector crossing the boundary is
//! converted through the helpers at the bottom of this file.

mod batch;

use self::batch::MeshBatcher;
use anyhow::Result;
use glam::{Mat4, Vec2, Vec3};
use holiday_scene_core::AnimationMode;
use holiday_scene_rendering::{
    CameraRig, Color, FrameInput, Label, PointCloud, Presentation, RenderingBackend, Scene,
};
use macroquad::input::{is_key_pressed, KeyCode};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// Near clipping plane shared by the GPU camera and label projection.
const Z_NEAR: f32 = 0.01;
/// Far clipping plane shared by the GPU camera and label projection.
const Z_FAR: f32 = 10_000.0;

#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
    /// `Space` toggles between the tree and exploded layouts.
    mode_toggle: bool,
    /// `Right` speeds the orbit up.
    orbit_faster: bool,
    /// `Left` slows the orbit down.
    orbit_slower: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            mode_toggle: is_key_pressed(KeyCode::Space),
            orbit_faster: is_key_pressed(KeyCode::Right),
            orbit_slower: is_key_pressed(KeyCode::Left),
        }
    }
}

/// Orbit state of the viewer around the camera rig's target.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitController {
    angle: f32,
    speed: f32,
}

impl OrbitController {
    /// Change in orbit speed per key press, in radians per second.
    pub const SPEED_STEP: f32 = 0.05;
    /// Largest orbit speed reachable from the keyboard.
    pub const MAX_SPEED: f32 = CameraRig::MAX_ORBIT_SPEED;

    /// Starts at angle zero with the rig's configured speed.
    #[must_use]
    pub fn new(rig: &CameraRig) -> Self {
        Self {
            angle: 0.0,
            speed: rig.orbit_speed,
        }
    }

    /// Applies speed adjustments, then advances the orbit by `dt`.
    pub fn advance(&mut self, dt: Duration, faster: bool, slower: bool) {
        if faster {
            self.speed = (self.speed + Self::SPEED_STEP).min(Self::MAX_SPEED);
        }
        if slower {
            self.speed = (self.speed - Self::SPEED_STEP).max(-Self::MAX_SPEED);
        }
        self.angle =
            (self.angle + self.speed * dt.as_secs_f32()).rem_euclid(std::f32::consts::TAU);
    }

    /// Current orbit angle in radians.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Current orbit speed in radians per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether frame timing metrics are logged at `info` once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames.max(1),
            avg_render: self.render_accum / frames.max(1),
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1280,
            window_height: 800,
            high_dpi: true,
            sample_count: 4,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut orbit = OrbitController::new(&scene.camera);
            let mut batcher = MeshBatcher::default();
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                orbit.advance(frame_dt, keyboard.orbit_faster, keyboard.orbit_slower);
                let eye = scene.camera.position_at(orbit.angle());

                let simulation_start = Instant::now();
                update_scene(
                    frame_dt,
                    FrameInput {
                        mode_toggle: keyboard.mode_toggle,
                        viewer_position: Some(eye),
                    },
                    &mut scene,
                );
                let simulation = simulation_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                macroquad::camera::set_camera(&macroquad::camera::Camera3D {
                    position: to_macroquad_vec3(eye),
                    target: to_macroquad_vec3(scene.camera.target),
                    up: to_macroquad_vec3(Vec3::Y),
                    fovy: scene.camera.fov_degrees.to_radians(),
                    ..macroquad::camera::Camera3D::default()
                });

                for mesh in scene.meshes() {
                    batcher.draw(mesh, &scene.lighting);
                }
                draw_point_cloud(&scene.text_particles);
                for sparkles in &scene.sparkles {
                    draw_point_cloud(sparkles);
                }

                macroquad::camera::set_default_camera();
                let projector = LabelProjector::new(&scene.camera, eye, screen);
                for label in &scene.labels {
                    draw_label(label, &projector);
                }
                draw_hud(scene.mode, orbit.speed());
                let render = render_start.elapsed();

                if let Some(metrics) = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation,
                    render,
                }) {
                    report_fps(metrics, show_fps);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn report_fps(metrics: FpsMetrics, show_fps: bool) {
    let FpsMetrics {
        per_second,
        trailing_ten_seconds,
        avg_simulation,
        avg_render,
    } = metrics;
    let simulation_ms = avg_simulation.as_secs_f64() * 1_000.0;
    let render_ms = avg_render.as_secs_f64() * 1_000.0;

    if show_fps {
        info!(
            fps = per_second,
            fps_10s = trailing_ten_seconds,
            simulation_ms,
            render_ms,
            "frame metrics"
        );
    } else {
        debug!(
            fps = per_second,
            fps_10s = trailing_ten_seconds,
            simulation_ms,
            render_ms,
            "frame metrics"
        );
    }
}

/// Projects world-space label anchors with the same matrices macroquad derives
/// for a [`macroquad::camera::Camera3D`].
#[derive(Clone, Copy, Debug)]
struct LabelProjector {
    view_projection: Mat4,
    focal_length: f32,
    screen: Vec2,
}

impl LabelProjector {
    fn new(rig: &CameraRig, eye: Vec3, screen: Vec2) -> Self {
        let fov = rig.fov_degrees.to_radians();
        let aspect = if screen.y > 0.0 { screen.x / screen.y } else { 1.0 };
        Self {
            view_projection: Mat4::perspective_rh_gl(fov, aspect, Z_NEAR, Z_FAR)
                * Mat4::look_at_rh(eye, rig.target, Vec3::Y),
            focal_length: 1.0 / (fov * 0.5).tan(),
            screen,
        }
    }

    /// Depth of `point` along the view direction, or `None` behind the near plane.
    fn depth(&self, point: Vec3) -> Option<f32> {
        let w = (self.view_projection * point.extend(1.0)).w;
        (w > Z_NEAR).then_some(w)
    }

    /// Screen position of `point` in pixels.
    fn project(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.view_projection * point.extend(1.0);
        if clip.w <= Z_NEAR {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.screen.x,
            (1.0 - ndc.y) * 0.5 * self.screen.y,
        ))
    }

    /// On-screen height in pixels of a world-space extent at `point`.
    fn pixel_height(&self, point: Vec3, height: f32) -> f32 {
        self.depth(point)
            .map_or(0.0, |depth| height * self.focal_length / depth * 0.5 * self.screen.y)
    }
}

fn draw_label(label: &Label, projector: &LabelProjector) {
    let Some(center) = projector.project(label.position) else {
        return;
    };
    let font_size = projector.pixel_height(label.position, label.height);
    if font_size < 1.0 {
        return;
    }
    let outline = projector
        .pixel_height(label.position, label.outline_width)
        .max(1.0);

    let font_px = font_size.round().min(f32::from(u16::MAX)) as u16;
    let dimensions = macroquad::text::measure_text(&label.text, None, font_px, 1.0);
    let x = center.x - dimensions.width * 0.5;
    let y = center.y + dimensions.offset_y * 0.5;

    let outline_color = to_macroquad_color(label.outline);
    for (dx, dy) in [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)] {
        let _ = macroquad::text::draw_text(
            &label.text,
            x + dx * outline,
            y + dy * outline,
            f32::from(font_px),
            outline_color,
        );
    }
    let _ = macroquad::text::draw_text(
        &label.text,
        x,
        y,
        f32::from(font_px),
        to_macroquad_color(label.color),
    );
}

fn draw_point_cloud(cloud: &PointCloud) {
    let size = to_macroquad_vec3(Vec3::splat(cloud.size));
    let color = to_macroquad_color(cloud.color);
    for point in &cloud.points {
        macroquad::models::draw_cube(to_macroquad_vec3(*point), size, None, color);
    }
}

fn mode_caption(mode: AnimationMode) -> &'static str {
    match mode {
        AnimationMode::Tree => "tree",
        AnimationMode::Exploded => "exploded",
    }
}

fn draw_hud(mode: AnimationMode, orbit_speed: f32) {
    let color = to_macroquad_color(Color::from_rgb_u8(232, 200, 117).with_alpha(0.8));
    let status = format!("mode: {}   orbit: {orbit_speed:+.2} rad/s", mode_caption(mode));
    let _ = macroquad::text::draw_text(&status, 16.0, 28.0, 22.0, color);
    let _ = macroquad::text::draw_text(
        "[Space] explode / gather   [Left/Right] orbit speed   [Esc] quit",
        16.0,
        52.0,
        18.0,
        color,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

fn to_macroquad_vec3(vector: Vec3) -> macroquad::math::Vec3 {
    macroquad::math::vec3(vector.x, vector.y, vector.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(Vec3::new(0.0, 4.5, 0.0), 26.0, 4.5, 0.15, 55.0).expect("valid rig")
    }

    #[test]
    fn target_projects_to_screen_center() {
        let rig = rig();
        let screen = Vec2::new(1280.0, 800.0);
        let projector = LabelProjector::new(&rig, rig.position_at(0.0), screen);

        let center = projector.project(rig.target).expect("in front");
        assert!((center - screen * 0.5).length() <= 1e-2);
    }

    #[test]
    fn points_behind_the_eye_are_not_projected() {
        let rig = rig();
        let eye = rig.position_at(0.0);
        let projector = LabelProjector::new(&rig, eye, Vec2::new(1280.0, 800.0));

        assert!(projector.project(eye + Vec3::new(0.0, 0.0, 5.0)).is_none());
        assert_eq!(projector.pixel_height(eye + Vec3::new(0.0, 0.0, 5.0), 1.0), 0.0);
    }

    #[test]
    fn pixel_height_matches_the_vertical_field_of_view() {
        let rig = rig();
        let screen = Vec2::new(1280.0, 800.0);
        let projector = LabelProjector::new(&rig, rig.position_at(0.0), screen);

        let visible_height = 2.0 * rig.radius * (rig.fov_degrees.to_radians() * 0.5).tan();
        let pixels = projector.pixel_height(rig.target, visible_height);
        assert!((pixels - screen.y).abs() <= 0.5);

        let near = projector.pixel_height(Vec3::new(0.0, 4.5, 10.0), 1.0);
        let far = projector.pixel_height(Vec3::new(0.0, 4.5, -10.0), 1.0);
        assert!(near > far && far > 0.0);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = FrameBreakdown {
            frame: Duration::from_millis(100),
            simulation: Duration::from_millis(2),
            render: Duration::from_millis(4),
        };

        for _ in 0..9 {
            assert!(counter.record_frame(frame).is_none());
        }
        let metrics = counter.record_frame(frame).expect("one second elapsed");
        assert!((metrics.per_second - 10.0).abs() <= 1e-3);
        assert_eq!(metrics.avg_simulation, Duration::from_millis(2));
        assert_eq!(metrics.avg_render, Duration::from_millis(4));
    }

    #[test]
    fn mode_caption_names_both_layouts() {
        assert_eq!(mode_caption(AnimationMode::Tree), "tree");
        assert_eq!(mode_caption(AnimationMode::Exploded), "exploded");
    }
}
