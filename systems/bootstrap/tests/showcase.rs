use std::time::Duration;

use glam::Vec3;
use holiday_scene_core::{AnimationMode, ModeRequest, MotionTiming};
use holiday_scene_rendering::FrameInput;
use holiday_scene_system_bootstrap::{Showcase, ShowcaseConfig};
use holiday_scene_system_tree_decorations::DecorationKind;

const FRAME: Duration = Duration::from_millis(16);

fn showcase() -> Showcase {
    Showcase::new(ShowcaseConfig::default()).expect("default config is valid")
}

#[test]
fn presentation_carries_every_drawable() {
    let mut showcase = showcase();
    let presentation = showcase.presentation().expect("default camera is valid");
    let scene = &presentation.scene;

    assert_eq!(scene.cubes.instances.len(), 1000);
    assert_eq!(scene.gems.instances.len(), 1000);
    assert_eq!(scene.star.instances.len(), 1);
    assert!(scene.star.geometry.triangle_count() > 0);
    assert_eq!(scene.text_particles.points.len(), 160);
    assert_eq!(scene.labels.len(), 2);
    assert_eq!(scene.labels[0].text, "Happy Holidays!");
    assert_eq!(scene.sparkles.len(), 5);
    assert_eq!(scene.lighting.point_lights.len(), 3);
    assert_eq!(scene.mode, AnimationMode::Tree);
}

#[test]
fn toggle_input_flips_mode_on_the_same_frame() {
    let mut showcase = showcase();

    showcase.step(
        FRAME,
        FrameInput {
            mode_toggle: true,
            viewer_position: None,
        },
    );
    assert_eq!(showcase.mode(), AnimationMode::Exploded);
    assert_eq!(showcase.decorations().mode(), AnimationMode::Exploded);

    showcase.step(
        FRAME,
        FrameInput {
            mode_toggle: true,
            viewer_position: None,
        },
    );
    assert_eq!(showcase.decorations().mode(), AnimationMode::Tree);
}

#[test]
fn exploding_moves_decorations_outward() {
    let mut showcase = showcase();
    showcase.request_mode(ModeRequest::Set(AnimationMode::Exploded));

    let cubes = showcase.decorations().pool(DecorationKind::Cube);
    let before = cubes.mean_distance_to(AnimationMode::Exploded);
    for _ in 0..120 {
        showcase.step(FRAME, FrameInput::default());
    }
    let after = showcase
        .decorations()
        .pool(DecorationKind::Cube)
        .mean_distance_to(AnimationMode::Exploded);

    assert!(after < before * 0.1);
}

#[test]
fn populate_only_copies_dirty_instances() {
    let mut showcase = showcase();
    let mut presentation = showcase.presentation().expect("valid camera");
    let scene = &mut presentation.scene;

    scene.cubes.instances.clear();
    showcase.populate(scene);
    assert!(scene.cubes.instances.is_empty(), "no frame advanced");

    showcase.step(FRAME, FrameInput::default());
    showcase.populate(scene);
    assert_eq!(scene.cubes.instances.len(), 1000);
}

#[test]
fn labels_face_the_reported_viewer() {
    let mut showcase = showcase();
    showcase.step(
        FRAME,
        FrameInput {
            mode_toggle: false,
            viewer_position: Some(Vec3::new(-20.0, 5.0, 0.0)),
        },
    );

    assert!((showcase.text().yaw() + std::f32::consts::FRAC_PI_2).abs() <= 1e-5);
}

#[test]
fn labels_follow_the_pulsing_group_transform() {
    let mut showcase = showcase();
    let mut presentation = showcase.presentation().expect("default camera is valid");
    let viewer = Vec3::new(15.0, 6.0, -10.0);
    for _ in 0..40 {
        showcase.step(
            FRAME,
            FrameInput {
                mode_toggle: false,
                viewer_position: Some(viewer),
            },
        );
    }
    showcase.populate(&mut presentation.scene);

    let group = showcase.text().group_matrix();
    for (label, source) in presentation.scene.labels.iter().zip(showcase.text().labels()) {
        let local = source.local_transform();
        assert!((label.position - group.transform_point3(local.translation)).length() <= 1e-5);
        assert!((label.height - source.font_size * source.scale).abs() <= 1e-6);
        assert!((label.outline_width - source.outline_width * source.scale).abs() <= 1e-6);
    }
    assert_ne!(presentation.scene.labels[0].height, 0.45);
}

#[test]
fn same_seed_reproduces_the_scene() {
    let config = ShowcaseConfig {
        seed: 99,
        motion_timing: MotionTiming::PerFrame,
        ..ShowcaseConfig::default()
    };
    let mut first = Showcase::new(config).expect("valid");
    let mut second = Showcase::new(config).expect("valid");

    for _ in 0..30 {
        first.step(FRAME, FrameInput::default());
        second.step(FRAME, FrameInput::default());
    }

    let a = first.presentation().expect("valid");
    let b = second.presentation().expect("valid");
    assert_eq!(a.scene, b.scene);
}

#[test]
fn custom_counts_flow_into_the_scene() {
    let config = ShowcaseConfig::from_toml_str(
        r#"
        [cubes]
        count = 10

        [text]
        primary_particles = 20
        secondary_particles = 5
        "#,
    )
    .expect("valid config");
    let mut showcase = Showcase::new(config).expect("valid");
    let presentation = showcase.presentation().expect("valid");

    assert_eq!(presentation.scene.cubes.instances.len(), 10);
    assert_eq!(presentation.scene.gems.instances.len(), 1000);
    assert_eq!(presentation.scene.text_particles.points.len(), 25);
}
