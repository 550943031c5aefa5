use std::collections::HashMap;

use glam::Vec2;
use mpm_core::config::SimConfig;
use mpm_core::forces::containment::MAX_POLYGON_VERTICES;
use mpm_core::modes::boost::BOOST_MAX_MULTIPLIER;
use mpm_core::modes::targets::{NoImages, TargetImage};
use mpm_core::modes::{Mode, IMAGE_NAMES};
use mpm_core::palette::PALETTE;
use mpm_core::solver::Solver;
use mpm_core::SimError;

const FRAME: f32 = 1.0 / 60.0;

fn gradient(width: u32, height: u32) -> TargetImage {
    let mut rgba = Vec::new();
    for y in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(&[(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255]);
        }
    }
    TargetImage::from_rgba(width, height, &rgba).unwrap()
}

#[test]
fn test_unknown_selector_keeps_mode() {
    let mut solver = Solver::new(50, 1);
    solver.set_mode(12, &mut NoImages).unwrap();
    let err = solver.set_mode(99, &mut NoImages).unwrap_err();
    assert!(matches!(err, SimError::UnknownMode(99)));
    assert_eq!(solver.mode(), Mode::Polygon);
}

#[test]
fn test_image_load_failure_keeps_previous_mode() {
    let mut solver = Solver::new(50, 1);
    let mut config = SimConfig {
        mode: 6,
        ..SimConfig::default()
    };
    solver.frame(&config, FRAME, &mut NoImages).unwrap();
    assert_eq!(solver.mode(), Mode::Sphere);

    config.mode = 2;
    let t0 = solver.sim_time();
    let err = solver.frame(&config, FRAME, &mut NoImages).unwrap_err();
    assert!(matches!(err, SimError::ImageLoad { .. }));
    assert_eq!(solver.mode(), Mode::Sphere);
    // The frame still ran in the previous mode.
    assert!(solver.sim_time() > t0);
}

#[test]
fn test_failed_image_mode_applies_after_upload() {
    let mut solver = Solver::new(50, 1);
    let config = SimConfig {
        mode: 3,
        ..SimConfig::default()
    };
    let mut images: HashMap<String, TargetImage> = HashMap::new();
    assert!(solver.frame(&config, FRAME, &mut images).is_err());
    assert_eq!(solver.mode(), Mode::Chaos);

    images.insert(IMAGE_NAMES[2].to_string(), gradient(10, 5));
    // Same request: the config path does not try again.
    solver.frame(&config, FRAME, &mut images).unwrap();
    assert_eq!(solver.mode(), Mode::Chaos);

    solver.retry_requested_mode(&mut images).unwrap();
    assert_eq!(solver.mode(), Mode::Image { slot: 2 });
    assert_eq!(solver.modes().image_targets().unwrap().len(), 50);

    // Nothing pending any more.
    let activated = solver.modes().activated_at();
    solver.step(FRAME);
    solver.retry_requested_mode(&mut NoImages).unwrap();
    assert_eq!(solver.modes().activated_at(), activated);
}

#[test]
fn test_image_mode_loads_targets_and_colors() {
    let mut solver = Solver::new(400, 6);
    let mut images = HashMap::new();
    images.insert(IMAGE_NAMES[0].to_string(), gradient(16, 8));

    solver.set_mode(1, &mut images).unwrap();
    assert_eq!(solver.mode(), Mode::Image { slot: 0 });

    let targets = solver.modes().image_targets().unwrap();
    assert_eq!(targets.len(), 400);
    for i in 0..400 {
        assert_eq!(solver.particles.color[i], targets.colors[i]);
    }

    solver.set_active_count(120).unwrap();
    assert_eq!(solver.modes().image_targets().unwrap().len(), 120);

    solver.set_mode(0, &mut images).unwrap();
    assert!(solver.modes().image_targets().is_none());
}

#[test]
fn test_image_mode_pulls_particles_to_targets() {
    let mut solver = Solver::new(300, 6);
    solver.config.image_noise_strength = 0.0;
    let mut images = HashMap::new();
    images.insert(IMAGE_NAMES[0].to_string(), gradient(20, 10));
    solver.set_mode(1, &mut images).unwrap();

    let error = |s: &Solver| -> f32 {
        let targets = s.modes().image_targets().unwrap();
        (0..s.particles.active())
            .map(|i| s.particles.position[i].distance(targets.positions[i]))
            .sum::<f32>()
            / s.particles.active() as f32
    };

    let before = error(&solver);
    for _ in 0..200 {
        solver.step(FRAME);
    }
    let after = error(&solver);
    assert!(after < before * 0.5, "mean target distance {before} -> {after}");
}

#[test]
fn test_attractor_switch_boosts_then_relaxes() {
    let mut solver = Solver::new(200, 3);
    solver.set_mode(9, &mut NoImages).unwrap();
    assert_eq!(solver.mode(), Mode::ColorAttractor { key: 2 });
    assert_eq!(solver.modes().boost().multiplier, BOOST_MAX_MULTIPLIER);
    assert_eq!(solver.modes().activated_at(), solver.sim_time());

    for _ in 0..90 {
        solver.step(FRAME);
    }
    assert!(!solver.modes().boost_timer().is_active());
    assert_eq!(solver.modes().boost().multiplier, 1.0);

    for i in 0..200 {
        assert!(PALETTE.contains(&solver.particles.color[i]));
    }
}

#[test]
fn test_two_color_sphere_recolors() {
    let mut solver = Solver::new(500, 3);
    solver.set_mode(13, &mut NoImages).unwrap();
    let distinct: Vec<_> = solver.particles.color[..500]
        .iter()
        .fold(Vec::new(), |mut acc, c| {
            if !acc.contains(c) {
                acc.push(*c);
            }
            acc
        });
    assert_eq!(distinct.len(), 2);
}

#[test]
fn test_polygon_edits() {
    let mut solver = Solver::new(10, 1);
    let before = solver.modes().polygon().clone();
    assert!(!solver.set_polygon(&[Vec2::ZERO, Vec2::X]));
    assert_eq!(solver.modes().polygon(), &before);

    let many: Vec<Vec2> = (0..20)
        .map(|k| {
            let a = k as f32 / 20.0 * std::f32::consts::TAU;
            Vec2::new(64.0 + 20.0 * a.cos(), 32.0 + 20.0 * a.sin())
        })
        .collect();
    assert!(solver.set_polygon(&many));
    assert_eq!(solver.modes().polygon().vertices().len(), MAX_POLYGON_VERTICES);
}
