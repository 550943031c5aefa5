//! Color-keyed attractors.
//!
//! Every palette color owns one [`Attractor`]. While a color-attractor mode
//! is active, particles whose color matches the active key gather in that
//! key's dedicated sphere, every particle is held by the shared population
//! sphere, and a negative-space sphere carves a notch out of the result.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;

use super::containment::{sphere_pull, sphere_push, Sphere};

/// Largest RGB distance still counted as the same color.
pub const COLOR_MATCH_THRESHOLD: f32 = 0.1;

/// Base spring constant shared by all three spheres.
pub const ATTRACTOR_STRENGTH: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attractor {
    pub match_color: Vec3,
    /// Shared population sphere.
    pub main: Sphere,
    /// Sphere only matching particles are drawn into.
    pub dedicated: Sphere,
    /// Sphere every particle is pushed out of.
    pub negative: Sphere,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttractorTable {
    attractors: Vec<Attractor>,
}

impl AttractorTable {
    /// One attractor per palette color, placed around the grid center.
    ///
    /// Dedicated spheres sit on a ring inside the population sphere, one
    /// angle per key; each key's notch is cut on the opposite side.
    pub fn layout(palette: &[Vec3], extent: Vec3) -> Self {
        let center = extent * 0.5;
        let main_radius = extent.y * 0.28;
        let main = Sphere::new(center, main_radius);
        let n = palette.len().max(1) as f32;

        let attractors = palette
            .iter()
            .enumerate()
            .map(|(k, &color)| {
                let angle = FRAC_PI_2 + k as f32 / n * TAU;
                let dir = Vec3::new(angle.cos(), angle.sin(), 0.0);
                Attractor {
                    match_color: color,
                    main,
                    dedicated: Sphere::new(center + dir * main_radius * 0.55, main_radius * 0.3),
                    negative: Sphere::new(center - dir * main_radius * 0.95, main_radius * 0.45),
                }
            })
            .collect();

        Self { attractors }
    }

    pub fn len(&self) -> usize {
        self.attractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attractors.is_empty()
    }

    pub fn get(&self, key: usize) -> Option<&Attractor> {
        self.attractors.get(key)
    }

    /// Attractor whose color is nearest to `color`, with the RGB distance.
    pub fn nearest(&self, color: Vec3) -> Option<(usize, f32)> {
        self.attractors
            .iter()
            .enumerate()
            .map(|(k, a)| (k, a.match_color.distance(color)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Acceleration from the active attractor on one particle.
///
/// `strength` already includes the boost multiplier.
pub fn attractor_force(
    pos: Vec3,
    color: Vec3,
    table: &AttractorTable,
    active: usize,
    strength: f32,
) -> Vec3 {
    let Some(attractor) = table.get(active) else {
        return Vec3::ZERO;
    };

    let mut acc = sphere_pull(pos, &attractor.main, strength);
    acc += sphere_push(pos, &attractor.negative, strength);

    if let Some((key, dist)) = table.nearest(color) {
        if key == active && dist < COLOR_MATCH_THRESHOLD {
            acc += sphere_pull(pos, &attractor.dedicated, strength);
        }
    }

    acc
}
