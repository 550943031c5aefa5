//! Per-particle external forces, evaluated inside the gather pass.
//!
//! The active primary mode is a [`ForceField`]; pointer interaction and
//! edge hiding layer on top of it. Which extras run in which mode is fixed
//! by [`apply`]:
//!
//! | field            | center gravity | ambient noise | pointer | damping      |
//! |------------------|----------------|---------------|---------|--------------|
//! | chaos            | yes            | yes           | yes     | none         |
//! | image            | no             | no            | no      | 0.9          |
//! | front gravity    | no             | no            | yes     | 0.98         |
//! | sphere, 2-color  | no             | yes           | yes     | boost        |
//! | polygon          | no             | yes           | yes     | none         |
//! | color attractor  | no             | yes           | yes     | boost        |
//!
//! Edge hiding applies in every mode.

pub mod attractor;
pub mod containment;
pub mod edge_hide;
pub mod flow;
pub mod gravity;
pub mod image;
pub mod pointer;

use glam::Vec3;

use crate::math::index_hash;
use crate::modes::boost::BoostFactors;
use crate::modes::targets::ImageTargets;
use attractor::{attractor_force, AttractorTable, ATTRACTOR_STRENGTH};
use containment::{polygon_force, sphere_pull, Polygon, Sphere};
use edge_hide::{edge_hide_force, is_hidden};
use flow::ambient_flow;
use gravity::{
    center_gravity, cylinder_repulsion, front_gravity, Cylinder, FRONT_GRAVITY_DAMPING,
};
use image::{image_pull, target_offset, IMAGE_DAMPING};
use pointer::{compute_pointer_force, PointerParams};

/// Spring constant of sphere containment before boosting.
pub const SPHERE_STRENGTH: f32 = 0.2;

/// Spring constant of polygon containment.
pub const POLYGON_STRENGTH: f32 = 0.4;

/// Primary force field of the current mode, borrowed from the mode state.
#[derive(Clone, Copy, Debug)]
pub enum ForceField<'a> {
    Chaos,
    Image {
        targets: &'a ImageTargets,
        animated: bool,
    },
    FrontGravity {
        cylinder: Option<Cylinder>,
    },
    Sphere(Sphere),
    TwoColorSphere(Sphere),
    Polygon(&'a Polygon),
    ColorAttractor {
        table: &'a AttractorTable,
        active: usize,
    },
}

impl ForceField<'_> {
    pub fn is_image(&self) -> bool {
        matches!(self, ForceField::Image { .. })
    }
}

/// Scalars shared by every gather invocation of one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameUniforms<'a> {
    pub dt: f32,
    /// Simulation clock in seconds.
    pub time: f32,
    pub extent: Vec3,
    pub noise_strength: f32,
    pub image_noise_strength: f32,
    /// `None` when cursor interaction is off.
    pub pointer: Option<PointerParams>,
    pub hide_percentage: f32,
    pub field: ForceField<'a>,
    pub boost: BoostFactors,
}

/// What the force fields do to one particle this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceResponse {
    pub delta_v: Vec3,
    /// Multiplier applied to the velocity after `delta_v` is added.
    pub damping: f32,
}

/// Evaluate every force acting on particle `index`.
pub fn apply(u: &FrameUniforms, index: usize, pos: Vec3, mass: f32, color: Vec3) -> ForceResponse {
    let dt = u.dt;
    let mut acc = Vec3::ZERO;
    let mut delta_v = Vec3::ZERO;
    let mut damping = 1.0;

    let flow = || ambient_flow(pos, index_hash(index), u.time, u.noise_strength);

    match u.field {
        ForceField::Chaos => {
            delta_v += center_gravity(pos, u.extent, dt);
            acc += flow();
        }
        ForceField::Image { targets, animated } => {
            if let Some(&target) = targets.positions.get(index) {
                let offset = target_offset(
                    index,
                    target,
                    targets.spacing,
                    u.time,
                    u.image_noise_strength,
                    animated,
                );
                acc += image_pull(pos, target, offset);
            }
            damping = IMAGE_DAMPING;
        }
        ForceField::FrontGravity { cylinder } => {
            delta_v += front_gravity(dt);
            if let Some(cylinder) = cylinder {
                delta_v += cylinder_repulsion(pos, &cylinder, dt);
            }
            damping = FRONT_GRAVITY_DAMPING;
        }
        ForceField::Sphere(sphere) | ForceField::TwoColorSphere(sphere) => {
            acc += sphere_pull(pos, &sphere, SPHERE_STRENGTH * u.boost.multiplier);
            acc += flow();
            damping = u.boost.damping;
        }
        ForceField::Polygon(polygon) => {
            acc += polygon_force(pos, polygon, POLYGON_STRENGTH);
            acc += flow();
        }
        ForceField::ColorAttractor { table, active } => {
            acc += attractor_force(pos, color, table, active, ATTRACTOR_STRENGTH * u.boost.multiplier);
            acc += flow();
            damping = u.boost.damping;
        }
    }

    if !u.field.is_image() {
        if let Some(pointer) = &u.pointer {
            acc += compute_pointer_force(pos, mass, pointer);
        }
    }

    if is_hidden(index, u.hide_percentage) {
        acc += edge_hide_force(pos, u.extent);
    }

    ForceResponse {
        delta_v: delta_v + acc * dt,
        damping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(field: ForceField<'_>) -> FrameUniforms<'_> {
        FrameUniforms {
            dt: 0.05,
            time: 1.0,
            extent: Vec3::new(128.0, 64.0, 64.0),
            noise_strength: 1.0,
            image_noise_strength: 0.0,
            pointer: Some(PointerParams {
                active: true,
                origin: Vec3::new(30.0, 30.0, 60.0),
                direction: Vec3::NEG_Z,
                drag_force: Vec3::new(5.0, 0.0, 0.0),
                ..PointerParams::default()
            }),
            hide_percentage: 0.0,
            field,
            boost: BoostFactors::NEUTRAL,
        }
    }

    #[test]
    fn image_mode_ignores_pointer_and_noise() {
        let targets = ImageTargets {
            positions: vec![Vec3::new(30.0, 30.0, 32.0)],
            colors: vec![Vec3::ONE],
            spacing: 1.0,
        };
        let u = uniforms(ForceField::Image {
            targets: &targets,
            animated: false,
        });
        let target = targets.positions[0];
        let r = apply(&u, 0, target, 1.0, Vec3::ONE);
        // Only the pull toward the jittered target remains.
        let offset = target_offset(0, target, 1.0, u.time, 0.0, false);
        let expected = image_pull(target, target, offset) * u.dt;
        assert!((r.delta_v - expected).length() < 1e-6, "{} vs {expected}", r.delta_v);
        assert_eq!(r.damping, IMAGE_DAMPING);
    }

    #[test]
    fn front_gravity_damps_and_pulls_forward() {
        let mut u = uniforms(ForceField::FrontGravity { cylinder: None });
        u.pointer = None;
        let r = apply(&u, 3, Vec3::new(90.0, 10.0, 10.0), 1.0, Vec3::ONE);
        assert!(r.delta_v.z > 0.0);
        assert_eq!(r.delta_v.x, 0.0);
        assert_eq!(r.damping, FRONT_GRAVITY_DAMPING);
    }

    #[test]
    fn pointer_adds_drag_outside_image_modes() {
        let mut quiet = uniforms(ForceField::Chaos);
        quiet.noise_strength = 0.0;
        let mut without = quiet;
        without.pointer = None;
        let pos = Vec3::new(30.0, 30.0, 20.0);
        let a = apply(&quiet, 0, pos, 1.0, Vec3::ONE);
        let b = apply(&without, 0, pos, 1.0, Vec3::ONE);
        assert!(a.delta_v.x > b.delta_v.x);
    }
}
