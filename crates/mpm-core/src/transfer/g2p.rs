//! Grid-to-particle gather, force fields, integration and walls.

use glam::{Mat3, Vec3};

use super::{clamp_position, map_invocations, DispatchSize, Stencil};
use crate::forces::{self, FrameUniforms};
use crate::grid::GridStore;
use crate::math::outer;
use crate::particle::{ParticleStore, DIRECTION_SMOOTHING};

/// How many steps ahead the soft walls look.
pub const WALL_LOOKAHEAD: f32 = 3.0;

/// Soft wall distance from each domain face, in cells.
pub const WALL_MIN: f32 = 3.0;

/// Upper soft wall sits at `size - WALL_MAX_MARGIN`.
pub const WALL_MAX_MARGIN: f32 = 4.0;

pub const WALL_STIFFNESS: f32 = 0.3;

/// New state of one particle after the gather pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GatherOutput {
    pub position: Vec3,
    pub velocity: Vec3,
    pub affine: Mat3,
    pub direction: Vec3,
}

/// Gather: pull velocities back from the grid, apply the frame's force
/// fields, integrate, and write every active particle back.
///
/// Must run after the grid has been resolved.
pub fn gather(
    particles: &mut ParticleStore,
    grid: &GridStore,
    dispatch: &DispatchSize,
    uniforms: &FrameUniforms,
) {
    let store = &*particles;
    let out = map_invocations(dispatch.particles, |i| gather_particle(store, grid, uniforms, i));

    for (i, o) in out.into_iter().enumerate() {
        particles.position[i] = o.position;
        particles.velocity[i] = o.velocity;
        particles.affine[i] = o.affine;
        particles.direction[i] = o.direction;
    }
}

/// Gather body for particle `i`.
pub fn gather_particle(
    particles: &ParticleStore,
    grid: &GridStore,
    u: &FrameUniforms,
    i: usize,
) -> GatherOutput {
    let position = particles.position[i];
    let stencil = Stencil::new(position, u.extent);

    let mut velocity = Vec3::ZERO;
    let mut b = Mat3::ZERO;
    stencil.for_each(grid, |cell, weight, offset| {
        let weighted = grid.velocity[cell].truncate() * weight;
        velocity += weighted;
        b += outer(weighted, offset);
    });

    let response = forces::apply(
        u,
        i,
        position,
        particles.mass[i],
        particles.color[i],
    );
    velocity = (velocity + response.delta_v) * response.damping;

    velocity = soft_walls(position, velocity, u.dt, u.extent);
    let position = clamp_position(position + velocity * u.dt, u.extent);

    let direction = particles.direction[i].lerp(velocity, DIRECTION_SMOOTHING);

    GatherOutput {
        position,
        velocity,
        affine: b * 4.0,
        direction,
    }
}

/// Predictive soft boundary.
///
/// If the particle would cross a wall within [`WALL_LOOKAHEAD`] steps, a
/// spring proportional to the overshoot is added on that axis.
pub fn soft_walls(position: Vec3, mut velocity: Vec3, dt: f32, extent: Vec3) -> Vec3 {
    let ahead = position + velocity * dt * WALL_LOOKAHEAD;
    let wall_min = Vec3::splat(WALL_MIN);
    let wall_max = extent - Vec3::splat(WALL_MAX_MARGIN);

    for axis in 0..3 {
        if ahead[axis] < wall_min[axis] {
            velocity[axis] += (wall_min[axis] - ahead[axis]) * WALL_STIFFNESS;
        }
        if ahead[axis] > wall_max[axis] {
            velocity[axis] += (wall_max[axis] - ahead[axis]) * WALL_STIFFNESS;
        }
    }
    velocity
}
