//! Particle-to-grid scatter passes.

use glam::{Mat3, Vec3};

use super::{for_each_invocation, map_invocations, DispatchSize, FluidParams, Stencil};
use crate::fixed_point::encode;
use crate::grid::{GridField, GridStore};
use crate::math::mix;
use crate::particle::{ParticleStore, DENSITY_SMOOTHING};

/// Densities below this produce no stress (isolated particles).
pub const MIN_DENSITY: f32 = 1.0e-4;

/// Exponent of the stiffened equation of state.
const EOS_POWER: i32 = 5;

/// Scatter-1: unit mass and APIC momentum of every active particle.
///
/// Each neighbor cell receives `weight` mass and
/// `weight * (velocity + C * cell_offset)` momentum.
pub fn scatter_mass_momentum(particles: &ParticleStore, grid: &GridStore, dispatch: &DispatchSize) {
    let extent = grid.extent();
    for_each_invocation(dispatch.particles, |i| {
        scatter_particle(
            grid,
            extent,
            particles.position[i],
            particles.velocity[i],
            particles.affine[i],
        );
    });
}

/// Scatter-1 body for a single particle.
pub fn scatter_particle(grid: &GridStore, extent: Vec3, position: Vec3, velocity: Vec3, affine: Mat3) {
    let stencil = Stencil::new(position, extent);
    stencil.for_each(grid, |cell, weight, offset| {
        grid.scatter_add(cell, GridField::Mass, encode(weight));
        grid.scatter_momentum(cell, (velocity + affine * offset) * weight);
    });
}

/// Pressure of the stiffened equation of state, never negative.
#[inline]
pub fn pressure(density: f32, fluid: &FluidParams) -> f32 {
    (fluid.stiffness * ((density / fluid.rest_density).powi(EOS_POWER) - 1.0)).max(0.0)
}

/// Cauchy stress: `-p I + mu (C + C^T)`.
#[inline]
pub fn stress(pressure: f32, affine: Mat3, dynamic_viscosity: f32) -> Mat3 {
    Mat3::from_diagonal(Vec3::splat(-pressure)) + (affine + affine.transpose()) * dynamic_viscosity
}

/// Scatter-2: refresh particle density from the scattered mass and add the
/// stress impulse of every active particle.
///
/// Must run after [`scatter_mass_momentum`] has completed.
pub fn scatter_stress(
    particles: &mut ParticleStore,
    grid: &GridStore,
    dispatch: &DispatchSize,
    fluid: &FluidParams,
    dt: f32,
) {
    let extent = grid.extent();
    let store = &*particles;
    let densities = map_invocations(dispatch.particles, |i| {
        stress_particle(
            grid,
            extent,
            store.position[i],
            store.affine[i],
            store.density[i],
            fluid,
            dt,
        )
    });
    particles.density[..densities.len()].copy_from_slice(&densities);
}

/// Scatter-2 body for a single particle. Returns the updated density.
pub fn stress_particle(
    grid: &GridStore,
    extent: Vec3,
    position: Vec3,
    affine: Mat3,
    previous_density: f32,
    fluid: &FluidParams,
    dt: f32,
) -> f32 {
    let stencil = Stencil::new(position, extent);

    let mut sampled = 0.0;
    stencil.for_each(grid, |cell, weight, _| {
        sampled += grid.mass(cell) * weight;
    });
    let density = mix(previous_density, sampled, DENSITY_SMOOTHING);

    if density.is_nan() || density <= MIN_DENSITY {
        return density.max(0.0);
    }

    let volume = 1.0 / density;
    let sigma = stress(pressure(density, fluid), affine, fluid.dynamic_viscosity);
    let term = sigma * (-4.0 * volume * dt);

    stencil.for_each(grid, |cell, weight, offset| {
        grid.scatter_momentum(cell, term * offset * weight);
    });

    density
}
