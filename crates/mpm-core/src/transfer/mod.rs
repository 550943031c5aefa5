//! MLS-MPM particle <-> grid transfer passes.
//!
//! One simulated frame runs, strictly in order:
//!
//! 1. `GridStore::clear`
//! 2. [`p2g::scatter_mass_momentum`]
//! 3. [`p2g::scatter_stress`]
//! 4. [`grid_update::update_grid`]
//! 5. [`g2p::gather`]
//!
//! Each pass completes before the next begins. Within a pass invocations
//! are independent; the only shared writes are the atomic grid adds.

pub mod g2p;
pub mod grid_update;
pub mod p2g;

use glam::{UVec3, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::grid::GridStore;

/// Invocations per workgroup, also the minimum rayon split length.
pub const WORKGROUP_SIZE: usize = 64;

/// Lowest grid-space coordinate a particle may occupy.
pub const POSITION_MIN: f32 = 2.0;

/// Distance from the upper grid face a particle must keep.
pub const POSITION_MARGIN: f32 = 2.0;

/// Iteration bounds for one frame's kernels.
///
/// Recomputed whenever the active particle count changes so no kernel ever
/// runs with a stale count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSize {
    pub particles: usize,
    pub particle_groups: usize,
    pub cells: usize,
    pub cell_groups: usize,
}

impl DispatchSize {
    pub fn new(particles: usize, cells: usize) -> Self {
        Self {
            particles,
            particle_groups: particles.div_ceil(WORKGROUP_SIZE),
            cells,
            cell_groups: cells.div_ceil(WORKGROUP_SIZE),
        }
    }
}

/// Equation-of-state and viscous stress parameters.
#[derive(Clone, Copy, Debug)]
pub struct FluidParams {
    pub stiffness: f32,
    pub rest_density: f32,
    pub dynamic_viscosity: f32,
}

/// Clamp a grid-space position into the band every stencil fits in.
#[inline]
pub fn clamp_position(position: Vec3, extent: Vec3) -> Vec3 {
    position.clamp(
        Vec3::splat(POSITION_MIN),
        extent - Vec3::splat(POSITION_MARGIN),
    )
}

/// Quadratic B-spline 3x3x3 interpolation stencil around one particle.
#[derive(Clone, Copy, Debug)]
pub struct Stencil {
    position: Vec3,
    base: UVec3,
    weights: [Vec3; 3],
}

impl Stencil {
    pub fn new(position: Vec3, extent: Vec3) -> Self {
        let position = clamp_position(position, extent);
        let cell = position.floor();
        let d = position - cell - Vec3::splat(0.5);
        let half = Vec3::splat(0.5);
        let weights = [
            (half - d) * (half - d) * 0.5,
            Vec3::splat(0.75) - d * d,
            (half + d) * (half + d) * 0.5,
        ];
        Self {
            position,
            base: (cell - Vec3::ONE).as_uvec3(),
            weights,
        }
    }

    /// Visit the 27 neighbor cells as `(cell_index, weight, cell_offset)`.
    ///
    /// `cell_offset` is the vector from the particle to the cell center,
    /// the `x_i - x_p` of the APIC transfer.
    #[inline]
    pub fn for_each<F: FnMut(usize, f32, Vec3)>(&self, grid: &GridStore, mut f: F) {
        for gx in 0..3u32 {
            for gy in 0..3u32 {
                for gz in 0..3u32 {
                    let weight = self.weights[gx as usize].x
                        * self.weights[gy as usize].y
                        * self.weights[gz as usize].z;
                    let cell = self.base + UVec3::new(gx, gy, gz);
                    let offset = cell.as_vec3() - self.position + Vec3::splat(0.5);
                    f(grid.cell_index(cell.x, cell.y, cell.z), weight, offset);
                }
            }
        }
    }
}

/// Run `kernel` once per invocation index in `0..count`.
pub(crate) fn for_each_invocation<F>(count: usize, kernel: F)
where
    F: Fn(usize) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    (0..count)
        .into_par_iter()
        .with_min_len(WORKGROUP_SIZE)
        .for_each(kernel);

    #[cfg(not(feature = "parallel"))]
    (0..count).for_each(kernel);
}

/// Run `kernel` once per invocation index and collect the outputs in order.
pub(crate) fn map_invocations<T, F>(count: usize, kernel: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..count)
            .into_par_iter()
            .with_min_len(WORKGROUP_SIZE)
            .map(kernel)
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..count).map(kernel).collect()
    }
}
