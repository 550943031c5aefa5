use std::sync::atomic::{AtomicI32, Ordering};

use glam::{UVec3, Vec3, Vec4};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fixed_point::{decode, encode};

/// Cells closer than this to a domain face get that axis' velocity zeroed.
pub const BOUNDARY_CELLS: usize = 2;

/// Accumulator channel of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridField {
    MomentumX = 0,
    MomentumY = 1,
    MomentumZ = 2,
    Mass = 3,
}

/// Regular MPM background grid.
///
/// During the scatter passes every cell holds fixed-point momentum and mass
/// in atomics, so particles can add into shared cells from any thread. The
/// resolve pass turns those into `velocity` (xyz = velocity, w = mass),
/// which the gather pass then reads.
///
/// Cells are flattened row-major with z fastest: `x * gy * gz + y * gz + z`.
pub struct GridStore {
    size: UVec3,
    /// Indexed by `GridField as usize`.
    channels: [Vec<AtomicI32>; 4],
    pub velocity: Vec<Vec4>,
}

impl GridStore {
    pub fn new(size_x: usize, size_y: usize, size_z: usize) -> Self {
        let cells = size_x * size_y * size_z;
        let zeroed = |n: usize| (0..n).map(|_| AtomicI32::new(0)).collect::<Vec<_>>();
        Self {
            size: UVec3::new(size_x as u32, size_y as u32, size_z as u32),
            channels: [zeroed(cells), zeroed(cells), zeroed(cells), zeroed(cells)],
            velocity: vec![Vec4::ZERO; cells],
        }
    }

    #[inline]
    pub fn size(&self) -> UVec3 {
        self.size
    }

    /// Grid extent as floats, the upper bound of grid space.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.size.as_vec3()
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.velocity.len()
    }

    #[inline]
    pub fn cell_index(&self, x: u32, y: u32, z: u32) -> usize {
        (x as usize * self.size.y as usize + y as usize) * self.size.z as usize + z as usize
    }

    /// Inverse of [`Self::cell_index`].
    #[inline]
    pub fn cell_coords(&self, index: usize) -> UVec3 {
        let gz = self.size.z as usize;
        let gy = self.size.y as usize;
        UVec3::new(
            (index / (gy * gz)) as u32,
            ((index / gz) % gy) as u32,
            (index % gz) as u32,
        )
    }

    /// Zero all accumulators and the resolved velocities.
    pub fn clear(&mut self) {
        for channel in self.channels.iter_mut() {
            for cell in channel.iter_mut() {
                *cell.get_mut() = 0;
            }
        }
        self.velocity.fill(Vec4::ZERO);
    }

    /// Atomic accumulation entry point. Safe to call from many threads.
    ///
    /// Sums saturate at the `i32` range (about +-214 decoded) instead of
    /// wrapping, so a crowded fast cell keeps the sign of its momentum.
    #[inline]
    pub fn scatter_add(&self, cell: usize, field: GridField, fixed_point_delta: i32) {
        if fixed_point_delta == 0 {
            return;
        }
        let slot = &self.channels[field as usize][cell];
        let mut sum = slot.load(Ordering::Relaxed);
        loop {
            let next = sum.saturating_add(fixed_point_delta);
            match slot.compare_exchange_weak(sum, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(current) => sum = current,
            }
        }
    }

    /// Add a float momentum contribution to all three axes of a cell.
    #[inline]
    pub fn scatter_momentum(&self, cell: usize, momentum: Vec3) {
        self.scatter_add(cell, GridField::MomentumX, encode(momentum.x));
        self.scatter_add(cell, GridField::MomentumY, encode(momentum.y));
        self.scatter_add(cell, GridField::MomentumZ, encode(momentum.z));
    }

    /// Decoded accumulator value.
    #[inline]
    pub fn accumulated(&self, cell: usize, field: GridField) -> f32 {
        load(&self.channels, field, cell)
    }

    #[inline]
    pub fn mass(&self, cell: usize) -> f32 {
        self.accumulated(cell, GridField::Mass)
    }

    /// Velocity of one cell from its accumulators.
    ///
    /// Returns `Vec4::ZERO` for cells with no mass. Axes within
    /// [`BOUNDARY_CELLS`] of a domain face are zeroed.
    pub fn resolve(&self, cell: usize) -> Vec4 {
        resolve_cell(&self.channels, self.size, cell)
    }

    /// Resolve every cell into `velocity`.
    pub fn resolve_all(&mut self) {
        let channels = &self.channels;
        let size = self.size;

        #[cfg(feature = "parallel")]
        self.velocity
            .par_iter_mut()
            .enumerate()
            .with_min_len(crate::transfer::WORKGROUP_SIZE)
            .for_each(|(cell, v)| *v = resolve_cell(channels, size, cell));

        #[cfg(not(feature = "parallel"))]
        for (cell, v) in self.velocity.iter_mut().enumerate() {
            *v = resolve_cell(channels, size, cell);
        }
    }
}

#[inline]
fn load(channels: &[Vec<AtomicI32>; 4], field: GridField, cell: usize) -> f32 {
    decode(channels[field as usize][cell].load(Ordering::Relaxed))
}

fn resolve_cell(channels: &[Vec<AtomicI32>; 4], size: UVec3, cell: usize) -> Vec4 {
    let mass = load(channels, GridField::Mass, cell);
    if mass <= 0.0 {
        return Vec4::ZERO;
    }

    let mut v = Vec3::new(
        load(channels, GridField::MomentumX, cell),
        load(channels, GridField::MomentumY, cell),
        load(channels, GridField::MomentumZ, cell),
    ) / mass;

    let (gy, gz) = (size.y as usize, size.z as usize);
    let c = UVec3::new(
        (cell / (gy * gz)) as u32,
        ((cell / gz) % gy) as u32,
        (cell % gz) as u32,
    );
    let b = BOUNDARY_CELLS as u32;
    if c.x < b || c.x + b >= size.x {
        v.x = 0.0;
    }
    if c.y < b || c.y + b >= size.y {
        v.y = 0.0;
    }
    if c.z < b || c.z + b >= size.z {
        v.z = 0.0;
    }

    v.extend(mass)
}
