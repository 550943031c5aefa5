use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Vec3};

use crate::error::{Result, SimError};

/// Smoothing factor of the per-particle density moving average.
pub const DENSITY_SMOOTHING: f32 = 0.05;

/// Smoothing factor of the cosmetic `direction` field.
pub const DIRECTION_SMOOTHING: f32 = 0.1;

/// SoA particle storage.
///
/// Slots `[0, active)` are simulated, the rest of the capacity is inert. The
/// buffers are allocated once and never grow.
pub struct ParticleStore {
    capacity: usize,
    active: usize,
    /// Grid-space position, kept inside `[2, size - 2]` by the gather pass.
    pub position: Vec<Vec3>,
    pub velocity: Vec<Vec3>,
    /// APIC affine velocity field (C).
    pub affine: Vec<Mat3>,
    /// Point-mass multiplier, jittered in (0.998, 1.0] at init.
    pub mass: Vec<f32>,
    /// Moving average of the grid density sampled at the particle.
    pub density: Vec<f32>,
    /// Smoothed velocity, only read by renderers.
    pub direction: Vec<Vec3>,
    /// RGB in [0,1]; written by recoloring, never by the kernels.
    pub color: Vec<Vec3>,
}

impl ParticleStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            active: 0,
            position: vec![Vec3::ZERO; capacity],
            velocity: vec![Vec3::ZERO; capacity],
            affine: vec![Mat3::ZERO; capacity],
            mass: vec![1.0; capacity],
            density: vec![0.0; capacity],
            direction: vec![Vec3::ZERO; capacity],
            color: vec![Vec3::ONE; capacity],
        }
    }

    /// Store with `active` slots simulated, clamped to `capacity`.
    pub fn with_active(capacity: usize, active: usize) -> Self {
        Self {
            active: active.min(capacity),
            ..Self::new(capacity)
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn active(&self) -> usize {
        self.active
    }

    /// Change the number of simulated slots.
    ///
    /// Requests above capacity are rejected and the previous count is kept.
    pub fn set_active(&mut self, count: usize) -> Result<()> {
        if count > self.capacity {
            return Err(SimError::CapacityExceeded {
                requested: count,
                capacity: self.capacity,
            });
        }
        self.active = count;
        Ok(())
    }

    /// Fill `out` with the active particles in the renderer's layout.
    pub fn write_render_buffer(&self, out: &mut Vec<RenderParticle>) {
        out.clear();
        out.extend((0..self.active).map(|i| RenderParticle {
            position: self.position[i].to_array(),
            density: self.density[i],
            velocity: self.velocity[i].to_array(),
            mass: self.mass[i],
            color: self.color[i].to_array(),
            _pad: 0.0,
        }));
    }
}

/// GPU-compatible particle record: 48 bytes, matches the WGSL vertex input.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderParticle {
    pub position: [f32; 3], // 12 bytes
    pub density: f32,       //  4 bytes
    pub velocity: [f32; 3], // 12 bytes
    pub mass: f32,          //  4 bytes
    pub color: [f32; 3],    // 12 bytes
    pub _pad: f32,          //  4 bytes
}
