use glam::{Vec2, Vec3};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SimConfig, FRONT_GRAVITY_SPEED, GRID_SIZE, TARGET_FPS};
use crate::error::{Result, SimError};
use crate::forces::containment::MAX_POLYGON_VERTICES;
use crate::forces::FrameUniforms;
use crate::grid::GridStore;
use crate::modes::targets::ImageSource;
use crate::modes::{Mode, ModeState};
use crate::palette::recolor;
use crate::particle::{ParticleStore, RenderParticle};
use crate::transfer::{clamp_position, g2p, grid_update, p2g, DispatchSize, FluidParams};

/// Lattice spacing of the initial particle block, in cells.
///
/// About four particles per cell, which matches the default rest density.
const INIT_SPACING: f32 = 0.63;

/// Random displacement of each initial particle, as a fraction of spacing.
const INIT_JITTER: f32 = 0.2;

/// Largest mass reduction drawn at init; masses land in (0.998, 1.0].
const MASS_JITTER: f32 = 0.002;

/// Owns the particle and grid buffers and runs one MLS-MPM step per frame.
pub struct Solver {
    pub particles: ParticleStore,
    pub grid: GridStore,
    /// Configuration applied by the last [`Solver::frame`].
    pub config: SimConfig,
    modes: ModeState,
    dispatch: DispatchSize,
    /// Simulation clock in seconds.
    sim_time: f32,
    /// Last mode selector the host asked for, applied or not.
    requested_mode: u32,
    /// Last particle count the host asked for, applied or not.
    requested_count: usize,
}

impl Solver {
    /// Allocate buffers for `max_particles` and place every slot in a
    /// jittered block at the grid center.
    pub fn new(max_particles: usize, seed: u64) -> Self {
        let (gx, gy, gz) = GRID_SIZE;
        let grid = GridStore::new(gx, gy, gz);
        let extent = grid.extent();
        let config = SimConfig::default();

        let mut particles = ParticleStore::with_active(max_particles, config.particle_count);
        let mut rng = StdRng::seed_from_u64(seed);

        let side = (max_particles as f32).cbrt().ceil().max(1.0) as usize;
        let half = (side as f32 - 1.0) * 0.5;
        for i in 0..max_particles {
            let lattice = Vec3::new(
                (i / (side * side)) as f32,
                ((i / side) % side) as f32,
                (i % side) as f32,
            );
            let jitter = Vec3::new(
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
            ) * INIT_JITTER;
            let local = (lattice - Vec3::splat(half) + jitter) * INIT_SPACING;
            particles.position[i] = clamp_position(extent * 0.5 + local, extent);
            particles.mass[i] = 1.0 - rng.gen::<f32>() * MASS_JITTER;
            particles.density[i] = config.rest_density;
        }

        let active = particles.active();

        let modes = ModeState::new(extent);
        recolor(&mut particles, modes.mode(), None);

        info!(
            "MPM solver created: {} max particles, {} active, grid {}x{}x{}",
            max_particles, active, gx, gy, gz
        );

        let dispatch = DispatchSize::new(active, grid.cell_count());
        Self {
            particles,
            grid,
            requested_mode: config.mode,
            requested_count: config.particle_count,
            config,
            modes,
            dispatch,
            sim_time: 0.0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn modes(&self) -> &ModeState {
        &self.modes
    }

    pub fn dispatch(&self) -> DispatchSize {
        self.dispatch
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Change the number of simulated particles.
    ///
    /// Must only be called between steps. Over-capacity requests are
    /// rejected and the previous count is kept.
    pub fn set_active_count(&mut self, count: usize) -> Result<()> {
        self.requested_count = count;
        if count == self.particles.active() {
            return Ok(());
        }

        if let Err(e) = self.particles.set_active(count) {
            warn!("{e}; keeping {} particles", self.particles.active());
            return Err(e);
        }

        self.dispatch = DispatchSize::new(count, self.grid.cell_count());
        debug!(
            "dispatch resynced: {} particle groups, {} cell groups",
            self.dispatch.particle_groups, self.dispatch.cell_groups
        );

        self.modes.resize(count);
        self.recolor();
        info!("active particles: {count}");
        Ok(())
    }

    /// Switch the primary mode from the host's integer selector.
    ///
    /// On failure the previous mode stays active and is still simulated.
    pub fn set_mode(&mut self, selector: u32, images: &mut dyn ImageSource) -> Result<()> {
        self.requested_mode = selector;

        let mode = Mode::from_selector(selector).map_err(|e| {
            warn!("{e}; staying in {}", self.modes.mode());
            e
        })?;

        let count = self.particles.active();
        if let Err(e) = self.modes.switch(mode, self.sim_time, count, images) {
            warn!("{e}; staying in {}", self.modes.mode());
            return Err(e);
        }

        self.recolor();
        info!(
            "mode -> {mode}{}",
            if mode.is_boosted() { " (boosted)" } else { "" }
        );
        Ok(())
    }

    /// Re-attempt the last requested mode if it is not the active one,
    /// e.g. once the image it failed to load has been provided.
    ///
    /// Does nothing when the request already took effect.
    pub fn retry_requested_mode(&mut self, images: &mut dyn ImageSource) -> Result<()> {
        if self.requested_mode == self.modes.mode().selector() {
            return Ok(());
        }
        self.set_mode(self.requested_mode, images)
    }

    /// Replace the containment polygon (XY, grid space).
    ///
    /// Vertices past the sixteenth are dropped; fewer than three leave the
    /// current polygon in place. Returns whether the polygon changed.
    pub fn set_polygon(&mut self, vertices: &[Vec2]) -> bool {
        if vertices.len() > MAX_POLYGON_VERTICES {
            warn!(
                "polygon has {} vertices, keeping the first {}",
                vertices.len(),
                MAX_POLYGON_VERTICES
            );
        }
        let changed = self.modes.set_polygon(vertices);
        if !changed {
            warn!("polygon needs at least 3 vertices, got {}", vertices.len());
        }
        changed
    }

    /// Rewrite particle colors for the current mode.
    pub fn recolor(&mut self) {
        recolor(&mut self.particles, self.modes.mode(), self.modes.image_targets());
    }

    /// Simulation time step for a host frame of `frame_dt` seconds.
    ///
    /// The frame time is capped at one target frame, then scaled by the
    /// configured speed, or by [`FRONT_GRAVITY_SPEED`] in front-gravity modes.
    pub fn time_step(&self, frame_dt: f32) -> f32 {
        let speed = if self.modes.mode().is_front_gravity() {
            FRONT_GRAVITY_SPEED
        } else {
            self.config.speed
        };
        clamp_frame_dt(frame_dt) * speed
    }

    /// Run the five passes once with the current configuration.
    pub fn step(&mut self, frame_dt: f32) {
        let frame_dt = clamp_frame_dt(frame_dt);
        let dt = self.time_step(frame_dt);

        if dt > 0.0 {
            let fluid = FluidParams {
                stiffness: self.config.stiffness,
                rest_density: self.config.rest_density,
                dynamic_viscosity: self.config.dynamic_viscosity,
            };

            self.grid.clear();
            p2g::scatter_mass_momentum(&self.particles, &self.grid, &self.dispatch);
            p2g::scatter_stress(&mut self.particles, &self.grid, &self.dispatch, &fluid, dt);
            grid_update::update_grid(&mut self.grid, &self.dispatch);

            let pointer = self.config.pointer;
            let uniforms = FrameUniforms {
                dt,
                time: self.sim_time,
                extent: self.grid.extent(),
                noise_strength: self.config.noise_strength,
                image_noise_strength: self.config.image_noise_strength,
                pointer: (self.config.cursor_interaction && pointer.active).then_some(pointer),
                hide_percentage: self.config.hide_percentage,
                field: self.modes.field(),
                boost: self.modes.boost(),
            };
            g2p::gather(&mut self.particles, &self.grid, &self.dispatch, &uniforms);
        }

        self.modes.tick(frame_dt);
        self.sim_time += frame_dt;
    }

    /// Apply a host configuration snapshot and advance one frame.
    ///
    /// Count and mode changes are only attempted when the requested value
    /// differs from the last request. The step runs (if `run` is set) even
    /// when one of them was rejected; the first rejection is returned.
    ///
    /// A rejected mode is not retried here while the request stays the
    /// same. After supplying a missing image, call
    /// [`Solver::retry_requested_mode`].
    pub fn frame(
        &mut self,
        config: &SimConfig,
        frame_dt: f32,
        images: &mut dyn ImageSource,
    ) -> Result<()> {
        let config = config.sanitized();
        let mut first_err: Option<SimError> = None;

        if config.particle_count != self.requested_count {
            if let Err(e) = self.set_active_count(config.particle_count) {
                first_err.get_or_insert(e);
            }
        }

        if config.mode != self.requested_mode {
            if let Err(e) = self.set_mode(config.mode, images) {
                first_err.get_or_insert(e);
            }
        }

        self.config = config;
        if self.config.run {
            self.step(frame_dt);
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Copy the active particles into a renderer-ready buffer.
    pub fn write_render_buffer(&self, out: &mut Vec<RenderParticle>) {
        self.particles.write_render_buffer(out);
    }
}

#[inline]
fn clamp_frame_dt(frame_dt: f32) -> f32 {
    if frame_dt.is_finite() {
        frame_dt.clamp(0.0, 1.0 / TARGET_FPS)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_masses_in_jitter_band() {
        let solver = Solver::new(500, 7);
        assert!(solver
            .particles
            .mass
            .iter()
            .all(|&m| m > 1.0 - MASS_JITTER && m <= 1.0));
    }

    #[test]
    fn time_step_is_capped() {
        let solver = Solver::new(10, 1);
        let dt = solver.time_step(1.0);
        assert!((dt - solver.config.speed / TARGET_FPS).abs() < 1e-6);
        assert_eq!(solver.time_step(f32::NAN), 0.0);
    }

    #[test]
    fn same_seed_same_layout() {
        let a = Solver::new(64, 42);
        let b = Solver::new(64, 42);
        assert_eq!(a.particles.position, b.particles.position);
    }
}
