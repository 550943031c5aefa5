use crate::forces::pointer::PointerParams;

/// Grid resolution in cells, `(x, y, z)`.
pub const GRID_SIZE: (usize, usize, usize) = (128, 64, 64);

/// Frame rate the time step is clamped against.
pub const TARGET_FPS: f32 = 60.0;

/// Effective speed forced while a front-gravity mode is active.
pub const FRONT_GRAVITY_SPEED: f32 = 4.0;

/// Per-frame configuration snapshot pulled by the solver.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub particle_count: usize,
    pub run: bool,
    pub noise_strength: f32,
    pub image_noise_strength: f32,
    pub speed: f32,
    pub stiffness: f32,
    pub rest_density: f32,
    pub dynamic_viscosity: f32,
    pub cursor_interaction: bool,
    pub pointer: PointerParams,
    pub hide_percentage: f32,
    /// Primary mode selector, see [`crate::modes::Mode::from_selector`].
    pub mode: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            run: true,
            noise_strength: 1.0,
            image_noise_strength: 0.5,
            speed: 3.0,
            stiffness: 3.0,
            rest_density: 4.0,
            dynamic_viscosity: 0.1,
            cursor_interaction: true,
            pointer: PointerParams::default(),
            hide_percentage: 0.0,
            mode: 0,
        }
    }
}

impl SimConfig {
    /// Copy with every scalar forced into its usable range.
    ///
    /// Non-finite values fall back to the default for that field. The
    /// particle count is left alone; capacity is checked by the solver.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            particle_count: self.particle_count,
            run: self.run,
            noise_strength: finite_or(self.noise_strength, d.noise_strength).max(0.0),
            image_noise_strength: finite_or(self.image_noise_strength, d.image_noise_strength)
                .max(0.0),
            speed: finite_or(self.speed, d.speed).clamp(0.0, 10.0),
            stiffness: finite_or(self.stiffness, d.stiffness).max(0.0),
            rest_density: finite_or(self.rest_density, d.rest_density).max(0.01),
            dynamic_viscosity: finite_or(self.dynamic_viscosity, d.dynamic_viscosity).max(0.0),
            cursor_interaction: self.cursor_interaction,
            pointer: self.pointer.sanitized(),
            hide_percentage: finite_or(self.hide_percentage, d.hide_percentage).clamp(0.0, 1.0),
            mode: self.mode,
        }
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
