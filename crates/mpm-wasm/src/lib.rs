use std::collections::HashMap;

use glam::{Vec2, Vec3};
use mpm_core::config::SimConfig;
use mpm_core::materials::FluidPreset;
use mpm_core::modes::targets::TargetImage;
use mpm_core::particle::RenderParticle;
use mpm_core::solver::Solver;
use wasm_bindgen::prelude::*;

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line: JsValue = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::log_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn init_logging() {
    // A second world in the same page finds the logger already installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// JS numbers reach us as f64; `usize` would wrap negatives to ~4.29e9.
fn particle_count_from_js(count: f64) -> usize {
    if count.is_finite() && count > 0.0 {
        // `as` saturates at usize::MAX.
        count.floor() as usize
    } else {
        0
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct FluidWorld {
    solver: Solver,
    config: SimConfig,
    images: HashMap<String, TargetImage>,
    render_buffer: Vec<RenderParticle>,
    last_error: Option<String>,
}

#[wasm_bindgen]
impl FluidWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(max_particles: usize, seed: u32) -> FluidWorld {
        init_logging();

        let solver = Solver::new(max_particles, seed as u64);
        let config = SimConfig {
            particle_count: solver.particles.active(),
            ..SimConfig::default()
        };

        let mut world = FluidWorld {
            solver,
            config,
            images: HashMap::new(),
            render_buffer: Vec::with_capacity(max_particles),
            last_error: None,
        };
        world.write_render_output();
        world
    }

    /// Advance one frame. Returns the elapsed wall time in milliseconds.
    ///
    /// A rejected count or mode change does not stop the frame; its message
    /// is kept for [`FluidWorld::last_error`].
    #[wasm_bindgen]
    pub fn frame(&mut self, dt: f32) -> f32 {
        let start = js_sys::Date::now();
        if let Err(e) = self.solver.frame(&self.config, dt, &mut self.images) {
            self.last_error = Some(e.to_string());
        }
        self.write_render_output();
        (js_sys::Date::now() - start) as f32
    }

    /// Message of the most recent rejected request, cleared on read.
    #[wasm_bindgen]
    pub fn last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    #[wasm_bindgen]
    pub fn render_buffer_ptr(&self) -> *const f32 {
        bytemuck::cast_slice::<RenderParticle, f32>(&self.render_buffer).as_ptr()
    }

    #[wasm_bindgen]
    pub fn render_buffer_byte_length(&self) -> usize {
        bytemuck::cast_slice::<RenderParticle, u8>(&self.render_buffer).len()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.solver.particles.active()
    }

    #[wasm_bindgen]
    pub fn max_particles(&self) -> usize {
        self.solver.particles.capacity()
    }

    /// Requested active count. Negative or non-finite values clamp to 0;
    /// counts above capacity are rejected by the next frame.
    #[wasm_bindgen]
    pub fn set_particle_count(&mut self, count: f64) {
        self.config.particle_count = particle_count_from_js(count);
    }

    #[wasm_bindgen]
    pub fn set_running(&mut self, run: bool) {
        self.config.run = run;
    }

    #[wasm_bindgen]
    pub fn set_noise(&mut self, noise_strength: f32, image_noise_strength: f32) {
        self.config.noise_strength = noise_strength;
        self.config.image_noise_strength = image_noise_strength;
    }

    #[wasm_bindgen]
    pub fn set_speed(&mut self, speed: f32) {
        self.config.speed = speed;
    }

    #[wasm_bindgen]
    pub fn set_fluid(&mut self, stiffness: f32, rest_density: f32, dynamic_viscosity: f32) {
        self.config.stiffness = stiffness;
        self.config.rest_density = rest_density;
        self.config.dynamic_viscosity = dynamic_viscosity;
    }

    /// Apply a named fluid preset. Returns `false` for unknown names.
    #[wasm_bindgen]
    pub fn set_fluid_preset(&mut self, name: &str) -> bool {
        match FluidPreset::by_name(name) {
            Some(preset) => {
                preset.apply_to(&mut self.config);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen]
    pub fn set_hide_percentage(&mut self, hide_percentage: f32) {
        self.config.hide_percentage = hide_percentage;
    }

    #[wasm_bindgen]
    pub fn set_cursor_interaction(&mut self, enabled: bool) {
        self.config.cursor_interaction = enabled;
    }

    /// Pointer ray and drag, already in grid space.
    #[wasm_bindgen]
    pub fn set_pointer(
        &mut self,
        active: bool,
        ox: f32, oy: f32, oz: f32,
        dx: f32, dy: f32, dz: f32,
        fx: f32, fy: f32, fz: f32,
        radius: f32,
        strength: f32,
    ) {
        self.config.pointer = mpm_core::forces::pointer::PointerParams {
            active,
            origin: Vec3::new(ox, oy, oz),
            direction: Vec3::new(dx, dy, dz),
            drag_force: Vec3::new(fx, fy, fz),
            radius,
            strength,
        };
    }

    /// Switch mode now rather than on the next frame, so image load
    /// failures reach the caller directly.
    #[wasm_bindgen]
    pub fn set_mode(&mut self, selector: u32) -> Result<(), JsValue> {
        self.config.mode = selector;
        self.solver
            .set_mode(selector, &mut self.images)
            .map_err(to_js)?;
        self.write_render_output();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn mode(&self) -> u32 {
        self.solver.mode().selector()
    }

    /// Store decoded RGBA8 pixels under `name` for the image modes, then
    /// retry a pending mode request that may have been waiting on it.
    #[wasm_bindgen]
    pub fn upload_image(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), JsValue> {
        let image = TargetImage::from_rgba(width, height, rgba).map_err(to_js)?;
        log::info!("image {name:?} uploaded ({width}x{height})");
        self.images.insert(name.to_string(), image);

        // A mode that failed for lack of this image can apply now.
        if let Err(e) = self.solver.retry_requested_mode(&mut self.images) {
            self.last_error = Some(e.to_string());
        }
        self.write_render_output();
        Ok(())
    }

    /// Containment polygon as flat `[x0, y0, x1, y1, ...]` in grid space.
    #[wasm_bindgen]
    pub fn set_polygon(&mut self, xy: &[f32]) -> bool {
        let vertices: Vec<Vec2> = xy
            .chunks_exact(2)
            .map(|p| Vec2::new(p[0], p[1]))
            .collect();
        self.solver.set_polygon(&vertices)
    }

    #[wasm_bindgen]
    pub fn recolor(&mut self) {
        self.solver.recolor();
        self.write_render_output();
    }
}

impl FluidWorld {
    fn write_render_output(&mut self) {
        self.solver.write_render_buffer(&mut self.render_buffer);
    }
}
