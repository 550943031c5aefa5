//! CPU MLS-MPM fluid simulation with artistic force-field modes.
//!
//! [`solver::Solver`] owns the particle and grid buffers and runs the
//! transfer passes in [`transfer`] once per frame. The active mode in
//! [`modes`] decides which [`forces`] the gather pass applies.

pub mod config;
pub mod error;
pub mod fixed_point;
pub mod forces;
pub mod grid;
pub mod materials;
pub mod math;
pub mod modes;
pub mod palette;
pub mod particle;
pub mod solver;
pub mod transfer;

pub use error::{Result, SimError};
