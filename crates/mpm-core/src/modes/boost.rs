//! Time-eased strength ramp for freshly activated attractor modes.

use crate::math::{mix, smoothstep};

/// Seconds a boost lasts after activation.
pub const BOOST_DURATION: f32 = 1.4;

/// Spring multiplier right after activation.
pub const BOOST_MAX_MULTIPLIER: f32 = 20.0;

/// Velocity damping right after activation.
pub const BOOST_MIN_DAMPING: f32 = 0.7;

/// Velocity damping once the boost has worn off.
pub const BOOST_REST_DAMPING: f32 = 0.98;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoostFactors {
    /// Applied to containment spring strength.
    pub multiplier: f32,
    /// Applied multiplicatively to velocity.
    pub damping: f32,
}

impl BoostFactors {
    /// No boost, no damping.
    pub const NEUTRAL: Self = Self {
        multiplier: 1.0,
        damping: 1.0,
    };
}

/// Factors for a boost with `remaining` seconds left on its timer.
///
/// `progress = remaining / duration` is eased with smoothstep, so the
/// multiplier starts at 20 and the damping at 0.7, then both relax to
/// 1 and 0.98 as the timer runs out.
pub fn boost_factors(remaining: f32) -> BoostFactors {
    let eased = smoothstep(0.0, 1.0, remaining / BOOST_DURATION);
    BoostFactors {
        multiplier: mix(1.0, BOOST_MAX_MULTIPLIER, eased),
        damping: mix(BOOST_REST_DAMPING, BOOST_MIN_DAMPING, eased),
    }
}

/// Countdown driven by the simulation clock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoostTimer {
    remaining: f32,
}

impl BoostTimer {
    pub fn start(&mut self) {
        self.remaining = BOOST_DURATION;
    }

    pub fn stop(&mut self) {
        self.remaining = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn factors(&self) -> BoostFactors {
        boost_factors(self.remaining)
    }
}
