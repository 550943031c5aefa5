//! Gravity variants: center-seeking (chaos), front pull, cylinder core.

use glam::{Vec2, Vec3};

/// Strength of the center-seeking pull in chaos mode.
pub const CENTER_GRAVITY: f32 = 0.1;

/// Direction of front gravity: toward the viewer.
pub const FRONT_GRAVITY_DIR: Vec3 = Vec3::Z;

pub const FRONT_GRAVITY_STRENGTH: f32 = 0.3;

/// Per-frame velocity damping in front-gravity modes.
pub const FRONT_GRAVITY_DAMPING: f32 = 0.98;

/// Velocity change pulling a particle toward the grid center.
///
/// The pull has constant magnitude; only its direction depends on where the
/// particle sits. A particle exactly at the center feels nothing.
#[inline]
pub fn center_gravity(pos: Vec3, extent: Vec3, dt: f32) -> Vec3 {
    let rel = pos / extent - Vec3::splat(0.5);
    -rel.normalize_or_zero() * CENTER_GRAVITY * dt
}

#[inline]
pub fn front_gravity(dt: f32) -> Vec3 {
    FRONT_GRAVITY_DIR * FRONT_GRAVITY_STRENGTH * dt
}

/// Hollow core around an axis parallel to the front-gravity direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cylinder {
    /// Axis position in the XY plane.
    pub center: Vec2,
    pub radius: f32,
    pub strength: f32,
}

impl Cylinder {
    /// Core centered in the grid, a quarter of the grid height across.
    pub fn centered(extent: Vec3) -> Self {
        Self {
            center: Vec2::new(extent.x * 0.5, extent.y * 0.5),
            radius: extent.y * 0.25,
            strength: 0.5,
        }
    }
}

/// Outward in-plane push for particles inside the cylinder radius.
pub fn cylinder_repulsion(pos: Vec3, cylinder: &Cylinder, dt: f32) -> Vec3 {
    let rel = pos.truncate() - cylinder.center;
    let r = rel.length();
    if r >= cylinder.radius || r < 1.0e-5 {
        return Vec3::ZERO;
    }
    let push = rel / r * (cylinder.radius - r) * cylinder.strength * dt;
    push.extend(0.0)
}
