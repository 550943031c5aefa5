use glam::Vec3;

/// Pointer (cursor) interaction state, already projected into grid space.
///
/// The host turns the mouse position into a ray through the grid and the
/// mouse motion into `drag_force`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerParams {
    pub active: bool,
    pub origin: Vec3,
    /// Unit direction of the pointer ray.
    pub direction: Vec3,
    pub drag_force: Vec3,
    pub radius: f32,
    pub strength: f32,
}

impl Default for PointerParams {
    fn default() -> Self {
        Self {
            active: false,
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            drag_force: Vec3::ZERO,
            radius: 6.0,
            strength: 1.0,
        }
    }
}

impl PointerParams {
    /// Copy with a unit direction and a usable radius.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let finite = |v: Vec3, fallback: Vec3| if v.is_finite() { v } else { fallback };
        Self {
            active: self.active,
            origin: finite(self.origin, d.origin),
            direction: self.direction.try_normalize().unwrap_or(d.direction),
            drag_force: finite(self.drag_force, Vec3::ZERO),
            radius: if self.radius.is_finite() {
                self.radius.max(0.5)
            } else {
                d.radius
            },
            strength: if self.strength.is_finite() {
                self.strength.max(0.0)
            } else {
                d.strength
            },
        }
    }
}

/// Shortest distance from `pos` to the pointer ray (the half-line from
/// `origin` along `direction`).
#[inline]
pub fn distance_to_ray(pos: Vec3, params: &PointerParams) -> f32 {
    let rel = pos - params.origin;
    let t = rel.dot(params.direction).max(0.0);
    (rel - params.direction * t).length()
}

/// Acceleration the pointer applies to one particle.
///
/// The drag force falls off radially around the ray and is scaled by the
/// particle's mass, so heavier particles are pushed harder.
pub fn compute_pointer_force(pos: Vec3, mass: f32, params: &PointerParams) -> Vec3 {
    if !params.active {
        return Vec3::ZERO;
    }

    let dist = distance_to_ray(pos, params);
    let radius = params.radius.max(0.5);
    let falloff = (-(dist / radius).powf(1.25)).exp();

    params.drag_force * params.strength * falloff * mass
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PointerParams {
        PointerParams {
            active: true,
            origin: Vec3::new(10.0, 10.0, 40.0),
            direction: Vec3::NEG_Z,
            drag_force: Vec3::new(1.0, 0.0, 0.0),
            radius: 4.0,
            strength: 1.0,
        }
    }

    #[test]
    fn test_inactive_pointer_no_force() {
        let p = PointerParams {
            active: false,
            ..params()
        };
        assert_eq!(compute_pointer_force(Vec3::new(10.0, 10.0, 5.0), 1.0, &p), Vec3::ZERO);
    }

    #[test]
    fn test_force_strongest_on_ray() {
        let p = params();
        let on_ray = compute_pointer_force(Vec3::new(10.0, 10.0, 20.0), 1.0, &p);
        let off_ray = compute_pointer_force(Vec3::new(16.0, 10.0, 20.0), 1.0, &p);
        assert!((on_ray.x - 1.0).abs() < 1e-6);
        assert!(off_ray.x < on_ray.x && off_ray.x > 0.0);
    }

    #[test]
    fn test_behind_origin_measures_from_origin() {
        let p = params();
        let d = distance_to_ray(Vec3::new(10.0, 13.0, 44.0), &p);
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_sanitize_normalizes_direction() {
        let p = PointerParams {
            direction: Vec3::new(0.0, 0.0, -5.0),
            radius: 0.0,
            ..params()
        }
        .sanitized();
        assert!((p.direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(p.radius, 0.5);
    }
}
