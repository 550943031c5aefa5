//! One-sided containment springs: spheres and an XY polygon.

use glam::{Vec2, Vec3};

/// Most vertices a containment polygon may have.
pub const MAX_POLYGON_VERTICES: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Pull back toward the center once outside the radius.
///
/// Magnitude is `strength * (distance - radius)`; zero inside.
#[inline]
pub fn sphere_pull(pos: Vec3, sphere: &Sphere, strength: f32) -> Vec3 {
    let rel = pos - sphere.center;
    let dist = rel.length();
    if dist <= sphere.radius || dist < 1.0e-6 {
        return Vec3::ZERO;
    }
    -rel / dist * (dist - sphere.radius) * strength
}

/// Push out of a sphere. Used for negative space.
#[inline]
pub fn sphere_push(pos: Vec3, sphere: &Sphere, strength: f32) -> Vec3 {
    let rel = pos - sphere.center;
    let dist = rel.length();
    if dist >= sphere.radius || dist < 1.0e-6 {
        return Vec3::ZERO;
    }
    rel / dist * (sphere.radius - dist) * strength
}

/// Closed vertex loop in the XY plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Build from a vertex loop. Extra vertices beyond
    /// [`MAX_POLYGON_VERTICES`] are dropped; fewer than three yields `None`.
    pub fn new(vertices: &[Vec2]) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let n = vertices.len().min(MAX_POLYGON_VERTICES);
        Some(Self {
            vertices: vertices[..n].to_vec(),
        })
    }

    /// Regular polygon, first vertex pointing up.
    pub fn regular(center: Vec2, radius: f32, sides: usize) -> Self {
        let sides = sides.clamp(3, MAX_POLYGON_VERTICES);
        let vertices = (0..sides)
            .map(|k| {
                let a = std::f32::consts::FRAC_PI_2 + k as f32 / sides as f32 * std::f32::consts::TAU;
                center + Vec2::new(a.cos(), a.sin()) * radius
            })
            .collect();
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Even-odd ray casting along +x.
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Nearest point on the boundary.
    pub fn nearest_point(&self, p: Vec2) -> Vec2 {
        let mut best = self.vertices[0];
        let mut best_d2 = f32::INFINITY;
        for (a, b) in self.edges() {
            let q = closest_on_segment(p, a, b);
            let d2 = q.distance_squared(p);
            if d2 < best_d2 {
                best_d2 = d2;
                best = q;
            }
        }
        best
    }
}

#[inline]
fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < 1.0e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// In-plane push toward the nearest edge point for particles outside.
pub fn polygon_force(pos: Vec3, polygon: &Polygon, strength: f32) -> Vec3 {
    let p = pos.truncate();
    if polygon.contains(p) {
        return Vec3::ZERO;
    }
    ((polygon.nearest_point(p) - p) * strength).extend(0.0)
}
