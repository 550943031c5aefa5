use glam::{Mat3, Vec3, Vec3Swizzles};

/// Fractional part, GLSL `fract` semantics (always in [0,1)).
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// GLSL-style `mix(a, b, t)` for scalars.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Scalar hash in [0,1). Cheap, stateless, and stable across platforms,
/// which is all per-particle jitter needs.
pub fn hash11(p: f32) -> f32 {
    let h = fract(p * 0.1031);
    let h = h * (h + 33.33);
    fract(2.0 * h * h)
}

/// Hash of a lattice corner, used by [`noise`].
pub fn hash12(x: f32, y: f32) -> f32 {
    let v = Vec3::new(x, x, y) * 0.1031;
    let mut p3 = v - v.floor();
    p3 += Vec3::splat(p3.dot(p3.yzx() + Vec3::splat(33.33)));
    fract((p3.x + p3.y) * p3.z)
}

/// Three independent hashes of one scalar, each in [0,1).
pub fn hash31(p: f32) -> Vec3 {
    let mut p3 = Vec3::new(fract(p * 0.1031), fract(p * 0.1030), fract(p * 0.0973));
    p3 += Vec3::splat(p3.dot(p3.yzx() + Vec3::splat(33.33)));
    Vec3::new(
        fract((p3.x + p3.y) * p3.z),
        fract((p3.x + p3.z) * p3.y),
        fract((p3.y + p3.z) * p3.x),
    )
}

/// Deterministic per-particle hash in [0,1), stable across frames.
#[inline]
pub fn index_hash(index: usize) -> f32 {
    hash11(index as f32 * 1.618 + 0.5)
}

/// Cubic Hermite ramp from 0 at `edge0` to 1 at `edge1`, clamped outside.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// 2D value noise in [0,1].
pub fn noise(x: f32, y: f32) -> f32 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = x - ix;
    let fy = y - iy;
    let ux = fx * fx * (3.0 - 2.0 * fx);
    let uy = fy * fy * (3.0 - 2.0 * fy);

    let a = hash12(ix, iy);
    let b = hash12(ix + 1.0, iy);
    let c = hash12(ix, iy + 1.0);
    let d = hash12(ix + 1.0, iy + 1.0);

    mix(mix(a, b, ux), mix(c, d, ux), uy)
}

/// 2D curl of the value-noise field (divergence free).
pub fn curl(x: f32, y: f32) -> (f32, f32) {
    const E: f32 = 0.1;
    let n1 = noise(x, y + E);
    let n2 = noise(x, y - E);
    let n3 = noise(x + E, y);
    let n4 = noise(x - E, y);
    let dx = (n1 - n2) / (2.0 * E);
    let dy = (n3 - n4) / (2.0 * E);
    (dx, -dy)
}

/// 3D curl-noise built from the planar curls of the three axis pairs.
///
/// Each component is roughly in [-3, 3]; callers scale it.
pub fn curl_noise(p: Vec3, time: f32) -> Vec3 {
    let (xy_x, xy_y) = curl(p.x + time * 0.11, p.y - time * 0.07);
    let (yz_y, yz_z) = curl(p.y + 17.3 - time * 0.05, p.z + time * 0.09);
    let (zx_z, zx_x) = curl(p.z - 31.7 + time * 0.06, p.x + 5.1 - time * 0.1);
    Vec3::new(xy_x + zx_x, xy_y + yz_y, yz_z + zx_z) * 0.5
}

/// Outer product `a * b^T` (column-major, so column j is `a * b[j]`).
#[inline]
pub fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}
