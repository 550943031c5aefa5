use glam::Vec3;

use crate::math::{curl_noise, hash31};

/// Spring constant of the pull toward an image target.
pub const IMAGE_PULL: f32 = 2.0;

/// Per-frame velocity damping while an image mode is active.
pub const IMAGE_DAMPING: f32 = 0.9;

/// Fraction of a lattice spacing the per-index jitter may span.
pub const IMAGE_JITTER_FRACTION: f32 = 0.5;

/// Spatial frequency of the animated target wobble.
const WOBBLE_SCALE: f32 = 0.05;

/// Offset applied to a particle's image target.
///
/// A fixed per-index jitter of up to half a lattice spacing breaks up the
/// visible grid pattern. Animated targets also drift along a curl-noise
/// field whose amplitude is `noise_strength`.
pub fn target_offset(
    index: usize,
    target: Vec3,
    spacing: f32,
    time: f32,
    noise_strength: f32,
    animated: bool,
) -> Vec3 {
    let jitter = hash31(index as f32 * 1.618 + 0.5) - Vec3::splat(0.5);
    let mut offset = jitter * (spacing * IMAGE_JITTER_FRACTION);
    if animated {
        offset += curl_noise(target * WOBBLE_SCALE, time) * (spacing * noise_strength);
    }
    offset
}

/// Acceleration toward the (offset) target, proportional to distance.
#[inline]
pub fn image_pull(pos: Vec3, target: Vec3, offset: Vec3) -> Vec3 {
    (target + offset - pos) * IMAGE_PULL
}
