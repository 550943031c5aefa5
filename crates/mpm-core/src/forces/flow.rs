use glam::Vec3;

use crate::math::curl_noise;

/// Spatial frequency of the large curl-noise octave, in 1/cells.
const LARGE_SCALE: f32 = 0.04;

/// Spatial frequency of the fine octave.
const FINE_SCALE: f32 = 0.13;

/// Ambient curl-noise acceleration.
///
/// Two octaves: a slow large-scale swirl plus a finer layer whose phase is
/// offset per particle by `id_hash`, so neighbors do not move in lockstep.
/// The result is divergence-free per octave and scales linearly with
/// `strength`.
pub fn ambient_flow(pos: Vec3, id_hash: f32, time: f32, strength: f32) -> Vec3 {
    if strength <= 0.0 {
        return Vec3::ZERO;
    }

    let large = curl_noise(pos * LARGE_SCALE, time * 0.3);
    let fine = curl_noise(pos * FINE_SCALE + Vec3::splat(id_hash * 3.0), time * 0.6);

    (large * 0.7 + fine * 0.3) * strength
}
