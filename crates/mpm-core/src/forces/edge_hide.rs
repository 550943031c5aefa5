use glam::Vec3;

use crate::math::index_hash;

/// Distance of the hiding slabs from the x faces, in cells.
pub const EDGE_SLAB_INSET: f32 = 3.5;

pub const EDGE_PULL: f32 = 0.8;

/// Whether particle `index` belongs to the hidden fraction.
///
/// Selection only depends on the index, so the same particles stay hidden
/// frame after frame and raising the percentage only adds to the set.
#[inline]
pub fn is_hidden(index: usize, hide_percentage: f32) -> bool {
    hide_percentage > 0.0 && index_hash(index) < hide_percentage
}

/// Pull toward the nearer of the two slabs at the x extremes.
pub fn edge_hide_force(pos: Vec3, extent: Vec3) -> Vec3 {
    let slab_x = if pos.x < extent.x * 0.5 {
        EDGE_SLAB_INSET
    } else {
        extent.x - EDGE_SLAB_INSET
    };
    Vec3::new((slab_x - pos.x) * EDGE_PULL, 0.0, 0.0)
}
