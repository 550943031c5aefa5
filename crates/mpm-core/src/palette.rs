//! Fixed particle palette and bulk recoloring on mode change.

use glam::Vec3;

use crate::math::{hash11, index_hash};
use crate::modes::targets::ImageTargets;
use crate::modes::Mode;
use crate::particle::ParticleStore;

pub const PALETTE: [Vec3; 5] = [
    Vec3::new(1.0, 0.42, 0.42),
    Vec3::new(1.0, 0.76, 0.28),
    Vec3::new(0.2, 0.8, 0.72),
    Vec3::new(0.3, 0.55, 1.0),
    Vec3::new(0.65, 0.4, 0.95),
];

/// Palette entry for particle `index`, spread evenly by hash.
#[inline]
pub fn palette_color(index: usize) -> Vec3 {
    // Decorrelated from `index_hash`, which picks the edge-hidden particles.
    let h = hash11(index as f32 * 0.7071 + 13.0);
    PALETTE[((h * PALETTE.len() as f32) as usize).min(PALETTE.len() - 1)]
}

/// Rewrite the color of every active particle for `mode`.
///
/// Image modes take the per-particle target color; particles past the end
/// of `targets` fall back to the palette.
pub fn recolor(particles: &mut ParticleStore, mode: Mode, targets: Option<&ImageTargets>) {
    let active = particles.active();
    for (i, color) in particles.color[..active].iter_mut().enumerate() {
        *color = match mode {
            Mode::Image { .. } => targets
                .and_then(|t| t.colors.get(i).copied())
                .unwrap_or_else(|| palette_color(i)),
            Mode::TwoColorSphere => {
                if index_hash(i) < 0.5 {
                    PALETTE[0]
                } else {
                    PALETTE[3]
                }
            }
            _ => palette_color(i),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_is_used() {
        let mut seen = [0usize; 5];
        for i in 0..5000 {
            let c = palette_color(i);
            let k = PALETTE.iter().position(|p| *p == c).unwrap();
            seen[k] += 1;
        }
        for count in seen {
            assert!(count > 500, "palette key underused: {seen:?}");
        }
    }

    #[test]
    fn two_color_sphere_uses_two_colors() {
        let mut particles = ParticleStore::new(256);
        particles.set_active(256).unwrap();
        recolor(&mut particles, Mode::TwoColorSphere, None);
        assert!(particles.color.iter().all(|c| *c == PALETTE[0] || *c == PALETTE[3]));
    }

    #[test]
    fn image_mode_copies_target_colors() {
        let mut particles = ParticleStore::new(4);
        particles.set_active(3).unwrap();
        let targets = ImageTargets {
            positions: vec![Vec3::ZERO; 2],
            colors: vec![Vec3::X, Vec3::Y],
            spacing: 1.0,
        };
        recolor(&mut particles, Mode::Image { slot: 0 }, Some(&targets));
        assert_eq!(particles.color[0], Vec3::X);
        assert_eq!(particles.color[1], Vec3::Y);
        assert_eq!(particles.color[2], palette_color(2));
        // Inactive slots are untouched.
        assert_eq!(particles.color[3], Vec3::ONE);
    }
}
