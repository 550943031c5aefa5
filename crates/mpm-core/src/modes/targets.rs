//! Image-target layout: which grid position and color each particle aims
//! for in the image modes.
//!
//! Decoding is the host's job. It hands over RGBA pixels through an
//! [`ImageSource`], and this module maps them onto a regular lattice in the
//! grid's XY plane, one lattice point per active particle.

use std::collections::HashMap;
use std::error::Error;

use glam::{UVec2, Vec2, Vec3};

/// Cells left free around the image on the x and y faces.
pub const IMAGE_MARGIN: f32 = 8.0;

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 4]>,
}

impl TargetImage {
    /// Wrap a tightly packed RGBA8 byte buffer.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err(format!("empty image ({width}x{height})"));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            ));
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// RGB of the pixel at `(x, y)` in [0,1], clamped to the image.
    /// Pixels missing from a short buffer read as black.
    pub fn rgb(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let index = y as usize * self.width as usize + x as usize;
        let [r, g, b, _] = self.pixels.get(index).copied().unwrap_or([0; 4]);
        Vec3::new(r as f32, g as f32, b as f32) / 255.0
    }
}

/// Host-side loader for target images, keyed by name.
pub trait ImageSource {
    fn load(&mut self, name: &str) -> Result<TargetImage, Box<dyn Error + Send + Sync>>;
}

/// In-memory image store: whatever the host uploaded, by name.
impl ImageSource for HashMap<String, TargetImage> {
    fn load(&mut self, name: &str) -> Result<TargetImage, Box<dyn Error + Send + Sync>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| format!("no image uploaded under {name:?}").into())
    }
}

/// Source with no images at all. Every image mode fails to load.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn load(&mut self, name: &str) -> Result<TargetImage, Box<dyn Error + Send + Sync>> {
        Err(format!("no image source for {name:?}").into())
    }
}

/// Lattice the particles are arranged on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetLayout {
    pub columns: u32,
    pub rows: u32,
    /// Grid-space distance between neighboring lattice points.
    pub spacing: f32,
    /// Lattice point of column 0, row 0 (bottom left).
    pub start: Vec3,
}

impl TargetLayout {
    /// Fit `count` lattice points with the image's aspect ratio into the
    /// XY face of the grid, centered, at mid depth.
    pub fn for_image(count: usize, width: u32, height: u32, extent: Vec3) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let avail = (extent.truncate() - Vec2::splat(2.0 * IMAGE_MARGIN)).max(Vec2::ONE);
        let rect = if aspect > avail.x / avail.y {
            Vec2::new(avail.x, avail.x / aspect)
        } else {
            Vec2::new(avail.y * aspect, avail.y)
        };

        let count = count.max(1) as f32;
        let columns = (count * aspect).sqrt().ceil().max(1.0) as u32;
        let rows = (count / columns as f32).ceil().max(1.0) as u32;
        let spacing = (rect.x / columns as f32).min(rect.y / rows as f32);

        let span = UVec2::new(columns - 1, rows - 1).as_vec2() * spacing;
        let center = extent * 0.5;
        Self {
            columns,
            rows,
            spacing,
            start: Vec3::new(center.x - span.x * 0.5, center.y - span.y * 0.5, center.z),
        }
    }

    /// Lattice point and normalized image coordinate of particle `index`.
    ///
    /// Lattice row 0 is the bottom of the image.
    pub fn slot(&self, index: usize) -> (Vec3, Vec2) {
        let col = (index % self.columns as usize) as f32;
        let row = (index / self.columns as usize) as f32;
        let position = self.start + Vec3::new(col * self.spacing, row * self.spacing, 0.0);
        let uv = Vec2::new(
            (col + 0.5) / self.columns as f32,
            1.0 - (row + 0.5) / self.rows as f32,
        );
        (position, uv)
    }
}

/// Per-particle target positions and colors for one image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageTargets {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub spacing: f32,
}

impl ImageTargets {
    pub fn build(image: &TargetImage, count: usize, extent: Vec3) -> Self {
        let layout = TargetLayout::for_image(count, image.width, image.height, extent);
        let (positions, colors) = (0..count)
            .map(|i| {
                let (position, uv) = layout.slot(i);
                let x = (uv.x * image.width as f32) as u32;
                let y = (uv.y * image.height as f32) as u32;
                (position, image.rgb(x, y))
            })
            .unzip();
        Self {
            positions,
            colors,
            spacing: layout.spacing,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
