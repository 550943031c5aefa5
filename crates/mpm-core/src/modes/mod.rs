//! Primary mode selection and the state each mode carries.

pub mod boost;
pub mod targets;

use std::fmt;

use glam::{Vec2, Vec3};

use crate::error::{Result, SimError};
use crate::forces::attractor::AttractorTable;
use crate::forces::containment::{Polygon, Sphere};
use crate::forces::gravity::Cylinder;
use crate::forces::ForceField;
use crate::palette::PALETTE;
use boost::{BoostFactors, BoostTimer};
use targets::{ImageSource, ImageTargets, TargetImage};

/// Names the host uploads target images under, one per image slot.
pub const IMAGE_NAMES: [&str; 3] = ["image-0", "image-1", "image-2"];

/// Image slot whose targets drift along a curl-noise field.
pub const ANIMATED_IMAGE_SLOT: usize = 2;

/// Sides of the containment polygon before the host sets one.
const DEFAULT_POLYGON_SIDES: usize = 6;

/// Primary simulation mode. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Chaos,
    Image { slot: usize },
    FrontGravity,
    FrontGravityCylinder,
    Sphere,
    ColorAttractor { key: usize },
    Polygon,
    TwoColorSphere,
}

impl Mode {
    /// Decode the host's integer selector.
    ///
    /// | selector | mode |
    /// |---|---|
    /// | 0 | chaos |
    /// | 1..=3 | image slot 0..=2 |
    /// | 4 | front gravity |
    /// | 5 | front gravity + cylinder |
    /// | 6 | sphere |
    /// | 7..=11 | color attractor, palette key 0..=4 |
    /// | 12 | polygon |
    /// | 13 | two-color sphere |
    pub fn from_selector(selector: u32) -> Result<Self> {
        let mode = match selector {
            0 => Mode::Chaos,
            1..=3 => Mode::Image {
                slot: (selector - 1) as usize,
            },
            4 => Mode::FrontGravity,
            5 => Mode::FrontGravityCylinder,
            6 => Mode::Sphere,
            7..=11 => Mode::ColorAttractor {
                key: (selector - 7) as usize,
            },
            12 => Mode::Polygon,
            13 => Mode::TwoColorSphere,
            _ => return Err(SimError::UnknownMode(selector)),
        };
        Ok(mode)
    }

    pub fn selector(self) -> u32 {
        match self {
            Mode::Chaos => 0,
            Mode::Image { slot } => 1 + slot as u32,
            Mode::FrontGravity => 4,
            Mode::FrontGravityCylinder => 5,
            Mode::Sphere => 6,
            Mode::ColorAttractor { key } => 7 + key as u32,
            Mode::Polygon => 12,
            Mode::TwoColorSphere => 13,
        }
    }

    /// Attractor-family modes ramp in with a boost.
    pub fn is_boosted(self) -> bool {
        matches!(
            self,
            Mode::Sphere | Mode::TwoColorSphere | Mode::ColorAttractor { .. }
        )
    }

    pub fn is_front_gravity(self) -> bool {
        matches!(self, Mode::FrontGravity | Mode::FrontGravityCylinder)
    }

    pub fn is_image(self) -> bool {
        matches!(self, Mode::Image { .. })
    }

    pub fn image_name(self) -> Option<&'static str> {
        match self {
            Mode::Image { slot } => IMAGE_NAMES.get(slot).copied(),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Chaos => "chaos",
            Mode::Image { .. } => "image",
            Mode::FrontGravity => "front-gravity",
            Mode::FrontGravityCylinder => "front-gravity-cylinder",
            Mode::Sphere => "sphere",
            Mode::ColorAttractor { .. } => "color-attractor",
            Mode::Polygon => "polygon",
            Mode::TwoColorSphere => "two-color-sphere",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Image { slot } => write!(f, "image[{slot}]"),
            Mode::ColorAttractor { key } => write!(f, "color-attractor[{key}]"),
            other => f.write_str(other.name()),
        }
    }
}

/// Loaded image plus the targets derived from it for the current count.
#[derive(Clone, Debug)]
struct LoadedImage {
    image: TargetImage,
    targets: ImageTargets,
}

/// The active mode and all geometry the force fields need.
#[derive(Clone, Debug)]
pub struct ModeState {
    mode: Mode,
    extent: Vec3,
    sphere: Sphere,
    cylinder: Cylinder,
    polygon: Polygon,
    attractors: AttractorTable,
    image: Option<LoadedImage>,
    boost: BoostTimer,
    /// Simulation time of the last successful switch.
    activated_at: f32,
}

impl ModeState {
    pub fn new(extent: Vec3) -> Self {
        let center = extent * 0.5;
        Self {
            mode: Mode::Chaos,
            extent,
            sphere: Sphere::new(center, extent.y * 0.3),
            cylinder: Cylinder::centered(extent),
            polygon: Polygon::regular(center.truncate(), extent.y * 0.35, DEFAULT_POLYGON_SIDES),
            attractors: AttractorTable::layout(&PALETTE, extent),
            image: None,
            boost: BoostTimer::default(),
            activated_at: 0.0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn activated_at(&self) -> f32 {
        self.activated_at
    }

    pub fn sphere(&self) -> &Sphere {
        &self.sphere
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn attractors(&self) -> &AttractorTable {
        &self.attractors
    }

    pub fn image_targets(&self) -> Option<&ImageTargets> {
        self.image.as_ref().map(|loaded| &loaded.targets)
    }

    pub fn boost_timer(&self) -> &BoostTimer {
        &self.boost
    }

    /// Boost factors for this frame; neutral outside boosted modes.
    pub fn boost(&self) -> BoostFactors {
        if self.mode.is_boosted() {
            self.boost.factors()
        } else {
            BoostFactors::NEUTRAL
        }
    }

    /// Make `mode` the active mode.
    ///
    /// Image modes load their image first; if that fails nothing changes
    /// and the previous mode stays active.
    pub fn switch(
        &mut self,
        mode: Mode,
        now: f32,
        particle_count: usize,
        images: &mut dyn ImageSource,
    ) -> Result<()> {
        let image = match mode.image_name() {
            Some(name) => {
                let image = images.load(name).map_err(|e| SimError::ImageLoad {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
                let targets = ImageTargets::build(&image, particle_count, self.extent);
                Some(LoadedImage { image, targets })
            }
            None => None,
        };

        if let Mode::ColorAttractor { .. } = mode {
            self.attractors = AttractorTable::layout(&PALETTE, self.extent);
        }

        self.mode = mode;
        self.image = image;
        self.activated_at = now;
        if mode.is_boosted() {
            self.boost.start();
        } else {
            self.boost.stop();
        }
        Ok(())
    }

    /// Rebuild count-dependent geometry after the active count changed.
    pub fn resize(&mut self, particle_count: usize) {
        if let Some(loaded) = self.image.as_mut() {
            loaded.targets = ImageTargets::build(&loaded.image, particle_count, self.extent);
        }
    }

    /// Replace the containment polygon. Returns `false` (and keeps the old
    /// one) for fewer than three vertices.
    pub fn set_polygon(&mut self, vertices: &[Vec2]) -> bool {
        match Polygon::new(vertices) {
            Some(polygon) => {
                self.polygon = polygon;
                true
            }
            None => false,
        }
    }

    /// Advance the boost countdown by one frame of simulation time.
    pub fn tick(&mut self, frame_dt: f32) {
        self.boost.tick(frame_dt);
    }

    /// Force field the gather pass evaluates for the active mode.
    pub fn field(&self) -> ForceField<'_> {
        match self.mode {
            Mode::Chaos => ForceField::Chaos,
            Mode::Image { slot } => match &self.image {
                Some(loaded) => ForceField::Image {
                    targets: &loaded.targets,
                    animated: slot == ANIMATED_IMAGE_SLOT,
                },
                None => ForceField::Chaos,
            },
            Mode::FrontGravity => ForceField::FrontGravity { cylinder: None },
            Mode::FrontGravityCylinder => ForceField::FrontGravity {
                cylinder: Some(self.cylinder),
            },
            Mode::Sphere => ForceField::Sphere(self.sphere),
            Mode::TwoColorSphere => ForceField::TwoColorSphere(self.sphere),
            Mode::Polygon => ForceField::Polygon(&self.polygon),
            Mode::ColorAttractor { key } => ForceField::ColorAttractor {
                table: &self.attractors,
                active: key,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::targets::NoImages;

    #[test]
    fn selector_round_trips() {
        for selector in 0..=13 {
            let mode = Mode::from_selector(selector).unwrap();
            assert_eq!(mode.selector(), selector);
        }
        assert!(matches!(
            Mode::from_selector(14),
            Err(SimError::UnknownMode(14))
        ));
    }

    #[test]
    fn boosted_switch_starts_timer() {
        let mut state = ModeState::new(Vec3::new(128.0, 64.0, 64.0));
        state
            .switch(Mode::ColorAttractor { key: 2 }, 5.0, 100, &mut NoImages)
            .unwrap();
        assert!(state.boost_timer().is_active());
        assert_eq!(state.activated_at(), 5.0);
        assert_eq!(state.boost().multiplier, boost::BOOST_MAX_MULTIPLIER);

        state.switch(Mode::Polygon, 6.0, 100, &mut NoImages).unwrap();
        assert!(!state.boost_timer().is_active());
        assert_eq!(state.boost(), BoostFactors::NEUTRAL);
    }

    #[test]
    fn failed_image_load_keeps_mode() {
        let mut state = ModeState::new(Vec3::new(128.0, 64.0, 64.0));
        state.switch(Mode::Sphere, 1.0, 100, &mut NoImages).unwrap();
        let err = state
            .switch(Mode::Image { slot: 0 }, 2.0, 100, &mut NoImages)
            .unwrap_err();
        assert!(matches!(err, SimError::ImageLoad { .. }));
        assert_eq!(state.mode(), Mode::Sphere);
        assert_eq!(state.activated_at(), 1.0);
        assert!(state.image_targets().is_none());
    }
}
