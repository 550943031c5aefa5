use crate::config::SimConfig;

/// Equation-of-state preset for quick configuration of fluid behavior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidPreset {
    pub stiffness: f32,
    pub rest_density: f32,
    pub dynamic_viscosity: f32,
}

impl FluidPreset {
    /// Water: the default tuning, lively and slightly viscous.
    pub const WATER: Self = Self {
        stiffness: 3.0,
        rest_density: 4.0,
        dynamic_viscosity: 0.1,
    };

    /// Honey: soft pressure, heavy viscous drag.
    pub const HONEY: Self = Self {
        stiffness: 1.5,
        rest_density: 4.0,
        dynamic_viscosity: 0.6,
    };

    /// Foam: low rest density so the particles spread out and float.
    pub const FOAM: Self = Self {
        stiffness: 2.0,
        rest_density: 2.0,
        dynamic_viscosity: 0.05,
    };

    /// Sand-like granular: stiff, packed, no viscosity.
    pub const GRANULAR: Self = Self {
        stiffness: 8.0,
        rest_density: 5.0,
        dynamic_viscosity: 0.0,
    };

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "water" => Some(Self::WATER),
            "honey" => Some(Self::HONEY),
            "foam" => Some(Self::FOAM),
            "granular" | "sand" => Some(Self::GRANULAR),
            _ => None,
        }
    }

    /// Apply this preset to a simulation config.
    pub fn apply_to(&self, config: &mut SimConfig) {
        config.stiffness = self.stiffness;
        config.rest_density = self.rest_density;
        config.dynamic_viscosity = self.dynamic_viscosity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_survive_sanitize() {
        for (name, preset) in [
            ("water", FluidPreset::WATER),
            ("honey", FluidPreset::HONEY),
            ("foam", FluidPreset::FOAM),
            ("granular", FluidPreset::GRANULAR),
        ] {
            let mut config = SimConfig::default();
            preset.apply_to(&mut config);
            let clean = config.sanitized();
            assert_eq!(clean.stiffness, preset.stiffness, "{} stiffness clamped", name);
            assert_eq!(clean.rest_density, preset.rest_density, "{} density clamped", name);
            assert_eq!(FluidPreset::by_name(name), Some(preset));
        }
    }

    #[test]
    fn test_water_matches_defaults() {
        let d = SimConfig::default();
        let mut config = SimConfig::default();
        FluidPreset::WATER.apply_to(&mut config);
        assert_eq!(config.stiffness, d.stiffness);
        assert_eq!(config.rest_density, d.rest_density);
        assert_eq!(config.dynamic_viscosity, d.dynamic_viscosity);
    }
}
