//! Per-class range settings that bound every generated attribute.
//!
//! Settings are plain serde data so a front end can load them from RON. Defaults reproduce
//! the hand-tuned tables for stars, planets, and asteroids.

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{GenerationError, Result};
use crate::sphere_mesh::LayerBlend;

/// Inclusive float range sampled by linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `min + (max - min) * p`.
    pub fn lerp(&self, p: f32) -> f32 {
        self.min + (self.max - self.min) * p
    }

    fn validate(&self, attribute: &str) -> Result<()> {
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            return Err(GenerationError::InvalidRange {
                attribute: attribute.to_string(),
                min: self.min as f64,
                max: self.max as f64,
            });
        }
        Ok(())
    }
}

/// Inclusive integer range; interpolation rounds to the nearest integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn lerp(&self, p: f32) -> i32 {
        self.min + ((self.max - self.min) as f32 * p).round() as i32
    }

    fn validate_count(&self, attribute: &str) -> Result<()> {
        if self.min > self.max {
            return Err(GenerationError::InvalidRange {
                attribute: attribute.to_string(),
                min: self.min as f64,
                max: self.max as f64,
            });
        }
        if self.min < 1 {
            return Err(GenerationError::NonPositiveCount {
                attribute: attribute.to_string(),
                value: self.min,
            });
        }
        Ok(())
    }
}

fn validate_probability(attribute: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GenerationError::InvalidProbability {
            attribute: attribute.to_string(),
            value,
        });
    }
    Ok(())
}

/// Ranges for the fractal surface layers of one body class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSettings {
    /// Noise-space offset shared by every layer.
    pub centre: [f32; 3],
    pub base_roughness: Range,
    pub roughness: Range,
    pub persistence: Range,
    pub min_value: Range,
    pub strength: Range,
    pub steps: IntRange,
    /// Chance that a layer after the first is masked by the first.
    pub mask_probability: f32,
}

impl SurfaceSettings {
    pub fn centre(&self) -> Vec3 {
        Vec3::from_array(self.centre)
    }
}

/// Ranges for orbital attributes of one body class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitSettings {
    pub offset: Range,
    /// Radians.
    pub initial_angle: Range,
    /// Gap kept between a body and the previous orbit.
    pub empty_range: Range,
    /// Degrees.
    pub rotation_angle: Range,
}

/// Everything needed to configure one class of body (star, planet, asteroid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSettings {
    pub existence_probability: f32,
    pub radius: Range,
    pub velocity: Range,
    pub layer_count: IntRange,
    pub orbit: OrbitSettings,
    pub surface: SurfaceSettings,
}

impl ClassSettings {
    /// The central star: always exists, large and smooth.
    pub fn star() -> Self {
        Self {
            existence_probability: 1.0,
            radius: Range::new(1.0, 1.5),
            velocity: Range::new(0.000_001, 0.000_01),
            layer_count: IntRange::new(1, 2),
            orbit: OrbitSettings {
                offset: Range::new(0.0, 0.0),
                initial_angle: Range::new(0.0, 0.0),
                empty_range: Range::new(0.0, 0.0),
                rotation_angle: Range::new(-360.0, 360.0),
            },
            surface: SurfaceSettings {
                centre: [0.0; 3],
                base_roughness: Range::new(0.8, 1.2),
                roughness: Range::new(2.0, 2.5),
                persistence: Range::new(0.45, 0.55),
                min_value: Range::new(0.95, 1.0),
                strength: Range::new(0.02, 0.05),
                steps: IntRange::new(3, 5),
                mask_probability: 0.5,
            },
        }
    }

    pub fn planet() -> Self {
        Self {
            existence_probability: 0.2,
            radius: Range::new(0.1, 0.5),
            velocity: Range::new(0.000_000_5, 0.000_05),
            layer_count: IntRange::new(2, 4),
            orbit: OrbitSettings {
                offset: Range::new(-0.01, 0.01),
                initial_angle: Range::new(0.0, std::f32::consts::TAU),
                empty_range: Range::new(0.01, 0.15),
                rotation_angle: Range::new(-360.0, 360.0),
            },
            surface: SurfaceSettings {
                centre: [0.0; 3],
                base_roughness: Range::new(0.85, 1.0),
                roughness: Range::new(2.7, 3.0),
                persistence: Range::new(0.4, 0.5),
                min_value: Range::new(0.8, 0.9),
                strength: Range::new(0.1, 0.3),
                steps: IntRange::new(2, 4),
                mask_probability: 1.0,
            },
        }
    }

    /// Small, rough, fast-spinning rocks.
    pub fn asteroid() -> Self {
        Self {
            existence_probability: 0.8,
            radius: Range::new(0.02, 0.06),
            velocity: Range::new(0.000_01, 0.000_1),
            layer_count: IntRange::new(1, 2),
            orbit: OrbitSettings {
                offset: Range::new(-0.02, 0.02),
                initial_angle: Range::new(0.0, std::f32::consts::TAU),
                empty_range: Range::new(0.01, 0.08),
                rotation_angle: Range::new(-360.0, 360.0),
            },
            surface: SurfaceSettings {
                centre: [0.0; 3],
                base_roughness: Range::new(1.5, 2.5),
                roughness: Range::new(2.0, 2.5),
                persistence: Range::new(0.5, 0.6),
                min_value: Range::new(0.5, 0.7),
                strength: Range::new(0.2, 0.4),
                steps: IntRange::new(3, 5),
                mask_probability: 0.3,
            },
        }
    }

    /// Reject inverted ranges and out-of-range probabilities. `class` prefixes attribute names.
    pub fn validate(&self, class: &str) -> Result<()> {
        let name = |attr: &str| format!("{class}.{attr}");
        validate_probability(&name("existence_probability"), self.existence_probability)?;
        self.radius.validate(&name("radius"))?;
        self.velocity.validate(&name("velocity"))?;
        self.layer_count.validate_count(&name("layer_count"))?;

        let orbit = &self.orbit;
        orbit.offset.validate(&name("orbit.offset"))?;
        orbit.initial_angle.validate(&name("orbit.initial_angle"))?;
        orbit.empty_range.validate(&name("orbit.empty_range"))?;
        orbit.rotation_angle.validate(&name("orbit.rotation_angle"))?;

        let surface = &self.surface;
        surface.base_roughness.validate(&name("surface.base_roughness"))?;
        surface.roughness.validate(&name("surface.roughness"))?;
        surface.persistence.validate(&name("surface.persistence"))?;
        surface.min_value.validate(&name("surface.min_value"))?;
        surface.strength.validate(&name("surface.strength"))?;
        surface.steps.validate_count(&name("surface.steps"))?;
        validate_probability(&name("surface.mask_probability"), surface.mask_probability)?;
        Ok(())
    }
}

/// A field that is either absent (`None`) or given as a bare value.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial [`OrbitSettings`] read from a settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrbitOverrides {
    #[serde(deserialize_with = "present")]
    offset: Option<Range>,
    #[serde(deserialize_with = "present")]
    initial_angle: Option<Range>,
    #[serde(deserialize_with = "present")]
    empty_range: Option<Range>,
    #[serde(deserialize_with = "present")]
    rotation_angle: Option<Range>,
}

impl OrbitOverrides {
    fn apply(self, base: OrbitSettings) -> OrbitSettings {
        OrbitSettings {
            offset: self.offset.unwrap_or(base.offset),
            initial_angle: self.initial_angle.unwrap_or(base.initial_angle),
            empty_range: self.empty_range.unwrap_or(base.empty_range),
            rotation_angle: self.rotation_angle.unwrap_or(base.rotation_angle),
        }
    }
}

/// Partial [`SurfaceSettings`] read from a settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SurfaceOverrides {
    #[serde(deserialize_with = "present")]
    centre: Option<[f32; 3]>,
    #[serde(deserialize_with = "present")]
    base_roughness: Option<Range>,
    #[serde(deserialize_with = "present")]
    roughness: Option<Range>,
    #[serde(deserialize_with = "present")]
    persistence: Option<Range>,
    #[serde(deserialize_with = "present")]
    min_value: Option<Range>,
    #[serde(deserialize_with = "present")]
    strength: Option<Range>,
    #[serde(deserialize_with = "present")]
    steps: Option<IntRange>,
    #[serde(deserialize_with = "present")]
    mask_probability: Option<f32>,
}

impl SurfaceOverrides {
    fn apply(self, base: SurfaceSettings) -> SurfaceSettings {
        SurfaceSettings {
            centre: self.centre.unwrap_or(base.centre),
            base_roughness: self.base_roughness.unwrap_or(base.base_roughness),
            roughness: self.roughness.unwrap_or(base.roughness),
            persistence: self.persistence.unwrap_or(base.persistence),
            min_value: self.min_value.unwrap_or(base.min_value),
            strength: self.strength.unwrap_or(base.strength),
            steps: self.steps.unwrap_or(base.steps),
            mask_probability: self.mask_probability.unwrap_or(base.mask_probability),
        }
    }
}

/// Partial [`ClassSettings`]: attributes left out keep the class's built-in value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClassOverrides {
    #[serde(deserialize_with = "present")]
    existence_probability: Option<f32>,
    #[serde(deserialize_with = "present")]
    radius: Option<Range>,
    #[serde(deserialize_with = "present")]
    velocity: Option<Range>,
    #[serde(deserialize_with = "present")]
    layer_count: Option<IntRange>,
    orbit: OrbitOverrides,
    surface: SurfaceOverrides,
}

impl ClassOverrides {
    fn apply(self, base: ClassSettings) -> ClassSettings {
        ClassSettings {
            existence_probability: self.existence_probability.unwrap_or(base.existence_probability),
            radius: self.radius.unwrap_or(base.radius),
            velocity: self.velocity.unwrap_or(base.velocity),
            layer_count: self.layer_count.unwrap_or(base.layer_count),
            orbit: self.orbit.apply(base.orbit),
            surface: self.surface.apply(base.surface),
        }
    }
}

fn star_class<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<ClassSettings, D::Error> {
    ClassOverrides::deserialize(deserializer).map(|o| o.apply(ClassSettings::star()))
}

fn planet_class<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<ClassSettings, D::Error> {
    ClassOverrides::deserialize(deserializer).map(|o| o.apply(ClassSettings::planet()))
}

fn asteroid_class<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<ClassSettings, D::Error> {
    ClassOverrides::deserialize(deserializer).map(|o| o.apply(ClassSettings::asteroid()))
}

/// Full settings table for a system. Any field, nested class attributes included, may be
/// left out of a settings file and falls back to the built-in table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default = "ClassSettings::star", deserialize_with = "star_class")]
    pub star: ClassSettings,
    #[serde(default = "ClassSettings::planet", deserialize_with = "planet_class")]
    pub planet: ClassSettings,
    #[serde(default = "ClassSettings::asteroid", deserialize_with = "asteroid_class")]
    pub asteroid: ClassSettings,
    /// Candidate planet ids tried per system; each exists with `planet.existence_probability`.
    #[serde(default = "default_planet_slots")]
    pub planet_slots: usize,
    #[serde(default = "default_asteroid_count")]
    pub asteroid_count: usize,
    /// Asteroids are small on screen, so they get a coarser mesh than planets.
    #[serde(default = "default_asteroid_resolution")]
    pub asteroid_resolution: u32,
    #[serde(default)]
    pub layer_blend: LayerBlend,
}

fn default_planet_slots() -> usize {
    24
}
fn default_asteroid_count() -> usize {
    40
}
fn default_asteroid_resolution() -> u32 {
    12
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            star: ClassSettings::star(),
            planet: ClassSettings::planet(),
            asteroid: ClassSettings::asteroid(),
            planet_slots: default_planet_slots(),
            asteroid_count: default_asteroid_count(),
            asteroid_resolution: default_asteroid_resolution(),
            layer_blend: LayerBlend::default(),
        }
    }
}

impl SystemSettings {
    pub fn validate(&self) -> Result<()> {
        self.star.validate("star")?;
        self.planet.validate("planet")?;
        self.asteroid.validate("asteroid")?;
        if self.asteroid_resolution < 2 {
            return Err(GenerationError::InvalidResolution(self.asteroid_resolution));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SystemSettings::default().validate().unwrap();
    }

    #[test]
    fn range_lerp_endpoints() {
        let r = Range::new(2.0, 6.0);
        assert_eq!(r.lerp(0.0), 2.0);
        assert_eq!(r.lerp(1.0), 6.0);
        assert_eq!(r.lerp(0.5), 4.0);
    }

    #[test]
    fn int_range_rounds() {
        let r = IntRange::new(2, 4);
        assert_eq!(r.lerp(0.0), 2);
        assert_eq!(r.lerp(0.24), 2);
        assert_eq!(r.lerp(0.26), 3);
        assert_eq!(r.lerp(1.0), 4);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut settings = SystemSettings::default();
        settings.planet.radius = Range::new(0.5, 0.1);
        match settings.validate() {
            Err(GenerationError::InvalidRange { attribute, .. }) => assert_eq!(attribute, "planet.radius"),
            other => panic!("expected InvalidRange, got {:?}", other),
        }
    }

    #[test]
    fn zero_layers_are_rejected() {
        let mut settings = SystemSettings::default();
        settings.asteroid.layer_count = IntRange::new(0, 2);
        assert!(matches!(
            settings.validate(),
            Err(GenerationError::NonPositiveCount { .. })
        ));
    }

    #[test]
    fn probability_above_one_is_rejected() {
        let mut settings = SystemSettings::default();
        settings.star.existence_probability = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(GenerationError::InvalidProbability { .. })
        ));
    }
}
