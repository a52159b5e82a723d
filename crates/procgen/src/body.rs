//! Body configuration: every orbital and surface parameter of a star, planet, or asteroid,
//! derived from its id.
//!
//! **Seed-based replayability:** `build_body` is a pure function of its arguments. Each
//! attribute reads a fixed probability slot, so the same id always yields a bit-identical
//! configuration.
//!
//! Slot layout of the id seed `p`: `p[0]` existence, `p[1]` radius, `p[2]` velocity,
//! `p[3]` orbit offset, `p[4]` initial angle, `p[5]` empty range, `p[6..8]` orbit axis x/y.
//! The seed derived from the id seed's last 8 characters gives `q[0]` axis z, `q[1]` orbit
//! angle, `q[2]` layer count. Layer `n` reads the n-th re-hash of the id seed.

use std::fmt;

use glam::Vec3;

use crate::error::Result;
use crate::seed::{derive_seed, Seed};
use crate::settings::{ClassSettings, SurfaceSettings, SystemSettings};

const AXIS_SEED_CHARS: usize = 8;

/// How a body is rendered; selects its color gradient and normal orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRole {
    /// Lit from inside: normals point inward.
    Star,
    /// A planet with a palette drawn from its own seed.
    Planet,
    /// The designated home planet with a curated terran palette.
    Homeworld,
    Asteroid,
}

/// Which settings table a body is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyClass {
    Star,
    Planet,
    Asteroid,
}

/// One octave group of fractal displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLayerConfig {
    /// Frequency of the first octave.
    pub base_roughness: f32,
    /// Frequency multiplier per octave.
    pub roughness: f32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Noise below this value is flattened to zero.
    pub min_value: f32,
    pub strength: f32,
    /// Number of octaves.
    pub steps: u32,
    pub centre: Vec3,
    /// Multiply this layer by the first layer's value.
    pub use_as_mask: bool,
}

/// Full descriptor of one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyConfiguration {
    pub id: String,
    pub seed: Seed,
    pub exists: bool,
    pub radius: f32,
    /// Angular speed in radians per time unit.
    pub velocity: f32,
    pub orbit_offset: f32,
    /// Radians.
    pub orbit_initial_angle: f32,
    /// Gap kept between this body and the previous orbit.
    pub orbit_empty_range: f32,
    pub orbit_axis: Vec3,
    /// Degrees.
    pub orbit_angle: f32,
    /// Distance from the star centre: parent orbit + empty range + radius.
    pub orbit_radius: f32,
    pub star_position: Vec3,
    pub layers: Vec<SurfaceLayerConfig>,
}

impl fmt::Display for BodyConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Body {}", self.id)?;
        writeln!(f, "  seed:           {}", self.seed)?;
        writeln!(f, "  exists:         {}", self.exists)?;
        writeln!(f, "  radius:         {:.4}", self.radius)?;
        writeln!(f, "  velocity:       {:.3e}", self.velocity)?;
        writeln!(f, "  orbit radius:   {:.4}", self.orbit_radius)?;
        writeln!(f, "  orbit offset:   {:.4}", self.orbit_offset)?;
        writeln!(f, "  initial angle:  {:.4} rad", self.orbit_initial_angle)?;
        writeln!(f, "  empty range:    {:.4}", self.orbit_empty_range)?;
        writeln!(
            f,
            "  orbit axis:     ({:.3}, {:.3}, {:.3})",
            self.orbit_axis.x, self.orbit_axis.y, self.orbit_axis.z
        )?;
        writeln!(f, "  orbit angle:    {:.2} deg", self.orbit_angle)?;
        writeln!(f, "  layers:         {}", self.layers.len())?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "    [{}] base {:.3} rough {:.3} persist {:.3} min {:.3} strength {:.3} steps {}{}",
                i,
                layer.base_roughness,
                layer.roughness,
                layer.persistence,
                layer.min_value,
                layer.strength,
                layer.steps,
                if layer.use_as_mask { " (masked)" } else { "" }
            )?;
        }
        Ok(())
    }
}

/// Builds body configurations from a validated [`SystemSettings`] table.
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    settings: SystemSettings,
}

impl ConfigurationBuilder {
    /// Validate `settings` once so every later `build_body` call is infallible.
    pub fn new(settings: SystemSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SystemSettings {
        &self.settings
    }

    pub fn class_settings(&self, class: BodyClass) -> &ClassSettings {
        match class {
            BodyClass::Star => &self.settings.star,
            BodyClass::Planet => &self.settings.planet,
            BodyClass::Asteroid => &self.settings.asteroid,
        }
    }

    pub fn build_body(
        &self,
        id: &str,
        parent_orbit_radius: f32,
        star_position: Vec3,
        class: BodyClass,
    ) -> BodyConfiguration {
        configure(id, parent_orbit_radius, star_position, self.class_settings(class))
    }
}

/// Build one body against an unvalidated class table.
pub fn build_body(
    id: &str,
    parent_orbit_radius: f32,
    star_position: Vec3,
    class_settings: &ClassSettings,
) -> Result<BodyConfiguration> {
    class_settings.validate("class")?;
    Ok(configure(id, parent_orbit_radius, star_position, class_settings))
}

fn configure(
    id: &str,
    parent_orbit_radius: f32,
    star_position: Vec3,
    settings: &ClassSettings,
) -> BodyConfiguration {
    let seed = derive_seed(id);
    let p = seed.probabilities();

    let exists = settings.existence_probability >= 1.0 || p[0] < settings.existence_probability;
    let radius = settings.radius.lerp(p[1]);
    let velocity = settings.velocity.lerp(p[2]);
    let orbit_offset = settings.orbit.offset.lerp(p[3]);
    let orbit_initial_angle = settings.orbit.initial_angle.lerp(p[4]);
    let orbit_empty_range = settings.orbit.empty_range.lerp(p[5]);

    let q = derive_seed(seed.tail(AXIS_SEED_CHARS)).probabilities();
    let orbit_axis = Vec3::new(p[6], p[7], q[0]);
    let orbit_angle = settings.orbit.rotation_angle.lerp(q[1]);
    let layer_count = settings.layer_count.lerp(q[2]).max(1) as usize;

    let layers = surface_layers(&seed, layer_count, &settings.surface);

    BodyConfiguration {
        id: id.to_string(),
        seed,
        exists,
        radius,
        velocity,
        orbit_offset,
        orbit_initial_angle,
        orbit_empty_range,
        orbit_axis,
        orbit_angle,
        orbit_radius: parent_orbit_radius + orbit_empty_range + radius,
        star_position,
        layers,
    }
}

fn surface_layers(seed: &Seed, count: usize, surface: &SurfaceSettings) -> Vec<SurfaceLayerConfig> {
    let mut layers = Vec::with_capacity(count);
    let mut layer_seed = seed.clone();
    for index in 0..count {
        layer_seed = layer_seed.rehash();
        let r = layer_seed.probabilities();
        layers.push(SurfaceLayerConfig {
            base_roughness: surface.base_roughness.lerp(r[0]),
            roughness: surface.roughness.lerp(r[1]),
            persistence: surface.persistence.lerp(r[2]),
            min_value: surface.min_value.lerp(r[3]),
            strength: surface.strength.lerp(r[4]),
            steps: surface.steps.lerp(r[5]).max(1) as u32,
            centre: surface.centre(),
            use_as_mask: index > 0 && r[6] < surface.mask_probability,
        });
    }
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Range;

    fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new(SystemSettings::default()).unwrap()
    }

    #[test]
    fn build_body_is_bit_identical() {
        let b = builder();
        let star = Vec3::new(1.0, -2.0, 0.5);
        let a = b.build_body("test-P-4", 3.25, star, BodyClass::Planet);
        let c = b.build_body("test-P-4", 3.25, star, BodyClass::Planet);
        assert_eq!(a, c);
        assert_eq!(a.radius.to_bits(), c.radius.to_bits());
        assert_eq!(a.orbit_radius.to_bits(), c.orbit_radius.to_bits());
    }

    #[test]
    fn attributes_stay_within_ranges() {
        let b = builder();
        let s = &b.settings().planet;
        for i in 0..50 {
            let body = b.build_body(&format!("P-{i}"), 0.0, Vec3::ZERO, BodyClass::Planet);
            assert!(body.radius >= s.radius.min && body.radius <= s.radius.max);
            assert!(body.velocity >= s.velocity.min && body.velocity <= s.velocity.max);
            assert!(body.orbit_empty_range >= s.orbit.empty_range.min);
            assert!(body.orbit_empty_range <= s.orbit.empty_range.max);
            let n = body.layers.len() as i32;
            assert!(n >= s.layer_count.min && n <= s.layer_count.max);
            for layer in &body.layers {
                let steps = layer.steps as i32;
                assert!(steps >= s.surface.steps.min && steps <= s.surface.steps.max);
            }
        }
    }

    #[test]
    fn slot_order_matches_seed_probabilities() {
        let b = builder();
        let s = &b.settings().planet;
        let body = b.build_body("slot-check", 0.0, Vec3::ZERO, BodyClass::Planet);
        let p = derive_seed("slot-check").probabilities();
        assert_eq!(body.radius, s.radius.lerp(p[1]));
        assert_eq!(body.velocity, s.velocity.lerp(p[2]));
        assert_eq!(body.orbit_offset, s.orbit.offset.lerp(p[3]));
        assert_eq!(body.orbit_initial_angle, s.orbit.initial_angle.lerp(p[4]));
        assert_eq!(body.orbit_empty_range, s.orbit.empty_range.lerp(p[5]));
        assert_eq!(body.orbit_axis.x, p[6]);
        assert_eq!(body.orbit_axis.y, p[7]);
        assert_eq!(body.exists, p[0] < s.existence_probability);
    }

    #[test]
    fn orbit_radius_leaves_empty_range() {
        let b = builder();
        let body = b.build_body("P-orbit", 2.0, Vec3::ZERO, BodyClass::Planet);
        assert_eq!(body.orbit_radius, 2.0 + body.orbit_empty_range + body.radius);
    }

    #[test]
    fn outward_chain_never_overlaps() {
        let b = builder();
        let mut previous = 1.2;
        for i in 0..30 {
            let body = b.build_body(&format!("chain/P-{i}"), previous, Vec3::ZERO, BodyClass::Planet);
            assert!(body.orbit_radius >= previous + body.orbit_empty_range + body.radius);
            previous = body.orbit_radius;
        }
    }

    #[test]
    fn first_layer_never_masks() {
        let b = builder();
        for i in 0..20 {
            let body = b.build_body(&format!("mask/{i}"), 0.0, Vec3::ZERO, BodyClass::Planet);
            assert!(!body.layers.is_empty());
            assert!(!body.layers[0].use_as_mask);
        }
    }

    #[test]
    fn planet_mask_probability_one_masks_later_layers() {
        // r[6] is at most 1.0, so only an all-f chunk escapes a mask probability of 1.0.
        let b = builder();
        let body = b.build_body("masked", 0.0, Vec3::ZERO, BodyClass::Planet);
        let masked = body.layers.iter().skip(1).filter(|l| l.use_as_mask).count();
        assert_eq!(masked, body.layers.len() - 1);
    }

    #[test]
    fn certain_existence_always_exists() {
        let b = builder();
        for key in ["SUN", "S-0", "", "ffffffff"] {
            assert!(b.build_body(key, 0.0, Vec3::ZERO, BodyClass::Star).exists);
        }
    }

    #[test]
    fn free_build_body_validates() {
        let mut class = ClassSettings::planet();
        assert!(build_body("x", 0.0, Vec3::ZERO, &class).is_ok());
        class.velocity = Range::new(1.0, 0.0);
        assert!(build_body("x", 0.0, Vec3::ZERO, &class).is_err());
    }

    #[test]
    fn display_lists_layers() {
        let body = builder().build_body("SUN", 0.0, Vec3::ZERO, BodyClass::Star);
        let text = body.to_string();
        assert!(text.starts_with("Body SUN"));
        assert!(text.contains("[0] base"));
    }
}
