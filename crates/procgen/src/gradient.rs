//! Elevation color gradients.

use glam::Vec3;
use rand::prelude::*;

use crate::body::BodyRole;
use crate::error::{GenerationError, Result};
use crate::seed::Seed;

/// Stop fractions of a generated planet palette.
pub const PLANET_STOP_FRACTIONS: [f32; 5] = [0.2, 0.3, 0.5, 0.8, 1.0];

const STAR_STOPS: [(f32, [f32; 3]); 4] = [
    (0.0, [0.85, 0.25, 0.02]),
    (0.35, [1.0, 0.55, 0.08]),
    (0.75, [1.0, 0.85, 0.35]),
    (1.0, [1.0, 0.98, 0.85]),
];

const ASTEROID_STOPS: [(f32, [f32; 3]); 3] = [
    (0.0, [0.18, 0.16, 0.15]),
    (0.6, [0.38, 0.34, 0.30]),
    (1.0, [0.55, 0.52, 0.48]),
];

// Deep ocean, shallows, beach, grass, forest, rock, snow.
const HOMEWORLD_STOPS: [(f32, [f32; 3]); 7] = [
    (0.0, [0.02, 0.08, 0.30]),
    (0.25, [0.05, 0.30, 0.60]),
    (0.3, [0.82, 0.76, 0.52]),
    (0.4, [0.22, 0.55, 0.18]),
    (0.65, [0.10, 0.35, 0.12]),
    (0.85, [0.42, 0.36, 0.30]),
    (1.0, [0.95, 0.95, 0.97]),
];

/// An (elevation fraction, color) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub fraction: f32,
    pub color: Vec3,
}

impl GradientStop {
    pub fn new(fraction: f32, color: Vec3) -> Self {
        Self { fraction, color }
    }
}

/// Piecewise-linear color lookup over normalized elevation. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Build a gradient; stops are sorted by fraction. Every fraction must lie in [0, 1].
    pub fn new(mut stops: Vec<GradientStop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(GenerationError::EmptyGradient);
        }
        if let Some(bad) = stops.iter().find(|s| !(0.0..=1.0).contains(&s.fraction)) {
            return Err(GenerationError::InvalidStopFraction(bad.fraction));
        }
        stops.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
        Ok(Self { stops })
    }

    fn from_table(table: &[(f32, [f32; 3])]) -> Self {
        Self {
            stops: table
                .iter()
                .map(|&(fraction, rgb)| GradientStop::new(fraction, Vec3::from_array(rgb)))
                .collect(),
        }
    }

    pub fn star() -> Self {
        Self::from_table(&STAR_STOPS)
    }

    pub fn asteroid() -> Self {
        Self::from_table(&ASTEROID_STOPS)
    }

    pub fn homeworld() -> Self {
        Self::from_table(&HOMEWORLD_STOPS)
    }

    /// Five random colors at [`PLANET_STOP_FRACTIONS`], drawn from an RNG seeded by `seed`.
    pub fn random_planet(seed: &Seed) -> Self {
        let mut rng = StdRng::seed_from_u64(seed.rng_seed());
        Self {
            stops: PLANET_STOP_FRACTIONS
                .iter()
                .map(|&fraction| {
                    let color = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
                    GradientStop::new(fraction, color)
                })
                .collect(),
        }
    }

    pub fn for_role(role: BodyRole, seed: &Seed) -> Self {
        match role {
            BodyRole::Star => Self::star(),
            BodyRole::Asteroid => Self::asteroid(),
            BodyRole::Homeworld => Self::homeworld(),
            BodyRole::Planet => Self::random_planet(seed),
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color at `t`; clamps to the end stops outside their fractions.
    pub fn evaluate(&self, t: f32) -> Vec3 {
        let first = self.stops[0];
        if t <= first.fraction {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.fraction {
                let span = b.fraction - a.fraction;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.fraction) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}
