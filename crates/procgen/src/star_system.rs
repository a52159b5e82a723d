//! Star system assembly: one star, an outward chain of planets, and an asteroid belt.
//!
//! Every body id is derived from the root seed text, so the whole system (meshes included)
//! is a pure function of the root seed and the settings table.

use glam::Vec3;
use rayon::prelude::*;

use crate::body::{BodyClass, BodyConfiguration, BodyRole, ConfigurationBuilder};
use crate::error::Result;
use crate::orbit::world_position;
use crate::seed::{derive_seed, Seed};
use crate::settings::SystemSettings;
use crate::sphere_mesh::{Mesh, MeshBuilder};

pub const SYSTEM_CODE: &str = "SY-";
pub const STAR_CODE: &str = "S-";
pub const PLANET_CODE: &str = "P-";
pub const ASTEROID_CODE: &str = "A-";

/// A body together with its generated mesh.
#[derive(Debug, Clone)]
pub struct BodyMesh {
    pub role: BodyRole,
    pub body: BodyConfiguration,
    pub position: Vec3,
    pub mesh: Mesh,
}

/// A complete star system.
#[derive(Debug, Clone)]
pub struct StarSystem {
    pub name: String,
    pub seed: Seed,
    pub star: BodyConfiguration,
    /// Every planet slot in order, including slots whose body does not exist.
    pub planets: Vec<BodyConfiguration>,
    pub asteroids: Vec<BodyConfiguration>,
    /// Index into `planets` of the first existing planet.
    pub homeworld: Option<usize>,
    settings: SystemSettings,
}

impl StarSystem {
    /// Validate `settings` and generate the system for `root`.
    pub fn generate(root: &str, settings: SystemSettings) -> Result<Self> {
        let builder = ConfigurationBuilder::new(settings)?;
        Ok(Self::generate_with(&builder, root))
    }

    pub fn generate_with(builder: &ConfigurationBuilder, root: &str) -> Self {
        let settings = builder.settings();
        let name = format!("{SYSTEM_CODE}{root}");
        let star_position = Vec3::ZERO;

        let star = builder.build_body(&format!("{root}-{STAR_CODE}0"), 0.0, star_position, BodyClass::Star);

        // Planets chain outward from the star's surface; missing planets leave no gap.
        let mut parent_orbit = star.radius;
        let mut homeworld = None;
        let mut planets = Vec::with_capacity(settings.planet_slots);
        for i in 0..settings.planet_slots {
            let planet = builder.build_body(
                &format!("{root}-{PLANET_CODE}{i}"),
                parent_orbit,
                star_position,
                BodyClass::Planet,
            );
            if planet.exists {
                parent_orbit = planet.orbit_radius;
                homeworld.get_or_insert(i);
            }
            planets.push(planet);
        }

        let belt_base = parent_orbit;
        let asteroids: Vec<BodyConfiguration> = (0..settings.asteroid_count)
            .map(|i| {
                builder.build_body(
                    &format!("{root}-{ASTEROID_CODE}{i}"),
                    belt_base,
                    star_position,
                    BodyClass::Asteroid,
                )
            })
            .collect();

        let system = Self {
            seed: derive_seed(root),
            name,
            star,
            planets,
            asteroids,
            homeworld,
            settings: settings.clone(),
        };
        log::info!(
            "Generated {}: {} planets, {} asteroids, belt at {:.3}",
            system.name,
            system.existing_planets().count(),
            system.asteroids.iter().filter(|a| a.exists).count(),
            belt_base
        );
        system
    }

    pub fn settings(&self) -> &SystemSettings {
        &self.settings
    }

    pub fn existing_planets(&self) -> impl Iterator<Item = &BodyConfiguration> {
        self.planets.iter().filter(|p| p.exists)
    }

    /// Render role of the planet in slot `index`.
    pub fn planet_role(&self, index: usize) -> BodyRole {
        if self.homeworld == Some(index) {
            BodyRole::Homeworld
        } else {
            BodyRole::Planet
        }
    }

    /// Every existing body with its role: star first, then planets, then asteroids.
    pub fn bodies(&self) -> Vec<(BodyRole, &BodyConfiguration)> {
        let mut out = Vec::with_capacity(1 + self.planets.len() + self.asteroids.len());
        if self.star.exists {
            out.push((BodyRole::Star, &self.star));
        }
        out.extend(
            self.planets
                .iter()
                .enumerate()
                .filter(|(_, p)| p.exists)
                .map(|(i, p)| (self.planet_role(i), p)),
        );
        out.extend(
            self.asteroids
                .iter()
                .filter(|a| a.exists)
                .map(|a| (BodyRole::Asteroid, a)),
        );
        out
    }

    /// World position of a body at time zero. The star sits at its own star position.
    pub fn position_of(role: BodyRole, body: &BodyConfiguration) -> Vec3 {
        match role {
            BodyRole::Star => body.star_position,
            _ => world_position(body),
        }
    }

    /// Radius of the outermost existing planet orbit, or the star radius if there are none.
    pub fn outer_orbit(&self) -> f32 {
        self.existing_planets()
            .map(|p| p.orbit_radius)
            .fold(self.star.radius, f32::max)
    }

    /// Build meshes for every existing body in parallel. Asteroids use the coarser
    /// `asteroid_resolution` from the settings.
    pub fn meshes(&self, resolution: u32) -> Result<Vec<BodyMesh>> {
        let blend = self.settings.layer_blend;
        let body_builder = MeshBuilder::new(resolution)?.with_layer_blend(blend);
        let asteroid_builder = MeshBuilder::new(self.settings.asteroid_resolution)?.with_layer_blend(blend);

        Ok(self
            .bodies()
            .into_par_iter()
            .map(|(role, body)| {
                let builder = if role == BodyRole::Asteroid {
                    &asteroid_builder
                } else {
                    &body_builder
                };
                BodyMesh {
                    role,
                    body: body.clone(),
                    position: Self::position_of(role, body),
                    mesh: builder.build(body, role),
                }
            })
            .collect())
    }
}
