//! starsys: generate a seeded star system and report what the renderer would receive.

mod config;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use engine_core::{TransformRaw, Vertex};
use procgen::{orbit_transform, BodyRole, StarSystem};

#[derive(Parser, Debug)]
#[command(name = "starsys")]
#[command(about = "Generate a star system from a text seed")]
struct Cli {
    /// Root seed text; the same text always yields the same system.
    #[arg(short, long, default_value = "SUN")]
    seed: String,

    /// Grid resolution per cube face for the star and planets.
    #[arg(short, long, default_value_t = 128)]
    resolution: u32,

    /// Settings file (RON). Defaults to ./starsys.ron when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective settings to this path and exit.
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Print every body configuration.
    #[arg(long)]
    dump: bool,

    /// Report body transforms at this time instead of t = 0.
    #[arg(long, default_value_t = 0.0)]
    time: f32,
}

fn role_label(role: BodyRole) -> &'static str {
    match role {
        BodyRole::Star => "star",
        BodyRole::Planet => "planet",
        BodyRole::Homeworld => "homeworld",
        BodyRole::Asteroid => "asteroid",
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = config::load(cli.config.as_deref());

    if let Some(path) = &cli.write_config {
        config::save(&settings, path)?;
        log::info!("Wrote settings to {:?}", path);
        return Ok(());
    }

    log::info!("Generating system from seed {:?}", cli.seed);
    let system = StarSystem::generate(&cli.seed, settings).context("invalid generator settings")?;

    if cli.dump {
        for (_, body) in system.bodies() {
            println!("{}", body);
        }
    }

    let started = Instant::now();
    let meshes = system.meshes(cli.resolution)?;
    let elapsed = started.elapsed();

    let mut vertex_bytes = 0usize;
    let mut total_triangles = 0usize;
    for entry in &meshes {
        let transform = if entry.role == BodyRole::Star {
            engine_core::Transform::from_position(entry.position)
        } else {
            orbit_transform(&entry.body, cli.time)
        };
        let raw = TransformRaw::from(transform);
        vertex_bytes += bytemuck::cast_slice::<Vertex, u8>(&entry.mesh.vertices).len();
        total_triangles += entry.mesh.triangle_count();
        log::info!(
            "{:<10} {:<24} r={:.3} orbit={:.3} pos=({:.2}, {:.2}, {:.2}) verts={} tris={}",
            role_label(entry.role),
            entry.body.id,
            entry.body.radius,
            entry.body.orbit_radius,
            raw.model[3][0],
            raw.model[3][1],
            raw.model[3][2],
            entry.mesh.vertex_count(),
            entry.mesh.triangle_count(),
        );
    }

    log::info!(
        "{}: {} bodies, {} triangles, {:.1} MiB of vertices in {:.2?}",
        system.name,
        meshes.len(),
        total_triangles,
        vertex_bytes as f64 / (1024.0 * 1024.0),
        elapsed
    );

    Ok(())
}
