//! Displaced cube-sphere meshes for stars, planets, and asteroids.
//!
//! A body mesh is six `resolution x resolution` grids projected onto the unit sphere,
//! pushed out radially by layered fractal noise, colored by normalized elevation, and
//! given smooth normals. Displacement runs per vertex on the rayon pool; every build owns
//! its `NoiseField`, so bodies can also be built concurrently.

use engine_core::Vertex;
use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::body::{BodyConfiguration, BodyRole, SurfaceLayerConfig};
use crate::error::{GenerationError, Result};
use crate::gradient::Gradient;
use crate::noise_field::NoiseField;

/// Local "up" of each cube face, in face order.
pub const FACE_DIRECTIONS: [Vec3; 6] = [
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::NEG_X,
    Vec3::X,
    Vec3::Z,
    Vec3::NEG_Z,
];

/// How surface layers combine into one elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerBlend {
    /// Only layer 0 displaces the surface.
    FirstOnly,
    /// Every layer adds; layers flagged `use_as_mask` are scaled by layer 0's value.
    #[default]
    Masked,
}

/// Renderable triangle mesh of one body.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Lowest radial elevation (1.0 = undisplaced unit sphere).
    pub min_elevation: f32,
    pub max_elevation: f32,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Builds body meshes at a fixed grid resolution.
#[derive(Debug, Clone, Copy)]
pub struct MeshBuilder {
    resolution: u32,
    layer_blend: LayerBlend,
}

impl MeshBuilder {
    pub fn new(resolution: u32) -> Result<Self> {
        if resolution < 2 {
            return Err(GenerationError::InvalidResolution(resolution));
        }
        Ok(Self {
            resolution,
            layer_blend: LayerBlend::default(),
        })
    }

    pub fn with_layer_blend(mut self, layer_blend: LayerBlend) -> Self {
        self.layer_blend = layer_blend;
        self
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn build(&self, body: &BodyConfiguration, role: BodyRole) -> Mesh {
        let res = self.resolution as usize;
        let noise = NoiseField::new(body.seed.noise_seed());
        let directions = cube_sphere_directions(res);

        let elevations: Vec<f32> = directions
            .par_iter()
            .map(|&dir| surface_elevation(&noise, &body.layers, dir, self.layer_blend))
            .collect();

        let (min_elevation, max_elevation) = elevations
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &e| (lo.min(e), hi.max(e)));
        let span = max_elevation - min_elevation;

        let gradient = Gradient::for_role(role, &body.seed);
        let uv_scale = 1.0 / (res - 1) as f32;

        let mut vertices: Vec<Vertex> = directions
            .par_iter()
            .zip(elevations.par_iter())
            .enumerate()
            .map(|(i, (&dir, &elevation))| {
                let cell = i % (res * res);
                let uv = [(cell % res) as f32 * uv_scale, (cell / res) as f32 * uv_scale];
                let t = if span > f32::EPSILON {
                    (elevation - min_elevation) / span
                } else {
                    0.0
                };
                let color = gradient.evaluate(t).extend(1.0).to_array();
                let position = (dir * elevation * body.radius).to_array();
                Vertex::with_color(position, [0.0; 3], color, uv)
            })
            .collect();

        let indices = cube_sphere_indices(res);
        accumulate_normals(&mut vertices, &indices, role == BodyRole::Star);

        log::debug!(
            "Mesh for {}: {} vertices, {} triangles, elevation {:.4}..{:.4}",
            body.id,
            vertices.len(),
            indices.len() / 3,
            min_elevation,
            max_elevation
        );

        Mesh {
            vertices,
            indices,
            min_elevation,
            max_elevation,
        }
    }
}

/// Build one body mesh with the default layer blending.
pub fn build_mesh(body: &BodyConfiguration, resolution: u32, role: BodyRole) -> Result<Mesh> {
    Ok(MeshBuilder::new(resolution)?.build(body, role))
}

/// Unit directions of the cube-sphere grid: `6 * res^2` entries, face-major, row-major.
pub fn cube_sphere_directions(res: usize) -> Vec<Vec3> {
    let step = 1.0 / (res.max(2) - 1) as f32;
    let mut out = Vec::with_capacity(6 * res * res);
    for up in FACE_DIRECTIONS {
        let axis_a = Vec3::new(up.y, up.z, up.x);
        let axis_b = up.cross(axis_a);
        for y in 0..res {
            for x in 0..res {
                let u = x as f32 * step * 2.0 - 1.0;
                let v = y as f32 * step * 2.0 - 1.0;
                out.push((up + u * axis_a + v * axis_b).normalize());
            }
        }
    }
    out
}

/// Two triangles per grid cell on each face, wound so that edge cross products point outward.
pub fn cube_sphere_indices(res: usize) -> Vec<u32> {
    let cells = res.saturating_sub(1);
    let mut indices = Vec::with_capacity(FACE_DIRECTIONS.len() * cells * cells * 6);
    for face in 0..FACE_DIRECTIONS.len() {
        let offset = face * res * res;
        for y in 0..cells {
            for x in 0..cells {
                let i = (offset + y * res + x) as u32;
                let r = res as u32;

                indices.push(i);
                indices.push(i + r + 1);
                indices.push(i + r);

                indices.push(i);
                indices.push(i + 1);
                indices.push(i + r + 1);
            }
        }
    }
    indices
}

/// Radial scale of the unit direction `point`: `1 + displacement`.
pub fn surface_elevation(
    noise: &NoiseField,
    layers: &[SurfaceLayerConfig],
    point: Vec3,
    blend: LayerBlend,
) -> f32 {
    let Some((first, rest)) = layers.split_first() else {
        return 1.0;
    };
    let base = layer_value(noise, first, point);
    let mut total = base;
    if blend == LayerBlend::Masked {
        for layer in rest {
            let mask = if layer.use_as_mask { base } else { 1.0 };
            total += layer_value(noise, layer, point) * mask;
        }
    }
    1.0 + total
}

fn layer_value(noise: &NoiseField, layer: &SurfaceLayerConfig, point: Vec3) -> f32 {
    let mut value = 0.0;
    let mut frequency = layer.base_roughness;
    let mut amplitude = 1.0;
    for _ in 0..layer.steps {
        let signal = noise.evaluate(point * frequency + layer.centre);
        value += (signal + 1.0) * 0.5 * amplitude;
        frequency *= layer.roughness;
        amplitude *= layer.persistence;
    }
    (value - layer.min_value).max(0.0) * layer.strength
}

/// Sum unnormalized face normals into each vertex, then normalize. Degenerate vertices keep a
/// zero normal.
fn accumulate_normals(vertices: &mut [Vertex], indices: &[u32], inward: bool) {
    let mut normals = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let pa = Vec3::from_array(vertices[a].position);
        let pb = Vec3::from_array(vertices[b].position);
        let pc = Vec3::from_array(vertices[c].position);
        let n = (pb - pa).cross(pc - pa);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    let sign = if inward { -1.0 } else { 1.0 };
    for (vertex, n) in vertices.iter_mut().zip(normals) {
        vertex.normal = (n.normalize_or_zero() * sign).to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyClass, ConfigurationBuilder};
    use crate::settings::SystemSettings;

    fn body(id: &str, class: BodyClass) -> BodyConfiguration {
        ConfigurationBuilder::new(SystemSettings::default())
            .unwrap()
            .build_body(id, 0.0, Vec3::ZERO, class)
    }

    fn check_validity(mesh: &Mesh, res: usize) {
        assert_eq!(mesh.vertices.len(), 6 * res * res);
        assert_eq!(mesh.indices.len() % 3, 0);
        assert_eq!(mesh.indices.len(), 36 * (res - 1) * (res - 1));
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.normal).length();
            assert!((len - 1.0).abs() < 1e-3, "normal length {}", len);
        }
    }

    #[test]
    fn uvs_span_each_face() {
        let res = 5;
        let mesh = build_mesh(&body("P-uv", BodyClass::Planet), res as u32, BodyRole::Planet).unwrap();
        for face in 0..6 {
            let first = face * res * res;
            let last = first + res * res - 1;
            assert_eq!(mesh.vertices[first].uv, [0.0, 0.0]);
            assert_eq!(mesh.vertices[last].uv, [1.0, 1.0]);
            assert_eq!(mesh.vertices[first + res - 1].uv, [1.0, 0.0]);
            assert_eq!(mesh.vertices[first + 2].uv, [0.5, 0.0]);
        }
    }

    #[test]
    fn rejects_low_resolution() {
        let b = body("P-x", BodyClass::Planet);
        assert_eq!(
            build_mesh(&b, 1, BodyRole::Planet).unwrap_err(),
            GenerationError::InvalidResolution(1)
        );
    }

    #[test]
    fn mesh_validity_across_resolutions() {
        let b = body("P-valid", BodyClass::Planet);
        for res in [2usize, 3, 8, 17] {
            let mesh = build_mesh(&b, res as u32, BodyRole::Planet).unwrap();
            check_validity(&mesh, res);
        }
    }

    #[test]
    fn directions_are_unit_length() {
        for d in cube_sphere_directions(9) {
            assert!((d.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn face_corners_meet_cube_corners() {
        let res = 5;
        let dirs = cube_sphere_directions(res);
        let corner = Vec3::ONE.normalize();
        let hits = dirs.iter().filter(|d| (**d - corner).length() < 1e-5).count();
        assert_eq!(hits, 3);
    }

    #[test]
    fn planet_normals_point_outward() {
        let b = body("P-out", BodyClass::Planet);
        let mesh = build_mesh(&b, 12, BodyRole::Planet).unwrap();
        let outward = mesh
            .vertices
            .iter()
            .filter(|v| Vec3::from_array(v.normal).dot(Vec3::from_array(v.position)) > 0.0)
            .count();
        assert!(outward * 10 > mesh.vertices.len() * 9);
    }

    #[test]
    fn star_normals_are_inverted() {
        let b = body("SUN", BodyClass::Star);
        let star = build_mesh(&b, 10, BodyRole::Star).unwrap();
        let lit = build_mesh(&b, 10, BodyRole::Planet).unwrap();
        check_validity(&star, 10);
        for (s, p) in star.vertices.iter().zip(&lit.vertices) {
            assert_eq!(s.position, p.position);
            assert_eq!(Vec3::from_array(s.normal), -Vec3::from_array(p.normal));
        }
    }

    #[test]
    fn vertices_stay_on_displaced_shell() {
        let b = body("P-shell", BodyClass::Planet);
        let mesh = build_mesh(&b, 16, BodyRole::Planet).unwrap();
        assert!(mesh.min_elevation >= 1.0);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length() / b.radius;
            assert!(r >= mesh.min_elevation - 1e-4 && r <= mesh.max_elevation + 1e-4);
        }
    }

    #[test]
    fn build_is_deterministic() {
        let b = body("P-det", BodyClass::Planet);
        let a = build_mesh(&b, 10, BodyRole::Planet).unwrap();
        let c = build_mesh(&b, 10, BodyRole::Planet).unwrap();
        assert_eq!(a.vertices, c.vertices);
        assert_eq!(a.indices, c.indices);
    }

    #[test]
    fn first_only_ignores_later_layers() {
        let mut b = body("P-layers", BodyClass::Planet);
        let first_only = MeshBuilder::new(8)
            .unwrap()
            .with_layer_blend(LayerBlend::FirstOnly)
            .build(&b, BodyRole::Planet);
        b.layers.truncate(1);
        let single = MeshBuilder::new(8).unwrap().build(&b, BodyRole::Planet);
        assert_eq!(first_only.vertices, single.vertices);
    }

    #[test]
    fn layer_value_floors_at_zero() {
        let layer = SurfaceLayerConfig {
            base_roughness: 1.0,
            roughness: 2.0,
            persistence: 0.5,
            min_value: 10.0,
            strength: 1.0,
            steps: 3,
            centre: Vec3::ZERO,
            use_as_mask: false,
        };
        let noise = NoiseField::new(3);
        assert_eq!(surface_elevation(&noise, &[layer], Vec3::X, LayerBlend::Masked), 1.0);
        assert_eq!(surface_elevation(&noise, &[], Vec3::X, LayerBlend::Masked), 1.0);
    }

    #[test]
    fn flat_surface_uses_first_gradient_stop() {
        let mut b = body("P-flat", BodyClass::Planet);
        for layer in &mut b.layers {
            layer.strength = 0.0;
        }
        let mesh = build_mesh(&b, 4, BodyRole::Homeworld).unwrap();
        let expected = Gradient::homeworld().evaluate(0.0).extend(1.0).to_array();
        assert!(mesh.vertices.iter().all(|v| v.color == expected));
    }
}
