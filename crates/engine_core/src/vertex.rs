//! Vertex layout for generated body meshes.

use bytemuck::{Pod, Zeroable};

/// Standard vertex with position, normal, color, and UV coordinates.
///
/// `#[repr(C)]` and `Pod` so a renderer can upload `&[Vertex]` with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn with_color(position: [f32; 3], normal: [f32; 3], color: [f32; 4], uv: [f32; 2]) -> Self {
        Self { position, normal, color, uv }
    }
}
