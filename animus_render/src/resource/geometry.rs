/// Geometry: vertex layout, arena regions and a draw-call descriptor.
///
/// Geometry is plain data. Vertex and index bytes live in the graph's
/// `GeometryArena`; a `Geometry` only remembers where.

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::graphics_device::{BufferRegion, GraphicsDevice};
use crate::resource::buffer_arena::GeometryArena;

/// Interleaved vertex: position, normal, uv
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }
}

/// One named float attribute of the vertex layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Number of f32 components
    pub components: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// aPosition (vec3), aNormal (vec3), aUV (vec2)
    pub fn position_normal_uv() -> Self {
        Self {
            attributes: vec![
                VertexAttribute { name: "aPosition", components: 3 },
                VertexAttribute { name: "aNormal", components: 3 },
                VertexAttribute { name: "aUV", components: 2 },
            ],
        }
    }

    /// Bytes per vertex
    pub fn stride(&self) -> u32 {
        self.attributes.iter().map(|a| a.components * 4).sum()
    }

    /// Byte offset of an attribute inside one vertex
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        let mut offset = 0;
        for attribute in &self.attributes {
            if attribute.name == name {
                return Some(offset);
            }
            offset += attribute.components * 4;
        }
        None
    }
}

/// How a geometry is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Arrays { vertex_count: u32 },
    Indexed { index_count: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    name: String,
    layout: VertexLayout,
    vertices: BufferRegion,
    indices: Option<BufferRegion>,
    draw_call: DrawCall,
}

/// Unit square spanning the full [-1, 1] clip range
pub const SQUARE_VERTICES: [Vertex; 4] = [
    Vertex::new([1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
    Vertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
    Vertex::new([-1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    Vertex::new([-1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
];

pub const SQUARE_INDICES: [u16; 6] = [0, 1, 3, 1, 2, 3];

/// 36 vertices of a unit cube centered on the origin, two triangles per face
pub fn cube_vertices() -> Vec<Vertex> {
    // (normal, tangent u, tangent v) per face
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];
    const CORNERS: [(f32, f32); 6] = [
        (0.0, 0.0), (1.0, 0.0), (1.0, 1.0),
        (1.0, 1.0), (0.0, 1.0), (0.0, 0.0),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (n, u, v) in FACES {
        for (cu, cv) in CORNERS {
            let su = cu - 0.5;
            let sv = cv - 0.5;
            let position = [
                n[0] * 0.5 + u[0] * su + v[0] * sv,
                n[1] * 0.5 + u[1] * su + v[1] * sv,
                n[2] * 0.5 + u[2] * su + v[2] * sv,
            ];
            vertices.push(Vertex::new(position, n, [cu, cv]));
        }
    }
    vertices
}

impl Geometry {
    /// Upload vertices (and indices) into the arena
    pub fn upload(
        device: &mut dyn GraphicsDevice,
        arena: &mut GeometryArena,
        name: &str,
        vertices: &[Vertex],
        indices: Option<&[u16]>,
    ) -> Result<Self> {
        if vertices.is_empty() {
            return Err(Error::InvalidResource(format!("geometry '{}' has no vertices", name)));
        }
        let vertex_region = arena.vertices.allocate_pod(device, vertices)?;
        let (index_region, draw_call) = match indices {
            Some(indices) => {
                if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                    return Err(Error::InvalidResource(format!(
                        "geometry '{}' index {} out of range ({} vertices)",
                        name, bad, vertices.len())));
                }
                let region = arena.indices.allocate_pod(device, indices)?;
                (Some(region), DrawCall::Indexed { index_count: indices.len() as u32 })
            }
            None => (None, DrawCall::Arrays { vertex_count: vertices.len() as u32 }),
        };

        Ok(Self {
            name: name.to_string(),
            layout: VertexLayout::position_normal_uv(),
            vertices: vertex_region,
            indices: index_region,
            draw_call,
        })
    }

    /// Indexed full-screen square
    pub fn square(device: &mut dyn GraphicsDevice, arena: &mut GeometryArena) -> Result<Self> {
        Self::upload(device, arena, "SQUARE", &SQUARE_VERTICES, Some(&SQUARE_INDICES))
    }

    /// Non-indexed unit cube
    pub fn cube(device: &mut dyn GraphicsDevice, arena: &mut GeometryArena) -> Result<Self> {
        Self::upload(device, arena, "CUBE", &cube_vertices(), None)
    }

    /// Issue the draw described by `draw_call`
    pub fn draw(&self, device: &mut dyn GraphicsDevice, arena: &GeometryArena) -> Result<()> {
        let vertex_buffer = arena.vertices.buffer()?;
        match (self.draw_call, self.indices) {
            (DrawCall::Arrays { vertex_count }, _) => {
                device.draw_arrays(vertex_buffer, self.vertices, vertex_count)
            }
            (DrawCall::Indexed { index_count }, Some(indices)) => {
                let index_buffer = arena.indices.buffer()?;
                device.draw_indexed(vertex_buffer, self.vertices, index_buffer, indices, index_count)
            }
            (DrawCall::Indexed { .. }, None) => Err(Error::InvalidResource(format!(
                "geometry '{}' is indexed but has no index region", self.name))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertex_region(&self) -> BufferRegion {
        self.vertices
    }

    pub fn index_region(&self) -> Option<BufferRegion> {
        self.indices
    }

    pub fn draw_call(&self) -> DrawCall {
        self.draw_call
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
