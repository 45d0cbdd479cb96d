use bytemuck::{Pod, Zeroable};

/// Vertex format for the cube: position plus an RGBA color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl CubeVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // color
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

const POSITIONS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

const COLORS: [[f32; 4]; 8] = [
    [0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, 1.0],
];

/// Two triangles per face, clockwise when seen from outside.
const INDICES: [u16; 36] = [
    0, 4, 5, 0, 5, 1, //
    1, 5, 6, 1, 6, 2, //
    2, 6, 7, 2, 7, 3, //
    3, 7, 4, 3, 4, 0, //
    4, 7, 6, 4, 6, 5, //
    3, 0, 1, 3, 1, 2,
];

/// The static cube drawn every frame: 8 colored corners, 12 triangles.
#[derive(Debug, Clone)]
pub struct CubeMesh {
    pub vertices: [CubeVertex; 8],
    pub indices: [u16; 36],
}

impl CubeMesh {
    pub fn new() -> Self {
        Self {
            vertices: std::array::from_fn(|i| CubeVertex {
                position: POSITIONS[i],
                color: COLORS[i],
            }),
            indices: INDICES,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

impl Default for CubeMesh {
    fn default() -> Self {
        Self::new()
    }
}
