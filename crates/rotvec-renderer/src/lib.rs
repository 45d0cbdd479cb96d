pub mod error;
pub mod frame;
pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod projection;

pub use error::RenderError;
pub use frame::{FramePacket, FrameRenderer, RenderBackend};
pub use gpu::GpuBackend;
pub use mesh::{CubeMesh, CubeVertex};
pub use projection::Frustum;
