use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidSurfaceDimensions { width: u32, height: u32 },
    #[error("renderer used before the surface was created and sized")]
    NotConfigured,
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
