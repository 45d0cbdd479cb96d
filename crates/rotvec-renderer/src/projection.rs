use crate::error::RenderError;
use glam::{Mat4, Vec4};

/// Symmetric perspective frustum, bounds given at the near plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Frustum for a surface of the given size: horizontal bounds scale with
    /// the aspect ratio, vertical bounds are `±half_height`.
    pub fn for_surface(
        width: u32,
        height: u32,
        half_height: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSurfaceDimensions { width, height });
        }
        let ratio = width as f32 / height as f32;
        Ok(Self {
            left: -ratio * half_height,
            right: ratio * half_height,
            bottom: -half_height,
            top: half_height,
            near,
            far,
        })
    }

    /// Right-handed projection into wgpu clip space (depth 0..1).
    pub fn matrix(&self) -> Mat4 {
        let Self {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;

        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * n / (t - b), 0.0, 0.0),
            Vec4::new((r + l) / (r - l), (t + b) / (t - b), f / (n - f), -1.0),
            Vec4::new(0.0, 0.0, n * f / (n - f), 0.0),
        )
    }
}
