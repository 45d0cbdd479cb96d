use crate::error::RenderError;
use crate::mesh::CubeMesh;
use crate::projection::Frustum;
use glam::{Mat4, Vec3};
use rotvec_config::RenderConfig;

/// Everything a backend needs to produce one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePacket {
    pub clear_color: [f32; 4],
    pub model_view: Mat4,
    pub projection: Mat4,
    pub index_count: u32,
}

/// A graphics backend that can draw the cube mesh with a given transform.
///
/// Backends are expected to draw with back-face culling, clockwise front
/// faces and per-vertex color interpolation.
pub trait RenderBackend {
    /// Surface is ready: set the clear color and upload the mesh.
    fn prepare(&mut self, clear_color: [f32; 4], mesh: &CubeMesh) -> Result<(), RenderError>;
    /// Surface changed size.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;
    /// Clear, then draw the uploaded mesh with the packet's transforms.
    fn draw(&mut self, frame: &FramePacket) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RendererState {
    Created,
    Configured,
}

/// Sequences surface callbacks into backend calls.
///
/// Holds no orientation of its own: every frame is built from the rotation
/// handed to `on_draw_frame`.
pub struct FrameRenderer {
    mesh: CubeMesh,
    state: RendererState,
    frustum: Option<Frustum>,
    clear_color: [f32; 4],
    camera_distance: f32,
    half_height: f32,
    near: f32,
    far: f32,
    frame_count: u64,
}

impl FrameRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            mesh: CubeMesh::new(),
            state: RendererState::Created,
            frustum: None,
            clear_color: config.clear_color,
            camera_distance: config.camera_distance,
            half_height: config.half_height,
            near: config.near,
            far: config.far,
            frame_count: 0,
        }
    }

    pub fn frustum(&self) -> Option<Frustum> {
        self.frustum
    }

    pub fn is_configured(&self) -> bool {
        self.state == RendererState::Configured
    }

    /// One-time surface setup. wgpu never dithers its output, so only the
    /// clear color and mesh need to reach the backend.
    pub fn on_surface_created<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), RenderError> {
        backend.prepare(self.clear_color, &self.mesh)?;
        self.state = RendererState::Configured;
        tracing::info!(clear_color = ?self.clear_color, "Surface created");
        Ok(())
    }

    /// Recompute the projection for a new surface size.
    ///
    /// A zero-sized surface keeps the previous projection.
    pub fn on_surface_resized<B: RenderBackend>(
        &mut self,
        width: u32,
        height: u32,
        backend: &mut B,
    ) -> Result<(), RenderError> {
        if !self.is_configured() {
            return Err(RenderError::NotConfigured);
        }

        let frustum = Frustum::for_surface(width, height, self.half_height, self.near, self.far)?;
        backend.resize(width, height)?;
        self.frustum = Some(frustum);
        tracing::debug!(width, height, left = frustum.left, right = frustum.right, "Projection updated");
        Ok(())
    }

    /// Model-view transform: push the cube back along the view axis, then
    /// apply the device rotation.
    pub fn model_view(&self, rotation: Mat4) -> Mat4 {
        Mat4::IDENTITY * Mat4::from_translation(Vec3::new(0.0, 0.0, -self.camera_distance)) * rotation
    }

    /// Draw one frame with the given rotation.
    pub fn on_draw_frame<B: RenderBackend>(
        &mut self,
        rotation: Mat4,
        backend: &mut B,
    ) -> Result<FramePacket, RenderError> {
        let frustum = match (self.state, self.frustum) {
            (RendererState::Configured, Some(frustum)) => frustum,
            _ => return Err(RenderError::NotConfigured),
        };

        let packet = FramePacket {
            clear_color: self.clear_color,
            model_view: self.model_view(rotation),
            projection: frustum.matrix(),
            index_count: self.mesh.index_count(),
        };
        backend.draw(&packet)?;

        self.frame_count += 1;
        if self.frame_count % 300 == 0 {
            tracing::debug!(frames = self.frame_count, "Render heartbeat");
        }
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[derive(Debug, PartialEq)]
    enum Call {
        Prepare([f32; 4], u32),
        Resize(u32, u32),
        Draw(FramePacket),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<Call>,
    }

    impl RenderBackend for RecordingBackend {
        fn prepare(&mut self, clear_color: [f32; 4], mesh: &CubeMesh) -> Result<(), RenderError> {
            self.calls.push(Call::Prepare(clear_color, mesh.index_count()));
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
            self.calls.push(Call::Resize(width, height));
            Ok(())
        }

        fn draw(&mut self, frame: &FramePacket) -> Result<(), RenderError> {
            self.calls.push(Call::Draw(*frame));
            Ok(())
        }
    }

    fn ready_renderer(backend: &mut RecordingBackend) -> FrameRenderer {
        let mut renderer = FrameRenderer::new(&RenderConfig::default());
        renderer.on_surface_created(backend).unwrap();
        renderer.on_surface_resized(200, 100, backend).unwrap();
        renderer
    }

    #[test]
    fn surface_created_sets_white_clear() {
        let mut backend = RecordingBackend::default();
        let mut renderer = FrameRenderer::new(&RenderConfig::default());
        assert!(!renderer.is_configured());

        renderer.on_surface_created(&mut backend).unwrap();

        assert!(renderer.is_configured());
        assert_eq!(backend.calls, vec![Call::Prepare([1.0, 1.0, 1.0, 1.0], 36)]);
    }

    #[test]
    fn frames_carry_configured_clear_color() {
        let mut backend = RecordingBackend::default();
        let config = RenderConfig {
            clear_color: [0.1, 0.2, 0.3, 1.0],
            ..RenderConfig::default()
        };
        let mut renderer = FrameRenderer::new(&config);
        renderer.on_surface_created(&mut backend).unwrap();
        renderer.on_surface_resized(64, 64, &mut backend).unwrap();

        let packet = renderer.on_draw_frame(Mat4::IDENTITY, &mut backend).unwrap();

        assert_eq!(packet.clear_color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(backend.calls.last(), Some(&Call::Draw(packet)));
    }

    #[test]
    fn draw_before_setup_is_skipped() {
        let mut backend = RecordingBackend::default();
        let mut renderer = FrameRenderer::new(&RenderConfig::default());

        assert!(matches!(
            renderer.on_draw_frame(Mat4::IDENTITY, &mut backend),
            Err(RenderError::NotConfigured)
        ));

        renderer.on_surface_created(&mut backend).unwrap();
        assert!(matches!(
            renderer.on_draw_frame(Mat4::IDENTITY, &mut backend),
            Err(RenderError::NotConfigured)
        ));
        assert!(!backend.calls.iter().any(|c| matches!(c, Call::Draw(_))));
    }

    #[test]
    fn zero_height_resize_keeps_previous_projection() {
        let mut backend = RecordingBackend::default();
        let mut renderer = ready_renderer(&mut backend);
        let before = renderer.frustum();

        assert!(matches!(
            renderer.on_surface_resized(200, 0, &mut backend),
            Err(RenderError::InvalidSurfaceDimensions { .. })
        ));
        assert_eq!(renderer.frustum(), before);
        assert_eq!(backend.calls.last(), Some(&Call::Resize(200, 100)));
    }

    #[test]
    fn resize_changes_only_horizontal_bounds() {
        let mut backend = RecordingBackend::default();
        let mut renderer = ready_renderer(&mut backend);
        let wide = renderer.frustum().unwrap();

        renderer.on_surface_resized(100, 100, &mut backend).unwrap();
        let square = renderer.frustum().unwrap();

        assert_ne!(wide.left, square.left);
        assert_ne!(wide.right, square.right);
        assert_eq!(wide.near, 1.0);
        assert_eq!(wide.far, 10.0);
        assert_eq!((wide.near, wide.far), (square.near, square.far));
        assert_eq!((wide.bottom, wide.top), (square.bottom, square.top));
    }

    #[test]
    fn model_view_translates_then_rotates() {
        let mut backend = RecordingBackend::default();
        let mut renderer = ready_renderer(&mut backend);
        let rotation = Mat4::from_quat(Quat::from_rotation_y(0.7));

        let packet = renderer.on_draw_frame(rotation, &mut backend).unwrap();

        // The cube center stays three units in front of the camera.
        let center = packet.model_view.transform_point3(Vec3::ZERO);
        assert!(center.abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-6));
        // A corner is rotated about the cube center, not about the camera.
        let corner = packet.model_view.transform_point3(Vec3::X);
        let expected = rotation.transform_point3(Vec3::X) + Vec3::new(0.0, 0.0, -3.0);
        assert!(corner.abs_diff_eq(expected, 1e-6));
        assert_eq!(packet.index_count, 36);
    }

    #[test]
    fn repeated_frames_are_identical_without_new_input() {
        let mut backend = RecordingBackend::default();
        let mut renderer = ready_renderer(&mut backend);
        let rotation = Mat4::from_quat(Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.2, 0.5));

        let first = renderer.on_draw_frame(rotation, &mut backend).unwrap();
        let second = renderer.on_draw_frame(rotation, &mut backend).unwrap();

        assert_eq!(first.model_view.to_cols_array(), second.model_view.to_cols_array());
        assert_eq!(first, second);
        assert_eq!(
            backend.calls.iter().filter(|c| matches!(c, Call::Draw(_))).count(),
            2
        );
    }
}
