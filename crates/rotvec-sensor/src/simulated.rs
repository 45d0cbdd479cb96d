use crate::types::{SensorKind, SensorSample};
use glam::{Quat, Vec3};
use std::time::Duration;

/// Synthetic device motion: constant angular velocity about a fixed axis.
///
/// Used when no sensor hardware is attached.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedMotion {
    pub axis: Vec3,
    pub degrees_per_second: f32,
}

impl SimulatedMotion {
    pub fn new(axis: Vec3, degrees_per_second: f32) -> Self {
        Self {
            axis: axis.try_normalize().unwrap_or(Vec3::Y),
            degrees_per_second,
        }
    }

    /// The rotation-vector sample a real device would report after `elapsed`.
    pub fn sample_at(&self, elapsed: Duration) -> SensorSample {
        let angle = (self.degrees_per_second * elapsed.as_secs_f32()).to_radians();
        let q = Quat::from_axis_angle(self.axis, angle);
        SensorSample {
            kind: SensorKind::RotationVector,
            timestamp_ns: u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
            values: vec![q.x, q.y, q.z, q.w],
        }
    }
}
