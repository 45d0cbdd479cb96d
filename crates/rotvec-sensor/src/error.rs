use crate::types::SensorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("ignoring sample from unsupported sensor: {0}")]
    UnsupportedSensor(SensorKind),
    #[error("rotation vector must have 3 to 5 components, got {len}")]
    MalformedSample { len: usize },
    #[error("rotation vector component {index} is not finite")]
    NonFiniteComponent { index: usize },
    #[error("rotation vector is not a unit quaternion (norm {norm})")]
    NotUnitLength { norm: f32 },
}
