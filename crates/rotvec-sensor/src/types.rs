use glam::Mat4;
use std::fmt;

/// Sensor type tag carried by every sample.
///
/// Codes follow the usual mobile sensor numbering so a phone-side producer
/// can forward its native type id unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    MagneticField,
    Gyroscope,
    RotationVector,
    GameRotationVector,
    Other(u32),
}

impl SensorKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Accelerometer,
            2 => Self::MagneticField,
            4 => Self::Gyroscope,
            11 => Self::RotationVector,
            15 => Self::GameRotationVector,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Accelerometer => 1,
            Self::MagneticField => 2,
            Self::Gyroscope => 4,
            Self::RotationVector => 11,
            Self::GameRotationVector => 15,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "sensor type {code}"),
            kind => write!(f, "{kind:?}"),
        }
    }
}

/// One reading delivered by the sensor subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub kind: SensorKind,
    /// Event timestamp in nanoseconds (producer clock).
    pub timestamp_ns: u64,
    /// Raw components. For rotation vectors:
    /// `[x·sin(θ/2), y·sin(θ/2), z·sin(θ/2)]`, then optionally `cos(θ/2)`
    /// and a heading accuracy estimate.
    pub values: Vec<f32>,
}

impl SensorSample {
    pub fn rotation_vector(values: &[f32]) -> Self {
        Self {
            kind: SensorKind::RotationVector,
            timestamp_ns: 0,
            values: values.to_vec(),
        }
    }
}

/// Device orientation as a homogeneous 4x4 rotation.
///
/// Elements are kept in the sensor convention: row-major, mapping device
/// coordinates to world coordinates. Read as column-major by the graphics
/// side, the same 16 floats give the inverse rotation, which is what makes
/// the rendered object counter-rotate with the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix {
    pub elements: [f32; 16],
}

impl RotationMatrix {
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Interpret the elements column-major, as a graphics API would.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array(&self.elements)
    }
}

impl Default for RotationMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
