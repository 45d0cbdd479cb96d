use crate::error::SensorError;
use crate::types::RotationMatrix;

/// How far the quaternion norm may drift from 1 before a sample is rejected.
/// Readings within this band are renormalized.
pub const NORM_TOLERANCE: f32 = 0.01;

/// Convert a rotation-vector reading into a homogeneous rotation matrix.
///
/// `values` holds `[q1, q2, q3]` (axis · sin(θ/2)), optionally followed by
/// `q0` = cos(θ/2) and a heading accuracy that is ignored here. When `q0` is
/// absent it is recovered from the unit-norm constraint. Readings whose norm
/// is off by more than [`NORM_TOLERANCE`] are rejected; the rest are
/// renormalized so the result never carries scale or shear.
pub fn rotation_matrix_from_vector(values: &[f32]) -> Result<RotationMatrix, SensorError> {
    if !(3..=5).contains(&values.len()) {
        return Err(SensorError::MalformedSample { len: values.len() });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(SensorError::NonFiniteComponent { index });
    }

    let (q1, q2, q3) = (values[0], values[1], values[2]);
    let q0 = match values.get(3) {
        Some(&w) => w,
        None => {
            let w2 = 1.0 - q1 * q1 - q2 * q2 - q3 * q3;
            if w2 > 0.0 {
                w2.sqrt()
            } else {
                0.0
            }
        }
    };

    let norm = (q0 * q0 + q1 * q1 + q2 * q2 + q3 * q3).sqrt();
    if (norm - 1.0).abs() > NORM_TOLERANCE {
        return Err(SensorError::NotUnitLength { norm });
    }
    let (q0, q1, q2, q3) = (q0 / norm, q1 / norm, q2 / norm, q3 / norm);

    let sq_q1 = 2.0 * q1 * q1;
    let sq_q2 = 2.0 * q2 * q2;
    let sq_q3 = 2.0 * q3 * q3;
    let q1_q2 = 2.0 * q1 * q2;
    let q3_q0 = 2.0 * q3 * q0;
    let q1_q3 = 2.0 * q1 * q3;
    let q2_q0 = 2.0 * q2 * q0;
    let q2_q3 = 2.0 * q2 * q3;
    let q1_q0 = 2.0 * q1 * q0;

    Ok(RotationMatrix {
        elements: [
            1.0 - sq_q2 - sq_q3,
            q1_q2 - q3_q0,
            q1_q3 + q2_q0,
            0.0,
            q1_q2 + q3_q0,
            1.0 - sq_q1 - sq_q3,
            q2_q3 - q1_q0,
            0.0,
            q1_q3 - q2_q0,
            q2_q3 + q1_q0,
            1.0 - sq_q1 - sq_q2,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ],
    })
}
