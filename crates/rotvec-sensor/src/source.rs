use crate::error::SensorError;
use crate::rotation::rotation_matrix_from_vector;
use crate::types::{RotationMatrix, SensorKind, SensorSample};
use tokio::sync::watch;

/// Create the shared orientation state, starting at identity.
///
/// The source half lives with whatever receives sensor events; the reader
/// half goes to the render loop. Each publish swaps in a complete 16-element
/// snapshot, so readers never observe a half-written matrix.
pub fn orientation_channel() -> (OrientationSource, OrientationReader) {
    let (tx, rx) = watch::channel(RotationMatrix::IDENTITY);
    (
        OrientationSource {
            matrix_tx: tx,
            samples_applied: 0,
        },
        OrientationReader { matrix_rx: rx },
    )
}

/// Write side of the shared rotation matrix.
pub struct OrientationSource {
    matrix_tx: watch::Sender<RotationMatrix>,
    samples_applied: u64,
}

impl OrientationSource {
    /// Convert one rotation-vector sample and publish the resulting matrix.
    ///
    /// Samples of any other sensor kind, and malformed samples, leave the
    /// published matrix untouched.
    pub fn on_sample(&mut self, sample: &SensorSample) -> Result<(), SensorError> {
        if sample.kind != SensorKind::RotationVector {
            return Err(SensorError::UnsupportedSensor(sample.kind));
        }

        let matrix = rotation_matrix_from_vector(&sample.values)?;
        self.matrix_tx.send_replace(matrix);

        self.samples_applied += 1;
        if self.samples_applied % 1000 == 0 {
            tracing::debug!(samples = self.samples_applied, "Rotation samples applied");
        }
        Ok(())
    }

    pub fn samples_applied(&self) -> u64 {
        self.samples_applied
    }

    /// Latest published matrix.
    pub fn current(&self) -> RotationMatrix {
        *self.matrix_tx.borrow()
    }
}

/// Read side of the shared rotation matrix. Cheap to clone.
#[derive(Clone)]
pub struct OrientationReader {
    matrix_rx: watch::Receiver<RotationMatrix>,
}

impl OrientationReader {
    /// Latest orientation snapshot (non-blocking).
    pub fn current(&self) -> RotationMatrix {
        *self.matrix_rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_identity() {
        let (source, reader) = orientation_channel();
        assert_eq!(reader.current(), RotationMatrix::IDENTITY);
        assert_eq!(source.current(), RotationMatrix::IDENTITY);
    }

    #[test]
    fn rotation_sample_updates_reader() {
        let (mut source, reader) = orientation_channel();
        let sample = SensorSample::rotation_vector(&[0.0, 0.0, 0.5_f32.sin(), 0.5_f32.cos()]);

        source.on_sample(&sample).unwrap();

        assert_ne!(reader.current(), RotationMatrix::IDENTITY);
        assert_eq!(reader.current(), source.current());
        assert_eq!(source.samples_applied(), 1);
    }

    #[test]
    fn other_sensor_kinds_are_ignored() {
        let (mut source, reader) = orientation_channel();
        source
            .on_sample(&SensorSample::rotation_vector(&[0.1, 0.2, 0.3]))
            .unwrap();
        let before = reader.current();

        for kind in [
            SensorKind::Accelerometer,
            SensorKind::Gyroscope,
            SensorKind::GameRotationVector,
            SensorKind::Other(99),
        ] {
            let sample = SensorSample {
                kind,
                timestamp_ns: 7,
                values: vec![0.5, 0.5, 0.5],
            };
            assert!(matches!(
                source.on_sample(&sample),
                Err(SensorError::UnsupportedSensor(k)) if k == kind
            ));
        }

        assert_eq!(reader.current(), before);
        assert_eq!(source.samples_applied(), 1);
    }

    #[test]
    fn malformed_sample_keeps_previous_matrix() {
        let (mut source, reader) = orientation_channel();
        source
            .on_sample(&SensorSample::rotation_vector(&[0.0, 0.3, 0.0]))
            .unwrap();
        let before = reader.current();

        let err = source
            .on_sample(&SensorSample::rotation_vector(&[0.3]))
            .unwrap_err();
        assert!(matches!(err, SensorError::MalformedSample { len: 1 }));
        assert_eq!(reader.current(), before);
    }

    #[test]
    fn non_unit_sample_keeps_previous_matrix() {
        let (mut source, reader) = orientation_channel();
        source
            .on_sample(&SensorSample::rotation_vector(&[0.2, 0.0, 0.1]))
            .unwrap();
        let before = reader.current();

        for values in [&[1.0, 0.0, 0.0, 1.0][..], &[0.9, 0.9, 0.9][..]] {
            let err = source
                .on_sample(&SensorSample::rotation_vector(values))
                .unwrap_err();
            assert!(matches!(err, SensorError::NotUnitLength { .. }));
        }

        assert_eq!(reader.current(), before);
        assert_eq!(source.samples_applied(), 1);
    }
}
