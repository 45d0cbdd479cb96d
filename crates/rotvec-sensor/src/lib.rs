pub mod error;
pub mod protocol;
pub mod rotation;
pub mod simulated;
pub mod source;
pub mod types;

pub use error::SensorError;
pub use simulated::SimulatedMotion;
pub use source::{orientation_channel, OrientationReader, OrientationSource};
pub use types::{RotationMatrix, SensorKind, SensorSample};

use anyhow::Result;
use protocol::{encode_control, ControlOp, ProtocolParser};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

/// Default requested maximum delivery latency.
pub const DEFAULT_MAX_LATENCY: Duration = Duration::from_micros(10_000);

/// Commands sent to the sensor task.
enum SensorCommand {
    Register(Duration),
    Unregister,
}

/// Client for a rotation-vector sensor.
///
/// Owns the `OrientationSource` inside a background task that receives
/// samples, converts them, and publishes the latest matrix. Samples are only
/// applied between `register` and `unregister`; while unregistered the last
/// matrix stays in place.
pub struct SensorClient {
    command_tx: mpsc::UnboundedSender<SensorCommand>,
    _task: tokio::task::JoinHandle<()>,
}

impl SensorClient {
    /// Connect to a sample producer over TCP.
    pub async fn connect(addr: &str, source: OrientationSource) -> Result<Self> {
        tracing::info!(%addr, "Connecting to rotation sensor stream");
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        tracing::info!(%addr, "Connected to rotation sensor stream");
        Ok(Self::from_stream(stream, source))
    }

    /// Drive the sensor protocol over an already-open byte stream.
    pub fn from_stream<S>(stream: S, source: OrientationSource) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(stream_read_loop(stream, source, command_rx));
        Self {
            command_tx,
            _task: task,
        }
    }

    /// Generate samples locally instead of reading hardware.
    pub fn simulated(motion: SimulatedMotion, source: OrientationSource) -> Self {
        tracing::info!(
            axis = ?motion.axis,
            degrees_per_second = motion.degrees_per_second,
            "Using simulated rotation sensor"
        );
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(simulated_loop(motion, source, command_rx));
        Self {
            command_tx,
            _task: task,
        }
    }

    /// A client that never produces samples. The matrix stays at identity.
    pub fn idle(source: OrientationSource) -> Self {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<SensorCommand>();
        let task = tokio::spawn(async move {
            // Keep the source alive for the lifetime of the client.
            let _source = source;
            while command_rx.recv().await.is_some() {
                tracing::trace!("Idle sensor ignoring command");
            }
        });
        Self {
            command_tx,
            _task: task,
        }
    }

    /// Start applying samples, asking for the given maximum latency.
    pub fn register(&self, max_latency: Duration) {
        let _ = self.command_tx.send(SensorCommand::Register(max_latency));
    }

    /// Stop applying samples. The current orientation is kept.
    pub fn unregister(&self) {
        let _ = self.command_tx.send(SensorCommand::Unregister);
    }
}

/// Feed one sample to the source, logging anything that gets skipped.
fn apply_sample(source: &mut OrientationSource, sample: &SensorSample) {
    match source.on_sample(sample) {
        Ok(()) => {}
        Err(e @ SensorError::UnsupportedSensor(_)) => tracing::trace!(%e, "Skipping sample"),
        Err(e) => tracing::warn!(%e, "Skipping malformed sample"),
    }
}

/// Background task: read frames, apply samples, forward registration upstream.
async fn stream_read_loop<S>(
    stream: S,
    mut source: OrientationSource,
    mut command_rx: mpsc::UnboundedReceiver<SensorCommand>,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut parser = ProtocolParser::new();
    let mut buf = [0u8; 1024];
    let mut registered = false;
    let mut max_latency = DEFAULT_MAX_LATENCY;

    loop {
        tokio::select! {
            result = reader.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        tracing::warn!("Sensor stream closed");
                        break;
                    }
                    Ok(n) => {
                        parser.push_data(&buf[..n]);

                        while let Some(result) = parser.next_sample() {
                            match result {
                                Ok(sample) if registered => apply_sample(&mut source, &sample),
                                Ok(_) => tracing::trace!("Dropping sample while unregistered"),
                                Err(e) => tracing::warn!(%e, "Skipping bad sample frame"),
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(?e, "Sensor stream read error");
                        break;
                    }
                }
            }
            cmd = command_rx.recv() => {
                let frame = match cmd {
                    Some(SensorCommand::Register(latency)) => {
                        registered = true;
                        max_latency = latency;
                        tracing::info!(latency_us = latency.as_micros() as u64, "Sensor registered");
                        encode_control(ControlOp::Register, SensorKind::RotationVector, latency)
                    }
                    Some(SensorCommand::Unregister) => {
                        registered = false;
                        tracing::info!("Sensor unregistered");
                        encode_control(ControlOp::Unregister, SensorKind::RotationVector, max_latency)
                    }
                    None => break,
                };
                if let Err(e) = writer.write_all(&frame).await {
                    tracing::error!(?e, "Failed to send sensor control frame");
                    break;
                }
            }
        }
    }
}

/// Background task: emit synthetic samples at the requested rate while registered.
async fn simulated_loop(
    motion: SimulatedMotion,
    mut source: OrientationSource,
    mut command_rx: mpsc::UnboundedReceiver<SensorCommand>,
) {
    let started = Instant::now();
    let mut registered = false;
    let mut ticker = new_ticker(DEFAULT_MAX_LATENCY);

    loop {
        tokio::select! {
            _ = ticker.tick(), if registered => {
                apply_sample(&mut source, &motion.sample_at(started.elapsed()));
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SensorCommand::Register(latency)) => {
                        registered = true;
                        ticker = new_ticker(latency);
                        tracing::info!(latency_us = latency.as_micros() as u64, "Simulated sensor registered");
                    }
                    Some(SensorCommand::Unregister) => {
                        registered = false;
                        tracing::info!("Simulated sensor unregistered");
                    }
                    None => break,
                }
            }
        }
    }
}

fn new_ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
