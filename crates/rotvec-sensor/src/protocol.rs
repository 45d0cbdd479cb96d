use crate::types::{SensorKind, SensorSample};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Marks the start of a sample frame (producer → client).
const SAMPLE_MAGIC: [u8; 4] = *b"RVEC";
/// Marks the start of a control frame (client → producer).
const CONTROL_MAGIC: [u8; 4] = *b"RVCT";
/// Closes every sample frame.
const TRAILER: [u8; 2] = *b"\r\n";

/// magic (4) + kind (4) + timestamp (8) + count (1).
const SAMPLE_HEADER_LEN: usize = 17;
/// Upper bound on components per sample.
pub const MAX_VALUES: u8 = 16;
/// magic (4) + op (1) + kind (4) + latency (4).
pub const CONTROL_FRAME_LEN: usize = 13;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("sample frame declares {0} values (max {MAX_VALUES})")]
    TooManyValues(u8),
    #[error("sample frame trailer missing")]
    BadTrailer,
}

/// Requests sent upstream to the sample producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlOp {
    Register = 1,
    Unregister = 2,
}

/// Encode a control frame. The latency is sent in whole microseconds,
/// saturating at `u32::MAX`.
pub fn encode_control(op: ControlOp, kind: SensorKind, max_latency: Duration) -> [u8; CONTROL_FRAME_LEN] {
    let latency_us = u32::try_from(max_latency.as_micros()).unwrap_or(u32::MAX);

    let mut frame = [0u8; CONTROL_FRAME_LEN];
    frame[..4].copy_from_slice(&CONTROL_MAGIC);
    frame[4] = op as u8;
    frame[5..9].copy_from_slice(&kind.code().to_le_bytes());
    frame[9..13].copy_from_slice(&latency_us.to_le_bytes());
    frame
}

enum Scan {
    /// Need more bytes.
    Incomplete,
    /// Drop this many leading bytes that cannot start a frame.
    Skip(usize),
    /// A full frame of the given length.
    Frame(usize, SensorSample),
    /// Corrupt frame at the head of the buffer.
    Reject(ProtocolError),
}

/// Streaming parser for sample frames.
///
/// Feed raw bytes via `push_data`, then drain parsed samples via `next_sample`.
pub struct ProtocolParser {
    buffer: VecDeque<u8>,
}

impl ProtocolParser {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(4096),
        }
    }

    /// Append received bytes to the internal buffer.
    pub fn push_data(&mut self, data: &[u8]) {
        self.buffer.extend(data);
    }

    /// Try to extract the next complete sample from the buffer.
    /// Returns `None` if no complete frame is available yet.
    ///
    /// After an error the parser has already advanced past the bad magic, so
    /// the caller can simply keep draining.
    pub fn next_sample(&mut self) -> Option<Result<SensorSample, ProtocolError>> {
        loop {
            match scan(self.buffer.make_contiguous()) {
                Scan::Incomplete => return None,
                Scan::Skip(n) => {
                    tracing::trace!(skipped = n, "Discarding bytes outside a sample frame");
                    self.buffer.drain(..n);
                }
                Scan::Frame(len, sample) => {
                    self.buffer.drain(..len);
                    return Some(Ok(sample));
                }
                Scan::Reject(e) => {
                    // Step over the magic so the next scan resynchronizes.
                    self.buffer.drain(..1);
                    return Some(Err(e));
                }
            }
        }
    }
}

impl Default for ProtocolParser {
    fn default() -> Self {
        Self::new()
    }
}

fn scan(buf: &[u8]) -> Scan {
    let start = match find_pattern(buf, &SAMPLE_MAGIC) {
        Some(pos) => pos,
        None => {
            // Keep a tail that could be the start of a split magic.
            let keep = SAMPLE_MAGIC.len() - 1;
            return if buf.len() > keep {
                Scan::Skip(buf.len() - keep)
            } else {
                Scan::Incomplete
            };
        }
    };
    if start > 0 {
        return Scan::Skip(start);
    }

    if buf.len() < SAMPLE_HEADER_LEN {
        return Scan::Incomplete;
    }

    let count = buf[16];
    if count > MAX_VALUES {
        return Scan::Reject(ProtocolError::TooManyValues(count));
    }

    let frame_len = SAMPLE_HEADER_LEN + count as usize * 4 + TRAILER.len();
    if buf.len() < frame_len {
        return Scan::Incomplete;
    }
    if buf[frame_len - TRAILER.len()..frame_len] != TRAILER {
        return Scan::Reject(ProtocolError::BadTrailer);
    }

    let values = (0..count as usize)
        .map(|i| f32::from_le_bytes(read_array(buf, SAMPLE_HEADER_LEN + i * 4)))
        .collect();

    Scan::Frame(
        frame_len,
        SensorSample {
            kind: SensorKind::from_code(u32::from_le_bytes(read_array(buf, 4))),
            timestamp_ns: u64::from_le_bytes(read_array(buf, 8)),
            values,
        },
    )
}

/// Copy `N` bytes starting at `offset`. Callers check the length first.
fn read_array<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

/// Find the first occurrence of `pattern` in `data`.
fn find_pattern(data: &[u8], pattern: &[u8]) -> Option<usize> {
    data.windows(pattern.len())
        .position(|window| window == pattern)
}
