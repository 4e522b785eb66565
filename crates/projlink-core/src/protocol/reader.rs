//! Response reader
//!
//! Drives one request/response exchange over a [`Transport`]:
//!
//! 1. discard stale bytes in both directions
//! 2. write the frame and flush
//! 3. up to `attempts` times: sleep `poll_interval`, drain whatever is
//!    available, stop once the buffer looks complete
//! 4. hand back whatever accumulated (possibly nothing)
//!
//! The wire format has no length field, so "complete" is a heuristic. The
//! default [`CompletionMode::Sentinel`] stops as soon as `Ok`, `P` or `F`
//! appears anywhere in the buffer. A payload that happens to contain one of
//! those characters (a MAC address with an `F`, say) can end the read early;
//! [`CompletionMode::QuietPeriod`] avoids that by waiting for the line to go
//! idle instead, at the cost of one extra poll per exchange.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::{
    frame, ProtocolError, Transport, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS,
    FAILURE_SENTINEL, SUCCESS_PREFIX, SUCCESS_SENTINEL,
};

/// How the reader decides a response has fully arrived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// Stop once a sentinel or the success prefix shows up anywhere
    #[default]
    Sentinel,
    /// Stop once bytes have arrived and the line has then been idle this long
    QuietPeriod {
        /// Idle time that ends the read
        quiet_ms: u64,
    },
}

/// Poll budget and completion rule for one exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Maximum number of polls
    pub attempts: u32,
    /// Sleep before each poll
    pub poll_interval_ms: u64,
    /// When a response counts as complete
    pub completion: CompletionMode,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            completion: CompletionMode::default(),
        }
    }
}

impl ReaderConfig {
    /// Upper bound on time spent polling for one response
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.saturating_mul(self.attempts as u64))
    }
}

/// What came back from one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Stripped ASCII text, ready for classification
    pub text: String,
    /// Bytes read off the wire, before stripping
    pub bytes_received: usize,
    /// False when the poll budget ran out first
    pub complete: bool,
}

/// True if the buffer holds something the sentinel heuristic treats as an end
pub fn has_completion_marker(buf: &[u8]) -> bool {
    let contains = |needle: &[u8]| buf.windows(needle.len()).any(|w| w == needle);
    contains(SUCCESS_PREFIX.as_bytes())
        || contains(SUCCESS_SENTINEL.as_bytes())
        || contains(FAILURE_SENTINEL.as_bytes())
}

/// Send `frame` and collect the response.
///
/// Transport faults are returned as errors. Running out of attempts is not an
/// error: the caller gets whatever arrived, flagged `complete: false`.
pub fn exchange(
    transport: &mut dyn Transport,
    frame_bytes: &[u8],
    config: &ReaderConfig,
) -> Result<RawResponse, ProtocolError> {
    transport.discard_buffers()?;

    let shown = String::from_utf8_lossy(frame_bytes);
    debug!(frame = shown.trim_end(), "sending frame");
    transport.write_all(frame_bytes)?;
    transport.flush()?;

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let mut response = Vec::new();
    let mut buffer = [0u8; 256];
    let mut last_data_time = Instant::now();
    let mut complete = false;

    for attempt in 0..config.attempts {
        thread::sleep(poll_interval);

        let available = transport.bytes_to_read()? as usize;
        if available > 0 {
            let mut remaining = available;
            while remaining > 0 {
                let to_read = remaining.min(buffer.len());
                match transport.read(&mut buffer[..to_read]) {
                    Ok(0) => break,
                    Ok(n) => {
                        response.extend_from_slice(&buffer[..n]);
                        remaining = remaining.saturating_sub(n);
                    }
                    Err(ref e)
                        if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock =>
                    {
                        break
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            last_data_time = Instant::now();
            trace!(attempt, total = response.len(), "accumulated response bytes");
        }

        complete = match config.completion {
            CompletionMode::Sentinel => has_completion_marker(&response),
            CompletionMode::QuietPeriod { quiet_ms } => {
                available == 0
                    && !response.is_empty()
                    && last_data_time.elapsed() >= Duration::from_millis(quiet_ms)
            }
        };
        if complete {
            debug!(attempt, "response complete");
            break;
        }
    }

    let text = frame::strip(&response);
    if !complete {
        debug!(
            received = response.len(),
            budget_ms = config.budget().as_millis() as u64,
            "poll budget exhausted"
        );
    }

    Ok(RawResponse {
        text,
        bytes_received: response.len(),
        complete,
    })
}
