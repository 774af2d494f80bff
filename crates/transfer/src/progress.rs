use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::trace;

/// Minimum time between two progress notifications.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(1000);

/// One progress notification for a running transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    /// File name shown to the user (no directory part).
    pub file_name: String,
    pub file_size: i64,
    pub transferred: i64,
    /// Throughput since the previous sample; 0 on the final sample.
    pub bytes_per_second: u64,
}

// ---------------------------------------------------------------------------
// ThroughputSampler
// ---------------------------------------------------------------------------

/// Decides when a progress sample is due and computes its throughput.
///
/// A sample is due once [`PROGRESS_INTERVAL`] has elapsed since the last
/// one; its rate is the bytes moved since then divided by the elapsed time.
#[derive(Debug, Clone)]
pub struct ThroughputSampler {
    interval: Duration,
    last_at: Instant,
    last_bytes: i64,
}

impl ThroughputSampler {
    /// Starts sampling at `start` with zero bytes transferred.
    pub fn new(start: Instant) -> Self {
        Self::with_interval(start, PROGRESS_INTERVAL)
    }

    pub fn with_interval(start: Instant, interval: Duration) -> Self {
        Self {
            interval,
            last_at: start,
            last_bytes: 0,
        }
    }

    /// Returns the bytes/s rate if a sample is due at `now`, resetting the
    /// baseline to `(now, transferred)`.
    pub fn sample(&mut self, now: Instant, transferred: i64) -> Option<u64> {
        let elapsed = now.saturating_duration_since(self.last_at);
        if elapsed < self.interval {
            return None;
        }

        let millis = elapsed.as_millis().max(1);
        let delta = (transferred - self.last_bytes).max(0) as u128;
        let rate = delta * 1000 / millis;

        self.last_at = now;
        self.last_bytes = transferred;
        Some(u64::try_from(rate).unwrap_or(u64::MAX))
    }
}

// ---------------------------------------------------------------------------
// ProgressReporter
// ---------------------------------------------------------------------------

/// Emits throttled [`TransferProgress`] samples for one transfer.
///
/// Delivery never blocks: when the listener's queue is full the sample is
/// dropped.
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<TransferProgress>>,
    file_name: String,
    file_size: i64,
    sampler: ThroughputSampler,
}

impl ProgressReporter {
    pub fn new(
        tx: Option<mpsc::Sender<TransferProgress>>,
        file_name: impl Into<String>,
        file_size: i64,
    ) -> Self {
        Self {
            tx,
            file_name: file_name.into(),
            file_size,
            sampler: ThroughputSampler::new(Instant::now()),
        }
    }

    /// Records `transferred` bytes and emits a sample if one is due.
    pub fn advance(&mut self, transferred: i64) {
        self.advance_at(Instant::now(), transferred);
    }

    pub fn advance_at(&mut self, now: Instant, transferred: i64) {
        if let Some(rate) = self.sampler.sample(now, transferred) {
            self.emit(transferred, rate);
        }
    }

    /// Emits the terminal sample (rate 0).
    pub fn finish(&mut self, transferred: i64) {
        self.emit(transferred, 0);
    }

    fn emit(&self, transferred: i64, bytes_per_second: u64) {
        let Some(tx) = &self.tx else {
            return;
        };
        let progress = TransferProgress {
            file_name: self.file_name.clone(),
            file_size: self.file_size,
            transferred,
            bytes_per_second,
        };
        if tx.try_send(progress).is_err() {
            trace!(file = %self.file_name, "progress sample dropped");
        }
    }
}
