//! Progress reporting for remux runs.
//!
//! Implement [`ProgressCallback`] and attach it with
//! [`RemuxOptions::with_progress`](crate::RemuxOptions::with_progress) to be
//! told how far the packet loop has got.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tsremux::{ProgressCallback, ProgressInfo, RemuxOptions, Remuxer};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{} packets, {pct:.1}%", info.packets);
//!         }
//!     }
//! }
//!
//! let options = RemuxOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(100);
//! Remuxer::new("input.ts", "output.ts")?
//!     .with_options(options)
//!     .run()?;
//! # Ok::<(), tsremux::RemuxError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A snapshot of remux progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Packets submitted to the muxer so far.
    pub packets: u64,
    /// Wall-clock time since the packet loop started.
    pub elapsed: Duration,
    /// Current segment time.
    pub position: Duration,
    /// Input duration, if the container reports one.
    pub duration: Option<Duration>,
    /// Completion percentage (0.0 – 100.0), if `duration` is known.
    pub percentage: Option<f32>,
}

/// Receives progress updates from the packet loop.
///
/// Callbacks observe the run but cannot stop it.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` packets and once when the loop ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Default when nothing is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks packet counts and fires the callback in batches.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    duration: Option<Duration>,
    batch_size: u64,
    packets: u64,
    packets_since_last_report: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        duration: Option<Duration>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            duration: duration.filter(|d| !d.is_zero()),
            batch_size: batch_size.max(1),
            packets: 0,
            packets_since_last_report: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one submitted packet.
    pub(crate) fn advance(&mut self, position: Duration) {
        self.packets += 1;
        self.packets_since_last_report += 1;

        if self.packets_since_last_report >= self.batch_size {
            self.report(position);
            self.packets_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self, position: Duration) {
        self.report(position);
    }

    fn report(&self, position: Duration) {
        let percentage = self.duration.map(|total| {
            let ratio = position.as_secs_f64() / total.as_secs_f64();
            (ratio.clamp(0.0, 1.0) * 100.0) as f32
        });

        self.callback.on_progress(&ProgressInfo {
            packets: self.packets,
            elapsed: self.start_time.elapsed(),
            position,
            duration: self.duration,
            percentage,
        });
    }
}
