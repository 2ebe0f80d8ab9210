//! Remux configuration.
//!
//! [`RemuxOptions`] is a builder carrying the output format, the bitstream
//! filter to initialize, diagnostic sampling and progress reporting.
//!
//! # Example
//!
//! ```
//! use tsremux::RemuxOptions;
//!
//! let options = RemuxOptions::new()
//!     .with_output_format("mpegts")
//!     .with_diagnostic_packets(5)
//!     .with_batch_size(50);
//! assert_eq!(options.output_format(), "mpegts");
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::progress::{NoOpProgress, ProgressCallback};

/// Output container used when none is configured.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mpegts";

/// Bitstream filter initialized for the video stream when none is configured.
pub const DEFAULT_BITSTREAM_FILTER: &str = "h264_mp4toannexb";

/// Number of leading packets logged by the diagnostic sampler by default.
pub const DEFAULT_DIAGNOSTIC_PACKETS: u32 = 20;

/// Settings for a remux run.
#[derive(Clone)]
pub struct RemuxOptions {
    pub(crate) output_format: String,
    pub(crate) bitstream_filter: String,
    pub(crate) diagnostic_packets: u32,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) batch_size: u64,
}

impl Debug for RemuxOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RemuxOptions")
            .field("output_format", &self.output_format)
            .field("bitstream_filter", &self.bitstream_filter)
            .field("diagnostic_packets", &self.diagnostic_packets)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for RemuxOptions {
    fn default() -> Self {
        Self {
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            bitstream_filter: DEFAULT_BITSTREAM_FILTER.to_string(),
            diagnostic_packets: DEFAULT_DIAGNOSTIC_PACKETS,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }
}

impl RemuxOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output container format by FFmpeg short name.
    #[must_use]
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    /// Set the bitstream filter initialized for the video stream.
    #[must_use]
    pub fn with_bitstream_filter(mut self, name: impl Into<String>) -> Self {
        self.bitstream_filter = name.into();
        self
    }

    /// Set how many leading packets are logged at debug level.
    #[must_use]
    pub fn with_diagnostic_packets(mut self, count: u32) -> Self {
        self.diagnostic_packets = count;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Fire the progress callback every `batch_size` packets. Clamped to 1.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Output container format name.
    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    /// Bitstream filter name.
    pub fn bitstream_filter(&self) -> &str {
        &self.bitstream_filter
    }

    /// Number of leading packets logged at debug level.
    pub fn diagnostic_packets(&self) -> u32 {
        self.diagnostic_packets
    }

    /// Progress batch size.
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }
}
