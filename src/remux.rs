//! File-to-file stream-copy remuxing.
//!
//! [`Remuxer`] opens an input with [`FfmpegDemuxer`], allocates an output
//! with [`FfmpegMuxer`] and runs the [pipeline](crate::pipeline) over
//! them. No stream is decoded or re-encoded.
//!
//! # Example
//!
//! ```no_run
//! use tsremux::{RemuxOptions, Remuxer};
//!
//! let report = Remuxer::new("input.ts", "output.ts")?
//!     .with_options(RemuxOptions::new().with_diagnostic_packets(0))
//!     .run()?;
//! println!("{} packets written", report.outcome.packets_written);
//! # Ok::<(), tsremux::RemuxError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::config::RemuxOptions;
use crate::error::RemuxError;
use crate::pipeline;
use crate::report::RemuxReport;
use crate::sink::FfmpegMuxer;
use crate::source::FfmpegDemuxer;

/// Stream-copy remuxer from one file to another.
#[derive(Debug, Clone)]
pub struct Remuxer {
    input_path: PathBuf,
    output_path: PathBuf,
    options: RemuxOptions,
}

impl Remuxer {
    /// Create a remuxer from `input` to `output` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`RemuxError::FileOpen`] if FFmpeg cannot be initialised or
    /// the input file does not exist.
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(
        input: P1,
        output: P2,
    ) -> Result<Self, RemuxError> {
        let input_path = input.as_ref().to_path_buf();
        let output_path = output.as_ref().to_path_buf();

        ffmpeg_next::init().map_err(|e| RemuxError::FileOpen {
            path: input_path.clone(),
            reason: format!("FFmpeg initialisation failed: {e}"),
        })?;

        if !input_path.exists() {
            return Err(RemuxError::FileOpen {
                path: input_path,
                reason: "File does not exist".to_string(),
            });
        }

        Ok(Self {
            input_path,
            output_path,
            options: RemuxOptions::default(),
        })
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: RemuxOptions) -> Self {
        self.options = options;
        self
    }

    /// Input path.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Output path.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run the remux.
    ///
    /// The input is opened first and the output second; they are released
    /// in the opposite order on every path out of this function.
    ///
    /// # Errors
    ///
    /// Any setup error, or [`RemuxError::WriteTrailer`]. On a setup error
    /// the output has no trailer (and may not exist at all).
    pub fn run(&self) -> Result<RemuxReport, RemuxError> {
        log::info!(
            "Remuxing {} -> {} ({})",
            self.input_path.display(),
            self.output_path.display(),
            self.options.output_format,
        );

        let mut demuxer = FfmpegDemuxer::open(&self.input_path)?;
        let mut muxer = FfmpegMuxer::create(&self.output_path, &self.options.output_format)?;

        pipeline::remux(&mut demuxer, &mut muxer, &self.options)
    }
}
