//! Error types for the `tsremux` crate.
//!
//! [`RemuxError`] is returned by every fallible operation. Each setup step
//! of a remux run (open input, probe, resolve format, allocate output,
//! add streams, validate decoder, open sink, write header, filter init)
//! has its own variant so the caller can tell exactly which step failed.
//!
//! Per-packet write failures are *not* errors: the remux loop logs and
//! counts them in the [`RemuxReport`](crate::RemuxReport) and keeps going.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::{Error as FfmpegError, codec::Id};
use thiserror::Error;

/// The unified error type for all `tsremux` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemuxError {
    /// The input could not be opened.
    #[error("Failed to open input at {path}: {reason}")]
    FileOpen {
        /// Path or URL of the input.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// Stream information could not be probed from the input.
    #[error("Failed to probe stream information: {0}")]
    StreamInfo(String),

    /// The requested output container format is not known to FFmpeg.
    #[error("Unknown output format: {0}")]
    UnknownOutputFormat(String),

    /// The output container context could not be allocated.
    #[error("Failed to allocate output context for {format}: {reason}")]
    OutputAllocation {
        /// Output format name.
        format: String,
        /// Underlying reason.
        reason: String,
    },

    /// The output container refused to allocate another stream slot.
    #[error("Failed to allocate output stream for input stream {input_index}")]
    StreamAllocation {
        /// Index of the input stream being translated.
        input_index: usize,
    },

    /// The input does not contain a video stream.
    #[error("No video stream found in input")]
    NoVideoStream,

    /// No decoder is available for the selected video codec.
    #[error("No decoder available for codec {0:?}")]
    DecoderNotFound(Id),

    /// The validation decoder could not be opened.
    #[error("Failed to open decoder: {0}")]
    DecoderOpen(String),

    /// The output byte sink could not be opened for writing.
    #[error("Failed to open output at {path}: {reason}")]
    SinkOpen {
        /// Output path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The container header could not be written.
    #[error("Failed to write container header: {0}")]
    WriteHeader(String),

    /// The container trailer could not be written.
    #[error("Failed to write container trailer: {0}")]
    WriteTrailer(String),

    /// The bitstream filter could not be initialized.
    #[error("Bitstream filter {name} failed: {reason}")]
    BitstreamFilter {
        /// Filter name (e.g. `h264_mp4toannexb`).
        name: String,
        /// Underlying reason.
        reason: String,
    },

    /// A demuxed packet could not take ownership of its payload.
    #[error("Failed to duplicate packet: {0}")]
    PacketDuplication(String),

    /// Reading the next packet failed for a reason other than end of input.
    #[error("Failed to read packet: {0}")]
    PacketRead(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

impl RemuxError {
    /// Whether this error happened while setting up a run, before the
    /// first packet was read. Setup failures leave the output
    /// unfinalized.
    pub fn is_setup_failure(&self) -> bool {
        !matches!(
            self,
            RemuxError::PacketDuplication(_)
                | RemuxError::PacketRead(_)
                | RemuxError::WriteTrailer(_)
        )
    }
}

impl From<FfmpegError> for RemuxError {
    fn from(error: FfmpegError) -> Self {
        RemuxError::FfmpegError(error.to_string())
    }
}
