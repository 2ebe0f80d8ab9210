//! # tsremux
//!
//! Stream-copy remuxing of MPEG transport streams, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! `tsremux` opens an input container, keeps its first video stream and
//! first audio stream, and copies their packets unchanged into a new
//! container (MPEG-TS by default). Nothing is decoded or re-encoded; only
//! timestamps are rescaled to the output time bases.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tsremux::Remuxer;
//!
//! let report = Remuxer::new("ts.h264", "264.ts")?.run()?;
//! println!("{report}");
//! # Ok::<(), tsremux::RemuxError>(())
//! ```
//!
//! ## Custom collaborators
//!
//! The core is generic over the [`Demuxer`] and [`Muxer`] traits.
//! [`FfmpegDemuxer`] and [`FfmpegMuxer`] are the FFmpeg-backed
//! implementations; [`remux`] drives any other pair the same way.
//!
//! ```no_run
//! use tsremux::{FfmpegDemuxer, FfmpegMuxer, RemuxOptions};
//!
//! let options = RemuxOptions::new().with_output_format("mpegts");
//! let mut demuxer = FfmpegDemuxer::open("ts.h264")?;
//! let mut muxer = FfmpegMuxer::create("264.ts", options.output_format())?;
//! let report = tsremux::remux(&mut demuxer, &mut muxer, &options)?;
//! assert!(report.video_stream.is_some());
//! # Ok::<(), tsremux::RemuxError>(())
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://crates.io/crates/log) facade.
//! FFmpeg's own console output is separate; see [`set_ffmpeg_log_level`].
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod bitstream_filter;
pub mod config;
pub mod container;
pub mod error;
pub mod ffmpeg;
pub mod parameters;
pub mod pipeline;
pub mod progress;
pub mod registry;
pub mod remux;
pub mod remux_loop;
pub mod report;
pub mod sink;
pub mod source;
pub mod time_base;
pub mod translate;

pub use bitstream_filter::BitstreamFilter;
pub use config::{
    DEFAULT_BITSTREAM_FILTER, DEFAULT_DIAGNOSTIC_PACKETS, DEFAULT_OUTPUT_FORMAT, RemuxOptions,
};
pub use container::{DemuxedPacket, Demuxer, Discard, Muxer, WriteStatus};
pub use error::RemuxError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use parameters::{
    AudioParameters, InputStreamDescriptor, MediaRole, OutputStreamDescriptor, StreamKind,
    VideoParameters,
};
pub use pipeline::remux;
pub use progress::{ProgressCallback, ProgressInfo};
pub use registry::{PacketRoutes, RegisteredStream, StreamRegistry, StreamRoute, StreamSelection};
pub use remux::Remuxer;
pub use remux_loop::{DiagnosticSampler, PacketClass, RemuxLoop, SegmentClock};
pub use report::{LoopOutcome, LoopTermination, RemuxReport};
pub use sink::FfmpegMuxer;
pub use source::FfmpegDemuxer;
