//! Collaborator interfaces around the remux core.
//!
//! The core never talks to FFmpeg directly. It drives a [`Demuxer`] that
//! reports input streams and yields packets, and a [`Muxer`] that accepts
//! translated stream descriptors and packets. [`FfmpegDemuxer`] and
//! [`FfmpegMuxer`] are the production implementations; tests and embedders
//! can plug in their own.
//!
//! [`FfmpegDemuxer`]: crate::source::FfmpegDemuxer
//! [`FfmpegMuxer`]: crate::sink::FfmpegMuxer

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use ffmpeg_next::Error as FfmpegError;

use crate::error::RemuxError;
use crate::parameters::{InputStreamDescriptor, OutputStreamDescriptor};

/// Whether the demuxer should deliver packets of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// Deliver every packet.
    Keep,
    /// Never deliver packets of this stream.
    All,
}

/// A packet produced by a [`Demuxer`].
///
/// The packet's buffer is released when the value is dropped. The remux loop
/// drops every packet exactly once, at the end of the iteration that read
/// it.
pub trait DemuxedPacket {
    /// Index of the input stream the packet belongs to.
    fn stream_index(&self) -> usize;

    /// Presentation timestamp in the input stream's time base.
    fn pts(&self) -> Option<i64>;

    /// Whether the packet is a keyframe.
    fn is_key(&self) -> bool;

    /// Make the packet own its payload so it stays valid after the next
    /// read. Called once per packet before it is forwarded.
    fn make_owned(&mut self) -> Result<(), RemuxError>;
}

/// Source of input streams and demultiplexed packets.
pub trait Demuxer {
    /// Packet type yielded by [`read_packet`](Demuxer::read_packet).
    type Packet: DemuxedPacket;
    /// Handle of a decoder opened to validate codec support.
    type Decoder;
    /// Handle of an initialized bitstream filter.
    type Filter;

    /// All input streams, in container order. `streams()[i].index == i`.
    fn streams(&self) -> &[InputStreamDescriptor];

    /// Container duration, when the input reports one.
    fn duration(&self) -> Option<Duration> {
        None
    }

    /// Set the discard policy of stream `index`.
    fn set_discard(&mut self, index: usize, discard: Discard);

    /// Open a decoder for stream `index`. The decoder is only held to prove
    /// the codec is supported; it never decodes.
    ///
    /// # Errors
    ///
    /// [`RemuxError::DecoderNotFound`] or [`RemuxError::DecoderOpen`].
    fn open_decoder(&self, index: usize) -> Result<Self::Decoder, RemuxError>;

    /// Initialize the bitstream filter `name` for stream `index`.
    ///
    /// # Errors
    ///
    /// [`RemuxError::BitstreamFilter`] if the filter is unknown or refuses
    /// the stream.
    fn open_bitstream_filter(&self, index: usize, name: &str) -> Result<Self::Filter, RemuxError>;

    /// Read the next packet. `Ok(None)` means the input is exhausted.
    ///
    /// # Errors
    ///
    /// [`RemuxError::PacketRead`] for any read failure other than end of
    /// input.
    fn read_packet(&mut self) -> Result<Option<Self::Packet>, RemuxError>;
}

/// Result of submitting one packet to a [`Muxer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The packet was accepted.
    Written,
    /// The muxer asks the caller to stop sending packets.
    EndOfStream,
    /// The write failed with the given (negative) FFmpeg error code.
    Failed(i32),
}

impl WriteStatus {
    /// Interpret an FFmpeg write return code: `0` is success, positive
    /// values request end of stream, negative values are errors.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => WriteStatus::Written,
            code if code > 0 => WriteStatus::EndOfStream,
            code => WriteStatus::Failed(code),
        }
    }
}

impl Display for WriteStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            WriteStatus::Written => write!(f, "written"),
            WriteStatus::EndOfStream => write!(f, "end of stream requested"),
            WriteStatus::Failed(code) => write!(f, "{} ({code})", FfmpegError::from(*code)),
        }
    }
}

/// Sink for translated streams and packets.
///
/// Calls arrive in a fixed order: [`add_stream`](Muxer::add_stream) once
/// per selected stream, [`open_sink`](Muxer::open_sink),
/// [`write_header`](Muxer::write_header), any number of
/// [`write_packet`](Muxer::write_packet), then
/// [`write_trailer`](Muxer::write_trailer).
pub trait Muxer {
    /// Packet type accepted by [`write_packet`](Muxer::write_packet).
    type Packet;

    /// Whether the output format stores codec headers once in the
    /// container header.
    fn requires_global_header(&self) -> bool;

    /// Allocate an output stream for `descriptor` and return its index.
    ///
    /// # Errors
    ///
    /// [`RemuxError::StreamAllocation`] when no stream slot can be
    /// allocated.
    fn add_stream(&mut self, descriptor: &OutputStreamDescriptor<'_>) -> Result<usize, RemuxError>;

    /// Open the underlying byte sink.
    ///
    /// # Errors
    ///
    /// [`RemuxError::SinkOpen`].
    fn open_sink(&mut self) -> Result<(), RemuxError>;

    /// Emit the container header.
    ///
    /// # Errors
    ///
    /// [`RemuxError::WriteHeader`].
    fn write_header(&mut self) -> Result<(), RemuxError>;

    /// Submit one packet for interleaved writing.
    fn write_packet(&mut self, packet: &mut Self::Packet) -> WriteStatus;

    /// Flush interleaving queues and emit the container trailer.
    ///
    /// # Errors
    ///
    /// [`RemuxError::WriteTrailer`].
    fn write_trailer(&mut self) -> Result<(), RemuxError>;
}
