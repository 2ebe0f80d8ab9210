//! Codec parameter sets for input and output streams.
//!
//! An [`InputStreamDescriptor`] is the read-only view of one demuxed stream
//! as reported by the [`Demuxer`](crate::Demuxer). An
//! [`OutputStreamDescriptor`] is produced from it by the
//! [translator](crate::translate) and handed to the
//! [`Muxer`](crate::Muxer) when the output stream is allocated.
//!
//! # Extradata lifetime
//!
//! The output descriptor does not copy the codec extradata; it borrows it
//! from the input descriptor. The borrow ties the output descriptor to the
//! demuxer that owns the input streams, so the input must stay open at
//! least until the container header has been written. A muxer that needs
//! the bytes after [`Muxer::add_stream`](crate::Muxer::add_stream) returns
//! has to copy them.

use ffmpeg_next::{Rational, codec::Id, format::Pixel, media::Type};

/// Media role of a stream, as far as stream selection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaRole {
    /// A video elementary stream.
    Video,
    /// An audio elementary stream.
    Audio,
    /// Anything else (data, subtitles, attachments, unknown).
    Other,
}

impl From<Type> for MediaRole {
    fn from(medium: Type) -> Self {
        match medium {
            Type::Video => MediaRole::Video,
            Type::Audio => MediaRole::Audio,
            _ => MediaRole::Other,
        }
    }
}

/// Audio-only codec fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioParameters {
    /// Native channel-layout bitmask, `0` when unknown or not native.
    pub channel_layout: u64,
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Samples per frame, `0` when variable or unknown.
    pub frame_size: u32,
    /// Block alignment in bytes.
    pub block_align: u32,
}

/// Video-only codec fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoParameters {
    /// Pixel format of the coded pictures.
    pub pixel_format: Pixel,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Reorder delay caused by B-frames; non-zero means B-frames are present.
    pub b_frame_delay: u32,
}

impl VideoParameters {
    /// Whether the stream contains B-frames.
    pub fn has_b_frames(&self) -> bool {
        self.b_frame_delay > 0
    }
}

/// Role-specific part of a codec parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Video stream fields.
    Video(VideoParameters),
    /// Audio stream fields.
    Audio(AudioParameters),
    /// Any other medium; carries no role-specific fields.
    Other(Type),
}

impl StreamKind {
    /// The selection role of this kind.
    pub fn role(&self) -> MediaRole {
        match self {
            StreamKind::Video(_) => MediaRole::Video,
            StreamKind::Audio(_) => MediaRole::Audio,
            StreamKind::Other(_) => MediaRole::Other,
        }
    }

    /// The FFmpeg medium type.
    pub fn medium(&self) -> Type {
        match self {
            StreamKind::Video(_) => Type::Video,
            StreamKind::Audio(_) => Type::Audio,
            StreamKind::Other(medium) => *medium,
        }
    }
}

/// Codec parameters of one demuxed input stream.
#[derive(Debug, Clone, PartialEq)]
pub struct InputStreamDescriptor {
    /// Stream index inside the input container.
    pub index: usize,
    /// Codec identifier.
    pub codec_id: Id,
    /// Container-specific codec tag (FourCC), `0` when unset.
    pub codec_tag: u32,
    /// Bit rate in bits per second, `0` when unknown.
    pub bit_rate: i64,
    /// Out-of-band codec header bytes (SPS/PPS, AudioSpecificConfig, ...).
    pub extradata: Vec<u8>,
    /// Time base of the stream's timestamps.
    pub time_base: Rational,
    /// Time base of the codec (one tick per field for field-coded video).
    pub codec_time_base: Rational,
    /// Codec ticks per displayed frame.
    pub ticks_per_frame: i32,
    /// Role-specific fields.
    pub kind: StreamKind,
}

impl InputStreamDescriptor {
    /// Create a descriptor with empty extradata, zero bit rate and tag,
    /// and the codec time base equal to `time_base`.
    pub fn new(index: usize, codec_id: Id, time_base: Rational, kind: StreamKind) -> Self {
        Self {
            index,
            codec_id,
            codec_tag: 0,
            bit_rate: 0,
            extradata: Vec::new(),
            time_base,
            codec_time_base: time_base,
            ticks_per_frame: 1,
            kind,
        }
    }

    /// Set the codec time base and ticks per frame.
    #[must_use]
    pub fn with_codec_timing(mut self, codec_time_base: Rational, ticks_per_frame: i32) -> Self {
        self.codec_time_base = codec_time_base;
        self.ticks_per_frame = ticks_per_frame;
        self
    }

    /// Set the codec extradata.
    #[must_use]
    pub fn with_extradata(mut self, extradata: Vec<u8>) -> Self {
        self.extradata = extradata;
        self
    }

    /// Set the bit rate.
    #[must_use]
    pub fn with_bit_rate(mut self, bit_rate: i64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    /// Set the codec tag.
    #[must_use]
    pub fn with_codec_tag(mut self, codec_tag: u32) -> Self {
        self.codec_tag = codec_tag;
        self
    }

    /// The selection role of this stream.
    pub fn role(&self) -> MediaRole {
        self.kind.role()
    }
}

/// Codec parameters of one output stream.
///
/// Only the [translator](crate::translate::translate_stream) builds these;
/// the fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStreamDescriptor<'a> {
    pub(crate) source_index: usize,
    pub(crate) source_time_base: Rational,
    pub(crate) codec_id: Id,
    pub(crate) codec_tag: u32,
    pub(crate) bit_rate: i64,
    pub(crate) extradata: &'a [u8],
    pub(crate) time_base: Rational,
    pub(crate) kind: StreamKind,
    pub(crate) global_header: bool,
}

impl<'a> OutputStreamDescriptor<'a> {
    /// Index of the input stream this descriptor was translated from.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Time base of the input stream's packet timestamps.
    pub fn source_time_base(&self) -> Rational {
        self.source_time_base
    }

    /// Codec identifier.
    pub fn codec_id(&self) -> Id {
        self.codec_id
    }

    /// Codec tag.
    pub fn codec_tag(&self) -> u32 {
        self.codec_tag
    }

    /// Bit rate in bits per second.
    pub fn bit_rate(&self) -> i64 {
        self.bit_rate
    }

    /// Extradata borrowed from the input stream.
    pub fn extradata(&self) -> &'a [u8] {
        self.extradata
    }

    /// Time base chosen for the output stream.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    /// Role-specific fields.
    pub fn kind(&self) -> &StreamKind {
        &self.kind
    }

    /// The selection role of this stream.
    pub fn role(&self) -> MediaRole {
        self.kind.role()
    }

    /// Whether codec headers go into the container header once instead of
    /// being repeated in-band.
    pub fn global_header(&self) -> bool {
        self.global_header
    }
}
