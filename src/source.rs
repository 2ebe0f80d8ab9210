//! FFmpeg-backed demuxer.
//!
//! [`FfmpegDemuxer`] opens an input with libavformat, probes its streams
//! once and exposes them as [`InputStreamDescriptor`]s. Packets are
//! [`ffmpeg_next::Packet`]s read in container order.

use std::{
    mem,
    os::raw::c_int,
    path::{Path, PathBuf},
    slice,
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational, Stream,
    codec::{Id, context::Context as CodecContext, decoder},
    format::{Pixel, context::Input},
    media::Type,
};
use ffmpeg_sys_next::{AVChannelOrder, AVDiscard, AVPixelFormat};

use crate::bitstream_filter::BitstreamFilter;
use crate::container::{DemuxedPacket, Demuxer, Discard};
use crate::error::RemuxError;
use crate::parameters::{AudioParameters, InputStreamDescriptor, StreamKind, VideoParameters};

/// Codec ticks per displayed frame for `codec_id`.
///
/// Field-coded video codecs (H.264, MPEG-1/2 video) tick once per field,
/// so twice per frame. Everything else ticks once per frame.
pub fn ticks_per_frame(codec_id: Id) -> i32 {
    match codec_id {
        Id::H264 | Id::MPEG2VIDEO | Id::MPEG1VIDEO => 2,
        _ => 1,
    }
}

/// Codec time base of a video stream running at `frame_rate`.
///
/// One tick per field: `1 / (frame_rate × ticks_per_frame)`. Falls back to
/// the stream time base with a single tick per frame when the frame rate
/// is unknown.
pub fn video_codec_timing(
    frame_rate: Rational,
    ticks_per_frame: i32,
    stream_time_base: Rational,
) -> (Rational, i32) {
    let (numerator, denominator) = (frame_rate.numerator(), frame_rate.denominator());
    if numerator <= 0 || denominator <= 0 {
        return (stream_time_base, 1);
    }

    match numerator.checked_mul(ticks_per_frame) {
        Some(ticks_per_second) => (Rational::new(denominator, ticks_per_second), ticks_per_frame),
        None => (stream_time_base, 1),
    }
}

/// Demuxer over an FFmpeg input context.
pub struct FfmpegDemuxer {
    input_context: Input,
    streams: Vec<InputStreamDescriptor>,
    path: PathBuf,
}

impl FfmpegDemuxer {
    /// Open `path` and probe its streams.
    ///
    /// # Errors
    ///
    /// [`RemuxError::FileOpen`] if the input cannot be opened,
    /// [`RemuxError::StreamInfo`] if it contains no streams.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RemuxError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening input: {}", path.display());

        ffmpeg_next::init().map_err(|error| RemuxError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| RemuxError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let streams = input_context
            .streams()
            .map(|stream| describe_stream(&stream))
            .collect::<Vec<_>>();

        if streams.is_empty() {
            return Err(RemuxError::StreamInfo(format!(
                "{} contains no streams",
                path.display()
            )));
        }

        log::info!(
            "Opened {} ({}, {} stream(s))",
            path.display(),
            input_context.format().name(),
            streams.len(),
        );

        Ok(Self {
            input_context,
            streams,
            path,
        })
    }

    /// Path the demuxer was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn pixel_format(format: c_int) -> Pixel {
    if format < 0 || format >= AVPixelFormat::AV_PIX_FMT_NB as c_int {
        return Pixel::None;
    }
    // codecpar stores the AVPixelFormat discriminant as a plain int.
    Pixel::from(unsafe { mem::transmute::<c_int, AVPixelFormat>(format) })
}

fn describe_stream(stream: &Stream) -> InputStreamDescriptor {
    let index = stream.index();
    let parameters = stream.parameters();
    let medium = parameters.medium();
    let codec_id = parameters.id();
    let time_base = stream.time_base();

    let raw = unsafe { &*parameters.as_ptr() };
    let extradata = if raw.extradata.is_null() || raw.extradata_size <= 0 {
        Vec::new()
    } else {
        unsafe { slice::from_raw_parts(raw.extradata, raw.extradata_size as usize) }.to_vec()
    };

    let kind = match medium {
        // Read from codecpar only; the selected stream's decoder is opened later.
        Type::Video => StreamKind::Video(VideoParameters {
            pixel_format: pixel_format(raw.format),
            width: raw.width.max(0) as u32,
            height: raw.height.max(0) as u32,
            b_frame_delay: raw.video_delay.max(0) as u32,
        }),
        Type::Audio => {
            let channel_layout = if raw.ch_layout.order
                == AVChannelOrder::AV_CHANNEL_ORDER_NATIVE
            {
                unsafe { raw.ch_layout.u.mask }
            } else {
                0
            };
            StreamKind::Audio(AudioParameters {
                channel_layout,
                sample_rate: raw.sample_rate.max(0) as u32,
                channels: raw.ch_layout.nb_channels.clamp(0, i32::from(u16::MAX)) as u16,
                frame_size: raw.frame_size.max(0) as u32,
                block_align: raw.block_align.max(0) as u32,
            })
        }
        other => StreamKind::Other(other),
    };

    let (codec_time_base, ticks) = match &kind {
        StreamKind::Video(_) => {
            let frame_rate = match stream.avg_frame_rate() {
                rate if rate.numerator() > 0 && rate.denominator() > 0 => rate,
                _ => stream.rate(),
            };
            video_codec_timing(frame_rate, ticks_per_frame(codec_id), time_base)
        }
        StreamKind::Audio(audio) if audio.sample_rate > 0 => {
            (Rational::new(1, audio.sample_rate as i32), 1)
        }
        _ => (time_base, 1),
    };

    log::debug!(
        "Input stream {index}: {medium:?} {codec_id:?}, time base {time_base}, codec time base {codec_time_base} x{ticks}"
    );

    InputStreamDescriptor::new(index, codec_id, time_base, kind)
        .with_codec_timing(codec_time_base, ticks)
        .with_codec_tag(raw.codec_tag)
        .with_bit_rate(raw.bit_rate)
        .with_extradata(extradata)
}

impl Demuxer for FfmpegDemuxer {
    type Packet = Packet;
    type Decoder = decoder::Opened;
    type Filter = BitstreamFilter;

    fn streams(&self) -> &[InputStreamDescriptor] {
        &self.streams
    }

    fn duration(&self) -> Option<Duration> {
        let microseconds = self.input_context.duration();
        (microseconds > 0).then(|| Duration::from_micros(microseconds as u64))
    }

    fn set_discard(&mut self, index: usize, discard: Discard) {
        let Some(mut stream) = self.input_context.stream_mut(index) else {
            return;
        };
        let policy = match discard {
            Discard::Keep => AVDiscard::AVDISCARD_NONE,
            Discard::All => AVDiscard::AVDISCARD_ALL,
        };
        unsafe {
            (*stream.as_mut_ptr()).discard = policy;
        }
    }

    fn open_decoder(&self, index: usize) -> Result<Self::Decoder, RemuxError> {
        let stream = self
            .input_context
            .stream(index)
            .ok_or(RemuxError::NoVideoStream)?;
        let codec_id = stream.parameters().id();

        let codec = ffmpeg_next::decoder::find(codec_id).ok_or(RemuxError::DecoderNotFound(codec_id))?;
        let context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| RemuxError::DecoderOpen(error.to_string()))?;

        context
            .decoder()
            .open_as(codec)
            .map_err(|error| RemuxError::DecoderOpen(format!("{codec_id:?}: {error}")))
    }

    fn open_bitstream_filter(&self, index: usize, name: &str) -> Result<Self::Filter, RemuxError> {
        let stream = self
            .input_context
            .stream(index)
            .ok_or_else(|| RemuxError::BitstreamFilter {
                name: name.to_string(),
                reason: format!("input stream {index} does not exist"),
            })?;

        BitstreamFilter::new(name, &stream.parameters(), stream.time_base())
    }

    fn read_packet(&mut self) -> Result<Option<Self::Packet>, RemuxError> {
        let mut packet = Packet::empty();
        match packet.read(&mut self.input_context) {
            Ok(()) => Ok(Some(packet)),
            Err(FfmpegError::Eof) => Ok(None),
            Err(error) => Err(RemuxError::PacketRead(error.to_string())),
        }
    }
}

impl DemuxedPacket for Packet {
    fn stream_index(&self) -> usize {
        self.stream()
    }

    fn pts(&self) -> Option<i64> {
        Packet::pts(self)
    }

    fn is_key(&self) -> bool {
        Packet::is_key(self)
    }

    fn make_owned(&mut self) -> Result<(), RemuxError> {
        let code = unsafe { ffmpeg_sys_next::av_packet_make_refcounted(self.as_mut_ptr()) };
        if code < 0 {
            return Err(RemuxError::PacketDuplication(
                FfmpegError::from(code).to_string(),
            ));
        }
        Ok(())
    }
}
