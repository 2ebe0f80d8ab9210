//! Stream parameter translation.
//!
//! Builds the codec parameter set of an output stream from an input stream
//! for stream copy: no field is re-derived from the bitstream, only copied
//! or, in a few well-known cases, adjusted so the output container accepts
//! it.

use ffmpeg_next::{Rational, codec::Id};

use crate::container::Muxer;
use crate::error::RemuxError;
use crate::parameters::{InputStreamDescriptor, OutputStreamDescriptor, StreamKind};
use crate::time_base;

/// Choose the output time base for `input`.
///
/// When the codec ticks several times per frame
/// (`codec_time_base × ticks_per_frame` exceeds the stream time base) and
/// the stream time base is finer than a millisecond, the output uses the
/// codec time base with its numerator multiplied by `ticks_per_frame`, i.e.
/// one tick per displayed frame. Otherwise the stream time base is kept.
pub fn select_time_base(input: &InputStreamDescriptor) -> Rational {
    let frame_tick_is_coarser =
        time_base::scaled_exceeds(input.codec_time_base, input.ticks_per_frame, input.time_base);

    if frame_tick_is_coarser && time_base::is_sub_millisecond(input.time_base) {
        time_base::scale_numerator(input.codec_time_base, input.ticks_per_frame)
    } else {
        input.time_base
    }
}

/// Block alignment to store for a copied audio stream.
///
/// MP3 with a block alignment of 1 and AC-3 at any alignment are written
/// with `0`; the value is meaningless for those codecs and some muxers
/// reject it.
pub fn audio_block_align(codec_id: Id, block_align: u32) -> u32 {
    match codec_id {
        Id::MP3 if block_align == 1 => 0,
        Id::AC3 => 0,
        _ => block_align,
    }
}

/// Translate one input stream into an output stream descriptor.
///
/// `global_header` is the output format's global-header capability; it
/// only affects video streams.
pub fn translate_stream(
    input: &InputStreamDescriptor,
    global_header: bool,
) -> OutputStreamDescriptor<'_> {
    let (kind, global_header) = match input.kind {
        StreamKind::Audio(mut audio) => {
            audio.block_align = audio_block_align(input.codec_id, audio.block_align);
            (StreamKind::Audio(audio), false)
        }
        StreamKind::Video(video) => (StreamKind::Video(video), global_header),
        other => (other, false),
    };

    OutputStreamDescriptor {
        source_index: input.index,
        source_time_base: input.time_base,
        codec_id: input.codec_id,
        codec_tag: input.codec_tag,
        bit_rate: input.bit_rate,
        extradata: &input.extradata,
        time_base: select_time_base(input),
        kind,
        global_header,
    }
}

/// Translate `input` and allocate the matching stream on `muxer`.
///
/// Returns the output stream index together with the descriptor.
///
/// # Errors
///
/// [`RemuxError::StreamAllocation`] if the muxer cannot allocate another
/// stream.
pub fn add_output_stream<'a, M: Muxer>(
    muxer: &mut M,
    input: &'a InputStreamDescriptor,
) -> Result<(usize, OutputStreamDescriptor<'a>), RemuxError> {
    let descriptor = translate_stream(input, muxer.requires_global_header());
    let output_index = muxer.add_stream(&descriptor)?;

    log::debug!(
        "Input stream {} ({:?}, {:?}) -> output stream {output_index}, time base {}",
        input.index,
        input.role(),
        input.codec_id,
        descriptor.time_base,
    );

    Ok((output_index, descriptor))
}
