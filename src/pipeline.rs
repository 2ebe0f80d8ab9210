//! Resource lifecycle of a remux run.
//!
//! [`remux`] drives any [`Demuxer`]/[`Muxer`] pair through the fixed setup
//! sequence, the packet loop and finalization:
//!
//! 1. select streams and push discard decisions to the demuxer,
//! 2. translate and allocate the selected streams on the muxer,
//! 3. open a decoder for the video stream (codec support check only),
//! 4. open the byte sink and write the container header,
//! 5. initialize the bitstream filter,
//! 6. run the packet loop,
//! 7. write the trailer, then release the filter and decoder.
//!
//! Any setup failure returns immediately; everything acquired so far is
//! released on the way out and the output is left without a trailer.

use std::time::Instant;

use crate::config::RemuxOptions;
use crate::container::{Demuxer, Muxer};
use crate::error::RemuxError;
use crate::registry::{StreamRegistry, StreamSelection};
use crate::remux_loop::RemuxLoop;
use crate::report::RemuxReport;

/// Remux every selected stream of `demuxer` into `muxer`.
///
/// The caller owns both collaborators and releases them after this returns,
/// muxer before demuxer.
///
/// # Errors
///
/// Any setup error ([`RemuxError::is_setup_failure`]) or a trailer write
/// failure. Per-packet write failures are reported in the returned
/// [`RemuxReport`] instead.
pub fn remux<D, M>(
    demuxer: &mut D,
    muxer: &mut M,
    options: &RemuxOptions,
) -> Result<RemuxReport, RemuxError>
where
    D: Demuxer,
    M: Muxer<Packet = D::Packet>,
{
    let start_time = Instant::now();

    let selection = StreamSelection::from_streams(demuxer.streams());
    selection.apply(demuxer);

    // Output descriptors borrow the input streams' extradata, so the
    // registry must not outlive this block; the header is written inside.
    let (routes, video_stream, audio_stream, output_streams, decoder) = {
        let registry = StreamRegistry::register(demuxer.streams(), selection, muxer)?;
        let video = registry.require_video()?;
        let video_index = video.descriptor.source_index();

        let decoder = demuxer.open_decoder(video_index)?;
        log::debug!("Validated decoder for input stream {video_index}");

        muxer.open_sink()?;
        muxer.write_header()?;

        (
            registry.routes(),
            registry.selection().video(),
            registry.selection().audio(),
            registry.output_stream_count(),
            decoder,
        )
    };

    let video_index = routes.video.map(|route| route.input_index).ok_or(RemuxError::NoVideoStream)?;
    let filter = demuxer.open_bitstream_filter(video_index, &options.bitstream_filter)?;

    log::info!(
        "Remuxing {output_streams} stream(s) (video {video_index}, audio {})",
        audio_stream.map_or_else(|| "none".to_string(), |index| index.to_string()),
    );

    let duration = demuxer.duration();
    let outcome = RemuxLoop::new(routes, options, duration).run(demuxer, muxer);

    muxer.write_trailer()?;

    drop(filter);
    drop(decoder);

    Ok(RemuxReport {
        video_stream,
        audio_stream,
        output_streams,
        outcome,
        elapsed: start_time.elapsed(),
    })
}
