//! End-to-end remux tests over real FFmpeg contexts.
//!
//! Tests that read `tests/fixtures/sample.ts` (from
//! `tests/fixtures/generate_fixtures.sh`) return early when it is
//! missing.

mod common;

use std::path::Path;

use ffmpeg_next::{codec::Id, format::Pixel};

use tsremux::{
    Demuxer, FfmpegDemuxer, FfmpegMuxer, LoopTermination, MediaRole, Muxer, RemuxOptions,
    Remuxer, StreamKind, translate::translate_stream,
};

use common::audio_stream;

fn sample_ts_path() -> &'static str {
    "tests/fixtures/sample.ts"
}

#[test]
fn demuxer_describes_fixture_streams() {
    let path = sample_ts_path();
    if !Path::new(path).exists() {
        return;
    }

    let demuxer = FfmpegDemuxer::open(path).expect("Failed to open fixture");
    let streams = demuxer.streams();

    assert!(streams.iter().any(|stream| stream.role() == MediaRole::Video));
    assert!(streams.iter().any(|stream| stream.role() == MediaRole::Audio));
    for (index, stream) in streams.iter().enumerate() {
        assert_eq!(stream.index, index);
        assert!(stream.time_base.denominator() > 0);
    }
    assert!(demuxer.duration().is_some());

    let video = streams
        .iter()
        .find_map(|stream| match &stream.kind {
            StreamKind::Video(video) => Some(video),
            _ => None,
        })
        .expect("Fixture should have a video stream");
    assert_eq!((video.width, video.height), (320, 240));
    assert_ne!(video.pixel_format, Pixel::None);
}

#[test]
fn remux_fixture_to_mpegts() {
    let path = sample_ts_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("remuxed.ts");

    let report = Remuxer::new(path, &output)
        .expect("Failed to create remuxer")
        .run()
        .expect("Remux failed");

    assert!(report.video_stream.is_some());
    assert!(report.audio_stream.is_some());
    assert_eq!(report.output_streams, 2);
    assert!(report.outcome.packets_written > 0);
    assert_eq!(report.outcome.termination, LoopTermination::InputExhausted);
    assert!(report.outcome.last_segment_time > 0.0);

    let metadata = std::fs::metadata(&output).expect("Output should exist");
    assert!(metadata.len() > 0);

    let remuxed = FfmpegDemuxer::open(&output).expect("Failed to reopen output");
    assert_eq!(remuxed.streams().len(), 2);
    assert_eq!(remuxed.streams()[0].role(), MediaRole::Video);
    assert_eq!(remuxed.streams()[1].role(), MediaRole::Audio);
}

#[test]
fn global_header_capability_follows_the_format() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");

    let mpegts = FfmpegMuxer::create(temporary_directory.path().join("out.ts"), "mpegts")
        .expect("Failed to allocate mpegts output");
    let matroska = FfmpegMuxer::create(temporary_directory.path().join("out.mkv"), "matroska")
        .expect("Failed to allocate matroska output");

    assert!(!mpegts.requires_global_header());
    assert!(matroska.requires_global_header());
}

#[test]
fn audio_streams_accept_mask_and_channel_count_layouts() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let mut muxer = FfmpegMuxer::create(temporary_directory.path().join("out.ts"), "mpegts")
        .expect("Failed to allocate mpegts output");

    let masked = audio_stream(0, Id::AAC, 0);
    let mut counted = audio_stream(1, Id::MP2, 0);
    if let StreamKind::Audio(audio) = &mut counted.kind {
        audio.channel_layout = 0;
    }

    assert_eq!(muxer.add_stream(&translate_stream(&masked, false)).unwrap(), 0);
    assert_eq!(muxer.add_stream(&translate_stream(&counted, false)).unwrap(), 1);
}

#[test]
fn custom_options_flow_through_remux() {
    let path = sample_ts_path();
    if !Path::new(path).exists() {
        return;
    }

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("custom.ts");

    let options = RemuxOptions::new()
        .with_diagnostic_packets(0)
        .with_batch_size(10);
    let mut demuxer = FfmpegDemuxer::open(path).expect("Failed to open fixture");
    let mut muxer = FfmpegMuxer::create(&output, options.output_format())
        .expect("Failed to allocate output");

    let report = tsremux::remux(&mut demuxer, &mut muxer, &options).expect("Remux failed");
    assert!(report.is_complete());
    assert_eq!(report.outcome.packets_read, report.outcome.packets_submitted);

    drop(muxer);
    assert!(output.exists());
}
