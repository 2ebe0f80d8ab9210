//! Benchmarks for stream translation, the packet loop and file remuxing.
//!
//! Run with: cargo bench
//!
//! The file benchmark requires `tests/fixtures/sample.ts` from
//! `tests/fixtures/generate_fixtures.sh`; the others run in memory.

#[path = "../tests/common/mod.rs"]
mod common;

use std::{hint::black_box, path::Path};

use criterion::{BenchmarkId, Criterion, Throughput};
use ffmpeg_next::{codec::Id, util::log::Level as LogLevel};
use tsremux::{RemuxOptions, Remuxer, StreamSelection, translate};

use common::{
    MockDemuxer, MockMuxer, PacketSpec, audio_stream, data_stream, event_log, video_stream,
};

const SAMPLE_TS: &str = "tests/fixtures/sample.ts";

/// Interleaved video (every 12th a keyframe), audio and data packets.
fn packet_script(count: u32) -> Vec<PacketSpec> {
    (0..count)
        .map(|index| {
            let pts = i64::from(index) * 1_800;
            match index % 3 {
                0 if index % 36 == 0 => PacketSpec::new(0, pts).key(),
                0 => PacketSpec::new(0, pts),
                1 => PacketSpec::new(1, pts),
                _ => PacketSpec::new(2, pts),
            }
        })
        .collect()
}

fn benchmark_translation(criterion: &mut Criterion) {
    let streams = vec![
        video_stream(0),
        audio_stream(1, Id::MP3, 1),
        audio_stream(2, Id::AC3, 1536),
        data_stream(3),
    ];

    criterion.bench_function("translate 4 streams", |bencher| {
        bencher.iter(|| {
            for stream in &streams {
                black_box(translate::translate_stream(black_box(stream), true));
            }
        });
    });

    criterion.bench_function("select streams", |bencher| {
        bencher.iter(|| black_box(StreamSelection::from_streams(black_box(&streams))));
    });
}

fn benchmark_packet_loop(criterion: &mut Criterion) {
    let options = RemuxOptions::new().with_diagnostic_packets(0);
    let mut group = criterion.benchmark_group("remux loop");

    for count in [1_000_u32, 10_000] {
        let script = packet_script(count);
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &script, |bencher, script| {
            bencher.iter(|| {
                let events = event_log();
                let mut demuxer = MockDemuxer::new(
                    vec![video_stream(0), audio_stream(1, Id::AAC, 0), data_stream(2)],
                    events.clone(),
                )
                .with_packets(script.iter().copied());
                let mut muxer = MockMuxer::new(events);
                black_box(tsremux::remux(&mut demuxer, &mut muxer, &options).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_file_remux(criterion: &mut Criterion) {
    ffmpeg_next::util::log::set_level(LogLevel::Error);

    if !Path::new(SAMPLE_TS).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let temporary_directory = tempfile::tempdir().unwrap();
    let output = temporary_directory.path().join("bench.ts");
    let options = RemuxOptions::new().with_diagnostic_packets(0);

    criterion.bench_function("remux sample.ts to mpegts", |bencher| {
        bencher.iter(|| {
            Remuxer::new(SAMPLE_TS, &output)
                .unwrap()
                .with_options(options.clone())
                .run()
                .unwrap()
        });
    });
}

criterion::criterion_group!(
    benches,
    benchmark_translation,
    benchmark_packet_loop,
    benchmark_file_remux,
);
criterion::criterion_main!(benches);
