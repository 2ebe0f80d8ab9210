//! The read → classify → write packet loop.
//!
//! Every packet read from the demuxer is forwarded to the muxer in arrival
//! order. Alongside, the loop keeps a segment time: the presentation time
//! (in seconds) of the latest video keyframe or audio packet, carried over
//! unchanged across any other packet. Nothing splits the output on it yet;
//! it is reported through [`LoopOutcome::last_segment_time`] and progress
//! callbacks.
//!
//! Write failures with a negative code are logged and counted but do not
//! stop the loop. A positive code (end of stream requested) does.

use std::time::Duration;

use crate::config::RemuxOptions;
use crate::container::{DemuxedPacket, Demuxer, Muxer, WriteStatus};
use crate::progress::ProgressTracker;
use crate::registry::PacketRoutes;
use crate::report::{LoopOutcome, LoopTermination};
use crate::time_base;

/// How a packet takes part in segment timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketClass {
    /// A keyframe of the selected video stream.
    VideoKeyframe,
    /// Any packet of the selected audio stream.
    Audio,
    /// Everything else, including video packets that are not keyframes.
    Other,
}

impl PacketClass {
    /// Classify a packet of input stream `stream_index`.
    pub fn of(routes: &PacketRoutes, stream_index: usize, is_key: bool) -> Self {
        let is_video = routes.video.is_some_and(|r| r.input_index == stream_index);
        let is_audio = routes.audio.is_some_and(|r| r.input_index == stream_index);

        if is_video && is_key {
            PacketClass::VideoKeyframe
        } else if is_audio {
            PacketClass::Audio
        } else {
            PacketClass::Other
        }
    }
}

/// Segment timing state carried across loop iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentClock {
    previous: f64,
}

impl SegmentClock {
    /// A clock starting at zero seconds.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently computed segment time, in seconds.
    pub fn previous(&self) -> f64 {
        self.previous
    }

    /// Compute the segment time of a packet and remember it.
    ///
    /// Video keyframes and audio packets use their own `pts` in their
    /// stream's time base. Other packets, and packets without a `pts`,
    /// repeat the previous value.
    pub fn observe(&mut self, class: PacketClass, pts: Option<i64>, routes: &PacketRoutes) -> f64 {
        let route = match class {
            PacketClass::VideoKeyframe => routes.video,
            PacketClass::Audio => routes.audio,
            PacketClass::Other => None,
        };

        let time = match (route, pts) {
            (Some(route), Some(pts)) => time_base::seconds(pts, route.time_base),
            _ => self.previous,
        };

        self.previous = time;
        time
    }
}

/// Logs the stream index of the first few packets of a run.
#[derive(Debug, Clone)]
pub struct DiagnosticSampler {
    remaining: u32,
}

impl DiagnosticSampler {
    /// Sample at most `limit` packets.
    pub fn new(limit: u32) -> Self {
        Self { remaining: limit }
    }

    /// Log `stream_index` if the sampler still has budget. Returns whether
    /// the packet was sampled.
    pub fn observe(&mut self, stream_index: usize) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        log::debug!("Packet from input stream {stream_index}");
        true
    }
}

/// One run of the packet loop.
pub struct RemuxLoop {
    routes: PacketRoutes,
    clock: SegmentClock,
    sampler: DiagnosticSampler,
    progress: ProgressTracker,
}

impl RemuxLoop {
    /// Prepare a loop over the given routes.
    ///
    /// `duration` is the input duration used for progress percentages.
    pub fn new(routes: PacketRoutes, options: &RemuxOptions, duration: Option<Duration>) -> Self {
        Self {
            routes,
            clock: SegmentClock::new(),
            sampler: DiagnosticSampler::new(options.diagnostic_packets),
            progress: ProgressTracker::new(options.progress.clone(), duration, options.batch_size),
        }
    }

    /// Pull packets from `demuxer` and push them into `muxer` until the
    /// input ends or the loop has to stop.
    ///
    /// Each packet is dropped exactly once, at the end of the iteration
    /// that read it, whichever way the iteration ends.
    pub fn run<D, M>(mut self, demuxer: &mut D, muxer: &mut M) -> LoopOutcome
    where
        D: Demuxer,
        M: Muxer<Packet = D::Packet>,
    {
        let mut packets_read = 0;
        let mut packets_submitted = 0;
        let mut packets_written = 0;
        let mut write_failures = 0;

        let termination = loop {
            let mut packet = match demuxer.read_packet() {
                Ok(Some(packet)) => packet,
                Ok(None) => break LoopTermination::InputExhausted,
                Err(error) => {
                    log::warn!("Stopping at read error: {error}");
                    break LoopTermination::ReadError(error.to_string());
                }
            };
            packets_read += 1;

            if let Err(error) = packet.make_owned() {
                log::error!("{error}");
                break LoopTermination::DuplicationFailed(error.to_string());
            }

            let stream_index = packet.stream_index();
            self.sampler.observe(stream_index);

            let class = PacketClass::of(&self.routes, stream_index, packet.is_key());
            let segment_time = self.clock.observe(class, packet.pts(), &self.routes);

            packets_submitted += 1;
            let status = muxer.write_packet(&mut packet);
            self.progress.advance(time_base::to_duration(segment_time));

            match status {
                WriteStatus::Written => packets_written += 1,
                WriteStatus::Failed(_) => {
                    write_failures += 1;
                    log::warn!("Failed to write packet from input stream {stream_index}: {status}");
                }
                WriteStatus::EndOfStream => {
                    log::info!("End of stream requested");
                    break LoopTermination::EndOfStreamRequested;
                }
            }
        };

        self.progress
            .finish(time_base::to_duration(self.clock.previous()));

        log::debug!(
            "Packet loop stopped ({termination}): {packets_read} read, {packets_written} written, {write_failures} failed"
        );

        LoopOutcome {
            packets_read,
            packets_submitted,
            packets_written,
            write_failures,
            last_segment_time: self.clock.previous(),
            termination,
        }
    }
}
