//! Outcome of a remux run.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

/// Why the packet loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopTermination {
    /// The demuxer ran out of packets.
    InputExhausted,
    /// Reading failed; treated like end of input.
    ReadError(String),
    /// A packet could not take ownership of its payload.
    DuplicationFailed(String),
    /// The muxer asked for the stream to end.
    EndOfStreamRequested,
}

impl LoopTermination {
    /// Whether the loop ended without a packet-level failure.
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            LoopTermination::InputExhausted
                | LoopTermination::ReadError(_)
                | LoopTermination::EndOfStreamRequested
        )
    }
}

impl Display for LoopTermination {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LoopTermination::InputExhausted => write!(f, "input exhausted"),
            LoopTermination::ReadError(reason) => write!(f, "read error: {reason}"),
            LoopTermination::DuplicationFailed(reason) => {
                write!(f, "packet duplication failed: {reason}")
            }
            LoopTermination::EndOfStreamRequested => write!(f, "end of stream requested"),
        }
    }
}

/// Counters and state left behind by the packet loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    /// Packets read from the demuxer.
    pub packets_read: u64,
    /// Packets handed to the muxer.
    pub packets_submitted: u64,
    /// Packets the muxer accepted.
    pub packets_written: u64,
    /// Packets the muxer rejected with an error code.
    pub write_failures: u64,
    /// Segment time of the last packet, in seconds.
    pub last_segment_time: f64,
    /// Why the loop stopped.
    pub termination: LoopTermination,
}

/// Summary of a finished remux run.
#[derive(Debug, Clone, PartialEq)]
pub struct RemuxReport {
    /// Selected input video stream.
    pub video_stream: Option<usize>,
    /// Selected input audio stream.
    pub audio_stream: Option<usize>,
    /// Number of output streams written.
    pub output_streams: usize,
    /// Packet loop counters.
    pub outcome: LoopOutcome,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

impl RemuxReport {
    /// Whether every submitted packet was written and the loop ended cleanly.
    pub fn is_complete(&self) -> bool {
        self.outcome.write_failures == 0 && self.outcome.termination.is_clean()
    }
}

impl Display for RemuxReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let stream = |index: Option<usize>| match index {
            Some(index) => format!("#{index}"),
            None => "none".to_string(),
        };

        writeln!(
            f,
            "streams: video {}, audio {} -> {} output stream(s)",
            stream(self.video_stream),
            stream(self.audio_stream),
            self.output_streams,
        )?;
        writeln!(
            f,
            "packets: {} read, {} written, {} failed",
            self.outcome.packets_read, self.outcome.packets_written, self.outcome.write_failures,
        )?;
        writeln!(f, "last segment time: {:.3}s", self.outcome.last_segment_time)?;
        writeln!(f, "stopped: {}", self.outcome.termination)?;
        writeln!(f, "elapsed: {:.3}s", self.elapsed.as_secs_f64())
    }
}
