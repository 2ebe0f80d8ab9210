//! In-memory `Demuxer` / `Muxer` pair shared by the integration tests.
//!
//! Both sides append to one event log so tests can assert on the exact
//! order of setup, packet and teardown calls.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
    time::Duration,
};

use ffmpeg_next::{Rational, codec::Id, format::Pixel, media::Type};
use tsremux::{
    AudioParameters, DemuxedPacket, Demuxer, Discard, InputStreamDescriptor, Muxer,
    OutputStreamDescriptor, RemuxError, StreamKind, VideoParameters, WriteStatus,
};

pub const SAMPLE_TS: &str = "tests/fixtures/sample.ts";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Discard(usize, Discard),
    OpenDecoder(usize),
    ReleaseDecoder,
    OpenFilter(usize, String),
    ReleaseFilter,
    AddStream(usize),
    OpenSink,
    WriteHeader,
    Write(usize),
    WriteTrailer,
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

// ── Streams ────────────────────────────────────────────────────────

pub fn mpegts_time_base() -> Rational {
    Rational::new(1, 90_000)
}

pub fn video_stream(index: usize) -> InputStreamDescriptor {
    InputStreamDescriptor::new(
        index,
        Id::H264,
        mpegts_time_base(),
        StreamKind::Video(VideoParameters {
            pixel_format: Pixel::YUV420P,
            width: 1280,
            height: 720,
            b_frame_delay: 2,
        }),
    )
    .with_codec_timing(Rational::new(1, 50), 2)
    .with_extradata(vec![0x00, 0x00, 0x00, 0x01, 0x67, 0x64, 0x00, 0x1f])
    .with_bit_rate(2_500_000)
}

pub fn audio_stream(index: usize, codec_id: Id, block_align: u32) -> InputStreamDescriptor {
    InputStreamDescriptor::new(
        index,
        codec_id,
        mpegts_time_base(),
        StreamKind::Audio(AudioParameters {
            channel_layout: 0x3,
            sample_rate: 48_000,
            channels: 2,
            frame_size: 1152,
            block_align,
        }),
    )
    .with_codec_timing(Rational::new(1, 48_000), 1)
    .with_bit_rate(192_000)
}

pub fn data_stream(index: usize) -> InputStreamDescriptor {
    InputStreamDescriptor::new(index, Id::None, mpegts_time_base(), StreamKind::Other(Type::Data))
}

// ── Packets ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketSpec {
    pub stream: usize,
    pub pts: Option<i64>,
    pub key: bool,
    pub fail_ownership: bool,
}

impl PacketSpec {
    pub fn new(stream: usize, pts: i64) -> Self {
        Self {
            stream,
            pts: Some(pts),
            key: false,
            fail_ownership: false,
        }
    }

    pub fn without_pts(stream: usize) -> Self {
        Self {
            pts: None,
            ..Self::new(stream, 0)
        }
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn failing_ownership(mut self) -> Self {
        self.fail_ownership = true;
        self
    }
}

pub enum Step {
    Packet(PacketSpec),
    ReadError,
}

pub struct MockPacket {
    spec: PacketSpec,
    released: Rc<Cell<usize>>,
}

impl DemuxedPacket for MockPacket {
    fn stream_index(&self) -> usize {
        self.spec.stream
    }

    fn pts(&self) -> Option<i64> {
        self.spec.pts
    }

    fn is_key(&self) -> bool {
        self.spec.key
    }

    fn make_owned(&mut self) -> Result<(), RemuxError> {
        if self.spec.fail_ownership {
            return Err(RemuxError::PacketDuplication("out of memory".to_string()));
        }
        Ok(())
    }
}

impl Drop for MockPacket {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

// ── Demuxer ────────────────────────────────────────────────────────

pub struct MockDecoder {
    events: EventLog,
}

impl Drop for MockDecoder {
    fn drop(&mut self) {
        self.events.borrow_mut().push(Event::ReleaseDecoder);
    }
}

pub struct MockFilter {
    events: EventLog,
}

impl Drop for MockFilter {
    fn drop(&mut self) {
        self.events.borrow_mut().push(Event::ReleaseFilter);
    }
}

pub struct MockDemuxer {
    pub streams: Vec<InputStreamDescriptor>,
    pub script: VecDeque<Step>,
    pub events: EventLog,
    pub reads: usize,
    pub released: Rc<Cell<usize>>,
    pub decoder_missing: bool,
    pub undecodable: Vec<usize>,
    pub filter_missing: bool,
    pub duration: Option<Duration>,
}

impl MockDemuxer {
    pub fn new(streams: Vec<InputStreamDescriptor>, events: EventLog) -> Self {
        Self {
            streams,
            script: VecDeque::new(),
            events,
            reads: 0,
            released: Rc::new(Cell::new(0)),
            decoder_missing: false,
            undecodable: Vec::new(),
            filter_missing: false,
            duration: None,
        }
    }

    pub fn with_packets<I: IntoIterator<Item = PacketSpec>>(mut self, packets: I) -> Self {
        self.script.extend(packets.into_iter().map(Step::Packet));
        self
    }

    pub fn then_read_error(mut self) -> Self {
        self.script.push_back(Step::ReadError);
        self
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }
}

impl Demuxer for MockDemuxer {
    type Packet = MockPacket;
    type Decoder = MockDecoder;
    type Filter = MockFilter;

    fn streams(&self) -> &[InputStreamDescriptor] {
        &self.streams
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_discard(&mut self, index: usize, discard: Discard) {
        self.events.borrow_mut().push(Event::Discard(index, discard));
    }

    fn open_decoder(&self, index: usize) -> Result<MockDecoder, RemuxError> {
        if self.decoder_missing || self.undecodable.contains(&index) {
            return Err(RemuxError::DecoderNotFound(self.streams[index].codec_id));
        }
        self.events.borrow_mut().push(Event::OpenDecoder(index));
        Ok(MockDecoder {
            events: self.events.clone(),
        })
    }

    fn open_bitstream_filter(&self, index: usize, name: &str) -> Result<MockFilter, RemuxError> {
        if self.filter_missing {
            return Err(RemuxError::BitstreamFilter {
                name: name.to_string(),
                reason: "no such filter".to_string(),
            });
        }
        self.events
            .borrow_mut()
            .push(Event::OpenFilter(index, name.to_string()));
        Ok(MockFilter {
            events: self.events.clone(),
        })
    }

    fn read_packet(&mut self) -> Result<Option<MockPacket>, RemuxError> {
        self.reads += 1;
        match self.script.pop_front() {
            None => Ok(None),
            Some(Step::ReadError) => Err(RemuxError::PacketRead("I/O error".to_string())),
            Some(Step::Packet(spec)) => Ok(Some(MockPacket {
                spec,
                released: self.released.clone(),
            })),
        }
    }
}

// ── Muxer ──────────────────────────────────────────────────────────

/// Owned copy of what the muxer was asked to allocate.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStream {
    pub source_index: usize,
    pub codec_id: Id,
    pub time_base: Rational,
    pub global_header: bool,
    pub extradata: Vec<u8>,
    pub kind: StreamKind,
}

pub struct MockMuxer {
    pub events: EventLog,
    pub global_header: bool,
    pub stream_limit: usize,
    pub streams: Vec<RecordedStream>,
    pub statuses: VecDeque<WriteStatus>,
    pub written: Vec<PacketSpec>,
    pub sink_fails: bool,
    pub header_fails: bool,
    pub trailer_fails: bool,
}

impl MockMuxer {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            global_header: false,
            stream_limit: usize::MAX,
            streams: Vec::new(),
            statuses: VecDeque::new(),
            written: Vec::new(),
            sink_fails: false,
            header_fails: false,
            trailer_fails: false,
        }
    }

    pub fn with_statuses<I: IntoIterator<Item = WriteStatus>>(mut self, statuses: I) -> Self {
        self.statuses.extend(statuses);
        self
    }
}

impl Muxer for MockMuxer {
    type Packet = MockPacket;

    fn requires_global_header(&self) -> bool {
        self.global_header
    }

    fn add_stream(&mut self, descriptor: &OutputStreamDescriptor<'_>) -> Result<usize, RemuxError> {
        if self.streams.len() >= self.stream_limit {
            return Err(RemuxError::StreamAllocation {
                input_index: descriptor.source_index(),
            });
        }

        self.events
            .borrow_mut()
            .push(Event::AddStream(descriptor.source_index()));
        self.streams.push(RecordedStream {
            source_index: descriptor.source_index(),
            codec_id: descriptor.codec_id(),
            time_base: descriptor.time_base(),
            global_header: descriptor.global_header(),
            extradata: descriptor.extradata().to_vec(),
            kind: *descriptor.kind(),
        });
        Ok(self.streams.len() - 1)
    }

    fn open_sink(&mut self) -> Result<(), RemuxError> {
        if self.sink_fails {
            return Err(RemuxError::SinkOpen {
                path: "mock.ts".into(),
                reason: "permission denied".to_string(),
            });
        }
        self.events.borrow_mut().push(Event::OpenSink);
        Ok(())
    }

    fn write_header(&mut self) -> Result<(), RemuxError> {
        if self.header_fails {
            return Err(RemuxError::WriteHeader("invalid argument".to_string()));
        }
        self.events.borrow_mut().push(Event::WriteHeader);
        Ok(())
    }

    fn write_packet(&mut self, packet: &mut MockPacket) -> WriteStatus {
        self.events
            .borrow_mut()
            .push(Event::Write(packet.stream_index()));
        self.written.push(packet.spec);
        self.statuses.pop_front().unwrap_or(WriteStatus::Written)
    }

    fn write_trailer(&mut self) -> Result<(), RemuxError> {
        if self.trailer_fails {
            return Err(RemuxError::WriteTrailer("I/O error".to_string()));
        }
        self.events.borrow_mut().push(Event::WriteTrailer);
        Ok(())
    }
}
