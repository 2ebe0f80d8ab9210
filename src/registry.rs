//! Stream selection and registration.
//!
//! The registry keeps the first video stream and the first audio stream of
//! the input and tells the demuxer to drop everything else. The selected
//! streams are translated and allocated on the muxer in input order.

use ffmpeg_next::Rational;

use crate::container::{Demuxer, Discard, Muxer};
use crate::error::RemuxError;
use crate::parameters::{InputStreamDescriptor, MediaRole, OutputStreamDescriptor};
use crate::translate;

/// Which input streams are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamSelection {
    video: Option<usize>,
    audio: Option<usize>,
    decisions: Vec<Discard>,
}

impl StreamSelection {
    /// Classify streams by role, in order.
    ///
    /// The first video and first audio stream are kept. Once both are
    /// found the remaining streams are marked [`Discard::All`] without
    /// looking at their role.
    pub fn scan<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = MediaRole>,
    {
        let mut selection = StreamSelection::default();

        for (index, role) in roles.into_iter().enumerate() {
            let keep = if selection.is_complete() {
                false
            } else {
                match role {
                    MediaRole::Video if selection.video.is_none() => {
                        selection.video = Some(index);
                        true
                    }
                    MediaRole::Audio if selection.audio.is_none() => {
                        selection.audio = Some(index);
                        true
                    }
                    _ => false,
                }
            };

            selection
                .decisions
                .push(if keep { Discard::Keep } else { Discard::All });
        }

        selection
    }

    /// Classify the streams reported by `streams`.
    pub fn from_streams(streams: &[InputStreamDescriptor]) -> Self {
        Self::scan(streams.iter().map(InputStreamDescriptor::role))
    }

    /// Whether both a video and an audio stream have been selected.
    pub fn is_complete(&self) -> bool {
        self.video.is_some() && self.audio.is_some()
    }

    /// Index of the selected video stream.
    pub fn video(&self) -> Option<usize> {
        self.video
    }

    /// Index of the selected audio stream.
    pub fn audio(&self) -> Option<usize> {
        self.audio
    }

    /// Per-stream discard decisions, indexed by input stream index.
    pub fn decisions(&self) -> &[Discard] {
        &self.decisions
    }

    /// Push the discard decisions down to the demuxer.
    pub fn apply<D: Demuxer>(&self, demuxer: &mut D) {
        for (index, discard) in self.decisions.iter().enumerate() {
            if *discard == Discard::All {
                log::debug!("Discarding input stream {index}");
            }
            demuxer.set_discard(index, *discard);
        }
    }

    fn selected(&self) -> impl Iterator<Item = usize> {
        let mut indices = [self.video, self.audio];
        indices.sort_unstable();
        indices.into_iter().flatten()
    }
}

/// Where packets of a selected stream go and how their timestamps read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRoute {
    /// Input stream index.
    pub input_index: usize,
    /// Output stream index allocated by the muxer.
    pub output_index: usize,
    /// Time base of the input stream's packet timestamps.
    pub time_base: Rational,
}

/// Routes of the selected video and audio streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketRoutes {
    /// Route of the selected video stream.
    pub video: Option<StreamRoute>,
    /// Route of the selected audio stream.
    pub audio: Option<StreamRoute>,
}

/// A selected input stream together with its output stream.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredStream<'a> {
    /// Output stream index allocated by the muxer.
    pub output_index: usize,
    /// The translated descriptor.
    pub descriptor: OutputStreamDescriptor<'a>,
}

impl RegisteredStream<'_> {
    fn route(&self) -> StreamRoute {
        StreamRoute {
            input_index: self.descriptor.source_index(),
            output_index: self.output_index,
            time_base: self.descriptor.source_time_base(),
        }
    }
}

/// Selected streams, translated and allocated on the muxer.
///
/// Borrows the demuxer's input streams: the output descriptors share their
/// extradata, so the registry has to be dropped (see
/// [`routes`](StreamRegistry::routes)) before the demuxer can be read from.
#[derive(Debug)]
pub struct StreamRegistry<'a> {
    selection: StreamSelection,
    video: Option<RegisteredStream<'a>>,
    audio: Option<RegisteredStream<'a>>,
}

impl<'a> StreamRegistry<'a> {
    /// Translate each selected stream of `streams` and allocate it on
    /// `muxer`, in input order.
    ///
    /// # Errors
    ///
    /// [`RemuxError::StreamAllocation`] if the muxer runs out of stream
    /// slots.
    pub fn register<M: Muxer>(
        streams: &'a [InputStreamDescriptor],
        selection: StreamSelection,
        muxer: &mut M,
    ) -> Result<Self, RemuxError> {
        let mut video = None;
        let mut audio = None;

        for index in selection.selected() {
            let Some(input) = streams.get(index) else {
                continue;
            };
            let (output_index, descriptor) = translate::add_output_stream(muxer, input)?;
            let registered = RegisteredStream {
                output_index,
                descriptor,
            };

            if selection.video == Some(index) {
                video = Some(registered);
            } else {
                audio = Some(registered);
            }
        }

        Ok(Self {
            selection,
            video,
            audio,
        })
    }

    /// The stream selection this registry was built from.
    pub fn selection(&self) -> &StreamSelection {
        &self.selection
    }

    /// The registered video stream.
    pub fn video(&self) -> Option<&RegisteredStream<'a>> {
        self.video.as_ref()
    }

    /// The registered audio stream.
    pub fn audio(&self) -> Option<&RegisteredStream<'a>> {
        self.audio.as_ref()
    }

    /// The registered video stream, which every run needs.
    ///
    /// # Errors
    ///
    /// [`RemuxError::NoVideoStream`] if the input had no video stream.
    pub fn require_video(&self) -> Result<&RegisteredStream<'a>, RemuxError> {
        self.video.as_ref().ok_or(RemuxError::NoVideoStream)
    }

    /// Number of output streams allocated.
    pub fn output_stream_count(&self) -> usize {
        usize::from(self.video.is_some()) + usize::from(self.audio.is_some())
    }

    /// Packet routes of the registered streams.
    pub fn routes(&self) -> PacketRoutes {
        PacketRoutes {
            video: self.video.as_ref().map(RegisteredStream::route),
            audio: self.audio.as_ref().map(RegisteredStream::route),
        }
    }
}
