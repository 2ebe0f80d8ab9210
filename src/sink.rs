//! FFmpeg-backed muxer.
//!
//! [`FfmpegMuxer`] resolves an output format by name, allocates the output
//! context up front and opens the byte sink only when asked to, so a setup
//! failure between the two never creates the output file.

use std::{
    ffi::CString,
    os::raw::c_int,
    path::{Path, PathBuf},
    ptr,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::Id,
    format::context::Output,
    util::error::EINVAL,
};
use ffmpeg_sys_next::{
    AV_INPUT_BUFFER_PADDING_SIZE, AVCodecParameters, AVFMT_GLOBALHEADER, AVFMT_NOFILE,
    AVIO_FLAG_WRITE, AVPixelFormat, av_channel_layout_default, av_channel_layout_from_mask,
    av_guess_format, av_interleaved_write_frame, av_mallocz, avformat_alloc_output_context2,
    avio_open,
};

use crate::container::{Muxer, WriteStatus};
use crate::error::RemuxError;
use crate::parameters::{OutputStreamDescriptor, StreamKind};

/// Where packets of one input stream go.
#[derive(Debug, Clone, Copy)]
struct Route {
    output_index: usize,
    source_time_base: Rational,
    output_time_base: Rational,
}

/// Muxer over an FFmpeg output context.
pub struct FfmpegMuxer {
    output_context: Output,
    path: PathBuf,
    format: String,
    routes: Vec<Option<Route>>,
}

impl FfmpegMuxer {
    /// Resolve `format` and allocate an output context for `path`.
    ///
    /// The file itself is not created until [`Muxer::open_sink`].
    ///
    /// # Errors
    ///
    /// [`RemuxError::UnknownOutputFormat`] if FFmpeg has no muxer called
    /// `format`, [`RemuxError::OutputAllocation`] if the context cannot be
    /// allocated.
    pub fn create<P: AsRef<Path>>(path: P, format: &str) -> Result<Self, RemuxError> {
        let path = path.as_ref().to_path_buf();

        ffmpeg_next::init().map_err(|error| RemuxError::OutputAllocation {
            format: format.to_string(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let format_name = CString::new(format)
            .map_err(|_| RemuxError::UnknownOutputFormat(format.to_string()))?;
        let output_format =
            unsafe { av_guess_format(format_name.as_ptr(), ptr::null(), ptr::null()) };
        if output_format.is_null() {
            return Err(RemuxError::UnknownOutputFormat(format.to_string()));
        }

        let file_name = path_to_cstring(&path)?;
        let mut context = ptr::null_mut();
        let code = unsafe {
            avformat_alloc_output_context2(
                &mut context,
                output_format,
                ptr::null(),
                file_name.as_ptr(),
            )
        };
        if code < 0 || context.is_null() {
            return Err(RemuxError::OutputAllocation {
                format: format.to_string(),
                reason: FfmpegError::from(code).to_string(),
            });
        }

        log::debug!("Allocated {format} output context for {}", path.display());

        Ok(Self {
            output_context: unsafe { Output::wrap(context) },
            path,
            format: format.to_string(),
            routes: Vec::new(),
        })
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output format name.
    pub fn format(&self) -> &str {
        &self.format
    }

    fn format_flags(&self) -> c_int {
        unsafe {
            let output_format = (*self.output_context.as_ptr()).oformat;
            if output_format.is_null() {
                0
            } else {
                (*output_format).flags
            }
        }
    }
}

fn path_to_cstring(path: &Path) -> Result<CString, RemuxError> {
    CString::new(path.to_string_lossy().as_bytes()).map_err(|_| RemuxError::SinkOpen {
        path: path.to_path_buf(),
        reason: "path contains a NUL byte".to_string(),
    })
}

/// Copy the translated codec fields into a freshly allocated stream.
///
/// Extradata is duplicated into an FFmpeg-owned, padded buffer because the
/// output context frees it together with the stream.
///
/// # Safety
///
/// `parameters` must point to the codec parameters of a stream owned by a
/// live output context.
unsafe fn write_codec_parameters(
    parameters: *mut AVCodecParameters,
    descriptor: &OutputStreamDescriptor<'_>,
) -> Result<(), ()> {
    unsafe {
        (*parameters).codec_type = descriptor.kind().medium().into();
        (*parameters).codec_id = descriptor.codec_id().into();
        (*parameters).codec_tag = descriptor.codec_tag();
        (*parameters).bit_rate = descriptor.bit_rate();

        let extradata = descriptor.extradata();
        if !extradata.is_empty() {
            let buffer =
                av_mallocz(extradata.len() + AV_INPUT_BUFFER_PADDING_SIZE as usize) as *mut u8;
            if buffer.is_null() {
                return Err(());
            }
            ptr::copy_nonoverlapping(extradata.as_ptr(), buffer, extradata.len());
            (*parameters).extradata = buffer;
            (*parameters).extradata_size = extradata.len() as c_int;
        }

        match descriptor.kind() {
            StreamKind::Audio(audio) => {
                let code = if audio.channel_layout != 0 {
                    av_channel_layout_from_mask(&mut (*parameters).ch_layout, audio.channel_layout)
                } else {
                    av_channel_layout_default(&mut (*parameters).ch_layout, c_int::from(audio.channels));
                    0
                };
                if code < 0 {
                    return Err(());
                }
                (*parameters).sample_rate = audio.sample_rate as c_int;
                (*parameters).frame_size = audio.frame_size as c_int;
                (*parameters).block_align = audio.block_align as c_int;
            }
            StreamKind::Video(video) => {
                (*parameters).format = AVPixelFormat::from(video.pixel_format) as c_int;
                (*parameters).width = video.width as c_int;
                (*parameters).height = video.height as c_int;
                (*parameters).video_delay = video.b_frame_delay as c_int;
            }
            StreamKind::Other(_) => {}
        }
    }

    Ok(())
}

impl Muxer for FfmpegMuxer {
    type Packet = Packet;

    fn requires_global_header(&self) -> bool {
        (self.format_flags() & AVFMT_GLOBALHEADER as c_int) != 0
    }

    fn add_stream(&mut self, descriptor: &OutputStreamDescriptor<'_>) -> Result<usize, RemuxError> {
        let input_index = descriptor.source_index();

        let mut stream = self
            .output_context
            .add_stream(ffmpeg_next::encoder::find(Id::None))
            .map_err(|_| RemuxError::StreamAllocation { input_index })?;
        stream.set_time_base(descriptor.time_base());

        unsafe { write_codec_parameters((*stream.as_mut_ptr()).codecpar, descriptor) }
            .map_err(|()| RemuxError::StreamAllocation { input_index })?;

        // Stream copy has no codec context to flag; the extradata already carries the header.
        if descriptor.global_header() {
            log::debug!("Output stream {} carries its codec header globally", stream.index());
        }

        let output_index = stream.index();
        if self.routes.len() <= input_index {
            self.routes.resize(input_index + 1, None);
        }
        self.routes[input_index] = Some(Route {
            output_index,
            source_time_base: descriptor.source_time_base(),
            output_time_base: descriptor.time_base(),
        });

        Ok(output_index)
    }

    fn open_sink(&mut self) -> Result<(), RemuxError> {
        if (self.format_flags() & AVFMT_NOFILE as c_int) != 0 {
            return Ok(());
        }

        let file_name = path_to_cstring(&self.path)?;
        let code = unsafe {
            avio_open(
                &mut (*self.output_context.as_mut_ptr()).pb,
                file_name.as_ptr(),
                AVIO_FLAG_WRITE as c_int,
            )
        };
        if code < 0 {
            return Err(RemuxError::SinkOpen {
                path: self.path.clone(),
                reason: FfmpegError::from(code).to_string(),
            });
        }

        log::debug!("Opened output {}", self.path.display());
        Ok(())
    }

    fn write_header(&mut self) -> Result<(), RemuxError> {
        self.output_context
            .write_header()
            .map_err(|error| RemuxError::WriteHeader(error.to_string()))?;

        // The muxer may have replaced the requested time bases.
        for route in self.routes.iter_mut().flatten() {
            if let Some(stream) = self.output_context.stream(route.output_index) {
                route.output_time_base = stream.time_base();
            }
        }

        Ok(())
    }

    fn write_packet(&mut self, packet: &mut Packet) -> WriteStatus {
        let Some(route) = self.routes.get(packet.stream()).copied().flatten() else {
            log::debug!("No output stream for input stream {}", packet.stream());
            return WriteStatus::from_code(c_int::from(FfmpegError::Other { errno: EINVAL }));
        };

        packet.set_stream(route.output_index);
        packet.rescale_ts(route.source_time_base, route.output_time_base);
        packet.set_position(-1);

        let code = unsafe {
            av_interleaved_write_frame(self.output_context.as_mut_ptr(), packet.as_mut_ptr())
        };
        WriteStatus::from_code(code)
    }

    fn write_trailer(&mut self) -> Result<(), RemuxError> {
        self.output_context
            .write_trailer()
            .map_err(|error| RemuxError::WriteTrailer(error.to_string()))
    }
}
