//! Named FFmpeg bitstream filter handle.
//!
//! The filter is initialized against a stream's codec parameters and freed
//! on drop. The remux pipeline holds one for the video stream
//! (`h264_mp4toannexb` by default) for the duration of the packet loop but
//! does not route packets through it: transport-stream H.264 is already in
//! Annex-B framing.

use std::ffi::CString;
use std::ptr;

use ffmpeg_next::{Error as FfmpegError, Rational, codec::Parameters};
use ffmpeg_sys_next::{
    AVBSFContext, av_bsf_alloc, av_bsf_free, av_bsf_get_by_name, av_bsf_init,
    avcodec_parameters_copy,
};

use crate::error::RemuxError;

/// An initialized bitstream filter context.
pub struct BitstreamFilter {
    context: *mut AVBSFContext,
    name: String,
}

impl BitstreamFilter {
    /// Look up `name`, configure it for a stream with `parameters` and
    /// `time_base`, and initialize it.
    ///
    /// # Errors
    ///
    /// [`RemuxError::BitstreamFilter`] if the filter does not exist, cannot
    /// be allocated, or rejects the stream's codec.
    pub fn new(
        name: &str,
        parameters: &Parameters,
        time_base: Rational,
    ) -> Result<Self, RemuxError> {
        let failure = |reason: String| RemuxError::BitstreamFilter {
            name: name.to_string(),
            reason,
        };

        let c_name = CString::new(name).map_err(|_| failure("name contains a NUL byte".into()))?;

        let filter = unsafe { av_bsf_get_by_name(c_name.as_ptr()) };
        if filter.is_null() {
            return Err(failure("no such filter".into()));
        }

        let mut context = ptr::null_mut();
        let code = unsafe { av_bsf_alloc(filter, &mut context) };
        if code < 0 || context.is_null() {
            return Err(failure(FfmpegError::from(code).to_string()));
        }

        // From here on `Drop` frees the context on every early return.
        let bitstream_filter = Self {
            context,
            name: name.to_string(),
        };

        let code = unsafe { avcodec_parameters_copy((*context).par_in, parameters.as_ptr()) };
        if code < 0 {
            return Err(failure(FfmpegError::from(code).to_string()));
        }

        unsafe {
            (*context).time_base_in = time_base.into();
        }

        let code = unsafe { av_bsf_init(context) };
        if code < 0 {
            return Err(failure(FfmpegError::from(code).to_string()));
        }

        log::debug!("Initialized bitstream filter {name}");
        Ok(bitstream_filter)
    }

    /// Name the filter was looked up by.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for BitstreamFilter {
    fn drop(&mut self) {
        unsafe {
            av_bsf_free(&mut self.context);
        }
        log::debug!("Released bitstream filter {}", self.name);
    }
}
