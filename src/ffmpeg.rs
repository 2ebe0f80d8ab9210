//! FFmpeg log level control.
//!
//! libav* print to stderr through their own logger, independent of the
//! Rust [`log`](https://crates.io/crates/log) records this crate emits.
//! [`set_ffmpeg_log_level`] tunes the former.
//!
//! ```no_run
//! use tsremux::FfmpegLogLevel;
//!
//! let level: FfmpegLogLevel = "error".parse().unwrap();
//! tsremux::set_ffmpeg_log_level(level);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// No output at all.
    Quiet,
    /// Conditions the process aborts on.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

const LEVEL_NAMES: [(FfmpegLogLevel, &str); 9] = [
    (FfmpegLogLevel::Quiet, "quiet"),
    (FfmpegLogLevel::Panic, "panic"),
    (FfmpegLogLevel::Fatal, "fatal"),
    (FfmpegLogLevel::Error, "error"),
    (FfmpegLogLevel::Warning, "warning"),
    (FfmpegLogLevel::Info, "info"),
    (FfmpegLogLevel::Verbose, "verbose"),
    (FfmpegLogLevel::Debug, "debug"),
    (FfmpegLogLevel::Trace, "trace"),
];

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }

    fn from_ffmpeg_level(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        LEVEL_NAMES
            .iter()
            .find(|(level, _)| *level == self)
            .map_or("warning", |(_, name)| *name)
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    /// Parse a level name, case-insensitively. `warn` is accepted for
    /// `warning`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        let value = if value == "warn" { "warning" } else { value.as_str() };

        LEVEL_NAMES
            .iter()
            .find(|(_, name)| *name == value)
            .map(|(level, _)| *level)
            .ok_or_else(|| format!("unknown FFmpeg log level: {value}"))
    }
}

/// Set FFmpeg's own stderr verbosity.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}

/// FFmpeg's current stderr verbosity, `None` if it is not a named level.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(FfmpegLogLevel::from_ffmpeg_level)
}
