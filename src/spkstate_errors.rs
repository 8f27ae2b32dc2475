use camino::Utf8PathBuf;
use thiserror::Error;

use crate::constants::NaifId;

#[derive(Error, Debug)]
pub enum SpkStateError {
    #[error("Unable to perform file operation on {path}: {source}")]
    IoError {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid DAF file {path}: {reason}")]
    InvalidDaf { path: Utf8PathBuf, reason: String },

    #[error("Unsupported kernel architecture '{idword}' in {path}")]
    UnsupportedKernel { path: Utf8PathBuf, idword: String },

    #[error("Text kernel syntax error in {path}: {reason}")]
    TextKernelSyntax { path: Utf8PathBuf, reason: String },

    #[error("Kernel not loaded: {0}")]
    KernelNotLoaded(Utf8PathBuf),

    #[error("SPK data type {data_type} used by segment '{segment}' is not supported")]
    UnsupportedSpkType { data_type: i32, segment: String },

    #[error("Corrupted SPK segment '{segment}': {reason}")]
    CorruptedSegment { segment: String, reason: String },

    #[error("No leapseconds kernel loaded, cannot convert '{0}'")]
    NoLeapSeconds(String),

    #[error("Invalid leapseconds data: {0}")]
    InvalidLeapSeconds(String),

    #[error("Invalid time string '{input}': {reason}")]
    InvalidTimeString { input: String, reason: String },

    #[error("Unknown body: {0}")]
    UnknownBody(String),

    #[error("Unknown frame: {0}")]
    UnknownFrame(String),

    #[error("Unsupported frame ID: {0}")]
    UnsupportedFrame(i32),

    #[error("Invalid aberration correction: {0}")]
    InvalidAberrationCorrection(String),

    #[error("Insufficient ephemeris data to compute the state of {body} ({id}) at ET {et}")]
    InsufficientEphemerisData { body: String, id: NaifId, et: f64 },

    #[error("Ephemeris chain for body {0} exceeds the maximum depth")]
    ChainTooDeep(NaifId),
}

impl SpkStateError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        SpkStateError::IoError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_daf(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        SpkStateError::InvalidDaf {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
