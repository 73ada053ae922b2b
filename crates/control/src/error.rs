use std::io;

use thiserror::Error;

/// Failures from parsing or emitting a control file.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Underlying I/O failure while reading or writing the control stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A header line was not `Key: value`, or the blank line separating the
    /// header from the checksum table was never found.
    #[error("malformed control file header: {0}")]
    MalformedHeader(String),

    /// A required header was present but its value could not be parsed.
    #[error("bad value for header {key}: {value}")]
    BadNumericField {
        /// Name of the header whose value failed to parse.
        key: &'static str,
        /// The unparsable value that was seen.
        value: String,
    },

    /// A required header (`Length`, `Blocksize`, `Hash-Lengths`, or at least
    /// one `URL`) was never seen.
    #[error("missing required header: {0}")]
    MissingRequiredField(&'static str),

    /// An unrecognised header key was seen and was not listed in `Safe:`.
    #[error("unrecognised header {0} - a newer version is required")]
    UnknownKey(String),

    /// `zsync: 0.0.4` or a `Min-Version` newer than this implementation.
    #[error("incompatible control file version: {0}")]
    IncompatibleVersion(String),

    /// The checksum table was shorter than `N * (W + S)` bytes.
    #[error("truncated checksum table: expected {expected} bytes, got {got}")]
    TruncatedChecksumTable {
        /// Number of bytes the checksum table was expected to contain.
        expected: usize,
        /// Number of bytes actually available.
        got: usize,
    },

    /// `Hash-Lengths` values fell outside their allowed ranges.
    #[error("nonsensical hash lengths: k={k}, w={w}, s={s}")]
    BadHashLengths {
        /// Number of sequential matches required (`k`).
        k: i64,
        /// Weak checksum length in bytes (`w`).
        w: i64,
        /// Strong checksum length in bytes (`s`).
        s: i64,
    },

    /// `Blocksize` was not a power of two, or zero.
    #[error("nonsensical blocksize {0}")]
    BadBlocksize(u64),

    /// `Filename` contained a path separator.
    #[error("Filename header must not contain '/': {0}")]
    UnsafeFilename(String),
}

/// Convenience alias for control-file results.
pub type Result<T> = std::result::Result<T, ControlError>;
