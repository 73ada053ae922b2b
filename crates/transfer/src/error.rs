use std::io;

use thiserror::Error;

/// Failures that can terminate a reconstruction run.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Failure parsing the control file.
    #[error("control file error: {0}")]
    Control(#[from] control::ControlError),

    /// Failure writing into or finalizing the temporary target file.
    #[error("target store error: {0}")]
    TargetStore(#[from] tstore::TargetStoreError),

    /// Underlying I/O failure outside the target store (seed open, install
    /// rename, mtime restoration).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Every mirror URL failed while blocks remained needed.
    #[error("no usable mirror URL remained with {still_needed} block(s) still needed")]
    NoUsableUrls {
        /// Number of blocks that were still needed when the last URL failed.
        still_needed: u32,
    },

    /// All blocks were believed present but the whole-file hash disagreed.
    #[error("reconstructed file failed whole-file hash verification")]
    WholeFileHashMismatch,
}

/// Convenience alias for coordinator results.
pub type Result<T> = std::result::Result<T, TransferError>;

/// Non-fatal events a caller may want to observe as the run progresses.
/// None of these stop the run.
#[derive(Clone, Debug)]
pub enum Warning {
    /// A seed could not be opened or read; it was skipped.
    SeedUnreadable {
        /// Path to the seed that failed.
        path: String,
        /// Human-readable reason.
        reason: String,
    },
    /// A received block failed strong-hash verification and was re-queued.
    BlockRejected {
        /// The block's id.
        block_id: u32,
    },
    /// A mirror URL failed and was excluded for the remainder of the run.
    UrlFailed {
        /// The URL that failed.
        url: String,
        /// Human-readable reason.
        reason: String,
    },
}
