//! Whole-file verification, run once no blocks remain needed.

/// Result of comparing the reconstructed file's SHA-1 against the control
/// file's declared whole-file hash.
///
/// A mismatch is not a variant here: it is surfaced as
/// [`crate::error::TransferError::WholeFileHashMismatch`] from
/// [`crate::coordinator::Coordinator::verify`], since it means the run
/// failed rather than produced one of two valid outcomes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerifyOutcome {
    /// The control file carried no whole-file hash to check against.
    NoWholeFileHash,
    /// The computed hash matched.
    Verified,
}
