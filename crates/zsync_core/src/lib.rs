//! Shared exit-code vocabulary for the three binaries.
//!
//! # Overview
//!
//! `zsyncmake`, `zsync`, and `zsyncrange` each need a small, stable set of
//! process exit codes rather than inventing their own per binary. This
//! crate is the single place that vocabulary lives.
//!
//! # Design
//!
//! Each binary only uses the subset of [`ExitCode`] its own contract
//! names; the enum is shared so the numbers stay consistent across all
//! three rather than drifting.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Process exit code, convertible to the raw `i32` a binary returns from
/// `main`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitCode {
    /// The requested operation completed and, where applicable, the
    /// reconstructed or generated file verified successfully.
    Success = 0,
    /// Command-line usage error (generator), or verification failure with
    /// the partial result kept as a `.part` file (client).
    UsageOrVerification = 2,
    /// Fatal error: I/O failure, every mirror URL exhausted, or a control
    /// file that could not be parsed at all.
    Fatal = 3,
}

impl ExitCode {
    /// The raw process exit status.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for i32 {
    fn from(value: ExitCode) -> Self {
        value.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_documented_contract() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::UsageOrVerification.code(), 2);
        assert_eq!(ExitCode::Fatal.code(), 3);
    }
}
