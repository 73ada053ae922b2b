//! Reconstruction coordinator: seed ingestion, fetch planning, block receipt
//! and verification, and final installation of the rebuilt file.
//!
//! # Overview
//!
//! [`Coordinator`] owns the full lifecycle of rebuilding one target file: it
//! starts from a parsed [`control::TargetDescription`], scans local seed
//! files to satisfy as many blocks as possible for free, fetches the
//! remainder over HTTP byte ranges through a caller-supplied
//! [`RangeFetcher`], verifies the assembled file's whole-file hash, and
//! installs it at the requested output path.
//!
//! # Design
//!
//! The coordinator is deliberately transport-agnostic: [`RangeFetcher`] is
//! the only seam to the network, so this crate can be exercised with a
//! fake in tests and wired to a real HTTP client at the binary layer.
//!
//! # Errors
//!
//! [`TransferError`] covers the ways a run can fail outright (parse
//! failure, I/O failure, every mirror exhausted, hash mismatch at the end).
//! Softer problems — an unreadable seed, a single rejected block, one
//! failed mirror — are reported as [`Warning`]s rather than aborting the
//! run.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod coordinator;

/// Error, result, and warning types for transfer operations.
pub mod error;
pub mod fetcher;
pub mod receiver;
pub mod verify;

pub use coordinator::{Coordinator, Status};
pub use error::{Result, TransferError, Warning};
pub use fetcher::{FetchError, RangeFetcher};
pub use verify::VerifyOutcome;
