#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `control` owns the `.zsync` control-file format end to end: the
//! [`target::TargetDescription`] data model, the [`codec`] that parses and
//! emits it, the [`generate`] step that builds one from a source file, the
//! [`sizing`] discipline that derives sound checksum widths from a file's
//! size and block size, and the [`rfc822`] date helpers used by the
//! `MTime` header.
//!
//! # Design
//!
//! This crate has no notion of a hash *index* or a *scan* — it only knows
//! how to turn a target file's metadata into bytes and back. The `zindex`
//! and `matchscan` crates consume a parsed [`target::TargetDescription`].
//!
//! # Errors
//!
//! All fallible operations return [`error::ControlError`] via
//! [`error::Result`].

pub mod codec;

/// Error and result types for control-file parsing and generation.
pub mod error;
pub mod generate;
pub mod rfc822;
pub mod sizing;
pub mod target;

pub use error::{ControlError, Result};
pub use generate::{default_blocksize, generate, GeneratorOptions};
pub use sizing::{choose_widths, ChecksumWidths};
pub use target::{BlockRecord, StrongAlgorithm, TargetDescription};
