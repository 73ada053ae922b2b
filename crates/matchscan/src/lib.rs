#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `matchscan` turns a seed byte stream into a set of confirmed target
//! blocks:
//!
//! - [`scanner`] rolls the weak checksum across the stream one byte at a
//!   time, probes [`zindex::BlockIndex`], and confirms hits with the
//!   strong hash.
//! - [`needed`] tracks which target blocks remain unconfirmed as a
//!   canonical sorted, disjoint, coalesced set of half-open intervals, and
//!   converts that set to HTTP byte ranges.
//! - [`sink`] is the narrow trait a scan writes confirmed blocks through,
//!   so this crate never depends on how or where the target is stored.
//!
//! # Invariants
//!
//! - A block is either present (written via [`sink::BlockSink`] and
//!   removed from [`needed::NeededSet`]) or needed; the two partition
//!   `[0, N)`.
//! - [`needed::NeededSet`] never yields overlapping or adjacent-but-unmerged
//!   intervals.

pub mod needed;
pub mod scanner;
pub mod sink;

pub use needed::NeededSet;
pub use scanner::{scan, scan_bytes};
pub use sink::BlockSink;
