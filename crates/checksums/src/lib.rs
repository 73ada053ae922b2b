#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the two checksum primitives that the zsync-style
//! block-matching engine is built on:
//!
//! - [`rolling`] implements the Adler-style weak checksum (`rsum`) used to
//!   scan a seed file for blocks of the target in O(1)-per-byte time.
//! - [`strong`] exposes MD4 and SHA-1 as interchangeable strong per-block
//!   digests, plus a whole-file SHA-1 helper, behind the [`strong::StrongDigest`]
//!   trait so the control-file codec can select the algorithm named by the
//!   control file rather than hard-coding one.
//!
//! # Design
//!
//! Both checksum kinds are intentionally free of any notion of "block" or
//! "file" — that structure belongs to the `control`, `zindex`, and
//! `matchscan` crates. This crate only computes numbers from bytes.
//!
//! # Invariants
//!
//! - [`rolling::RollingChecksum`]'s two accumulators are always truncated to
//!   16 bits, so every update wraps modulo 2^16 rather than overflowing.
//! - [`rolling::weak_a_mask`] implements the `rsum_a_mask` truncation table:
//!   `W<=2` hides the `a` component from the lookup key entirely, `W==3`
//!   keeps its low 8 bits, `W>=4` keeps all 16.
//! - Strong digests never panic; callers stream bytes and finalize once.
//!
//! # Examples
//!
//! ```
//! use checksums::rolling::RollingChecksum;
//!
//! let mut weak = RollingChecksum::new();
//! weak.update(b"abcd");
//! let before = weak.value();
//! weak.roll(b'a', b'e').unwrap();
//! assert_ne!(weak.value(), before);
//! ```

pub mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, RollingError};
pub use strong::{Md4, Sha1, StrongDigest};
