//! Shared test fixtures: a small synthetic target file plus its matching
//! control-file bytes, used across `control`, `zindex`, `matchscan`,
//! `tstore`, and `transfer`'s integration tests.
//!
//! # Overview
//!
//! Building a consistent (data, control-file) pair by hand in every crate's
//! test module would drift; [`sample_target`] is the one place that does
//! it, grounded on the same [`control::generate::generate`] path the real
//! `zsyncmake` binary uses.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use control::{generate, GeneratorOptions, TargetDescription};

/// A synthetic target file's bytes plus its parsed control-file
/// description, generated through the real generator path.
pub struct SampleTarget {
    /// The target file's raw bytes.
    pub data: Vec<u8>,
    /// The generated, fully-populated target description.
    pub target: TargetDescription,
}

/// Builds `length` bytes of a repeating, non-trivial pattern (not all
/// zeroes, so weak-checksum collisions between blocks are rare) split into
/// blocks of `blocksize`, and generates its control-file description.
#[must_use]
pub fn sample_target(length: usize, blocksize: u32) -> SampleTarget {
    let data: Vec<u8> = (0..length).map(|i| ((i * 2654435761) % 251) as u8).collect();
    let options = GeneratorOptions {
        blocksize: Some(blocksize),
        filename: Some("sample.bin".to_string()),
        urls: vec!["http://example.invalid/sample.bin".to_string()],
        mtime: None,
    };
    let target = generate(data.as_slice(), &options).expect("in-memory generation cannot fail");
    SampleTarget { data, target }
}

/// Returns a mutated copy of `data` with a single byte flipped at `offset`,
/// for seed-corruption scenarios.
#[must_use]
pub fn corrupt_byte(data: &[u8], offset: usize) -> Vec<u8> {
    let mut copy = data.to_vec();
    if let Some(byte) = copy.get_mut(offset) {
        *byte ^= 0xff;
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_target_data_matches_declared_length() {
        let sample = sample_target(5000, 512);
        assert_eq!(sample.data.len() as u64, sample.target.length);
    }

    #[test]
    fn corrupt_byte_only_touches_the_requested_offset() {
        let data = vec![1u8; 16];
        let corrupted = corrupt_byte(&data, 4);
        assert_ne!(corrupted[4], data[4]);
        for i in 0..16 {
            if i != 4 {
                assert_eq!(corrupted[i], data[i]);
            }
        }
    }
}
