#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `zindex` maps a weak checksum to the block-ids in a target that might
//! share it. It has two layers:
//!
//! - A bucket table keyed by the masked weak sum, holding chained entries
//!   in file order.
//! - A "bit-hash": a Bloom-style bit array that rejects the common case
//!   (no needed block shares this weak sum) in O(1) without touching a
//!   bucket.
//!
//! # Design
//!
//! The index only ever holds entries for blocks the caller still
//! considers *needed*; as blocks are matched and removed from the needed
//! set, [`BlockIndex::remove`] drops their entries, and the index
//! periodically rebuilds its bucket table to keep average chain length
//! bounded (see [`BlockIndex::should_rebuild`]).
//!
//! # Invariants
//!
//! - The bucket count is always a power of two so the bucket key is a
//!   cheap mask rather than a modulo.
//! - A bit cleared in the bit-hash guarantees no needed block has a
//!   matching weak sum; a set bit is only a hint.

use checksums::rolling::masked_value;
use control::TargetDescription;

/// One surviving candidate in a bucket chain.
#[derive(Clone, Copy, Debug)]
struct Entry {
    weak: u32,
    block_id: u32,
}

/// Two-level lookup from a weak checksum to candidate block-ids.
pub struct BlockIndex {
    buckets: Vec<Vec<Entry>>,
    bucket_mask: u32,
    bit_hash: Vec<u64>,
    bit_mask: u64,
    weak_bytes: u8,
    entry_count: usize,
    built_for_entry_count: usize,
}

impl BlockIndex {
    /// Builds an index over every block recorded in `target`. Callers that
    /// start a run with every block needed pass the full block list;
    /// [`Self::rebuild`] narrows it later as blocks are matched.
    #[must_use]
    pub fn build(target: &TargetDescription) -> Self {
        let entries: Vec<Entry> = target
            .blocks
            .iter()
            .map(|b| Entry {
                weak: b.weak,
                block_id: b.id,
            })
            .collect();
        Self::from_entries(&entries, target.weak_bytes)
    }

    fn from_entries(entries: &[Entry], weak_bytes: u8) -> Self {
        let bucket_count = bucket_count_for(entries.len());
        let mut buckets = vec![Vec::new(); bucket_count];
        let bucket_mask = (bucket_count - 1) as u32;

        let bit_len = (4 * bucket_count).next_power_of_two().max(64);
        let mut bit_hash = vec![0u64; bit_len / 64];
        let bit_mask = (bit_len - 1) as u64;

        for &entry in entries {
            let masked = masked_value(entry.weak, weak_bytes);
            let bucket = bucket_key(masked, bucket_mask);
            buckets[bucket as usize].push(entry);
            set_bit(&mut bit_hash, bit_hash_index(masked, bit_mask));
        }

        Self {
            buckets,
            bucket_mask,
            bit_hash,
            bit_mask,
            weak_bytes,
            entry_count: entries.len(),
            built_for_entry_count: entries.len(),
        }
    }

    /// Iterates candidate block-ids whose recorded weak sum matches `weak`
    /// under the configured mask, in file order.
    pub fn candidates(&self, weak: u32) -> impl Iterator<Item = u32> + '_ {
        let masked = masked_value(weak, self.weak_bytes);
        let has_candidates = test_bit(&self.bit_hash, bit_hash_index(masked, self.bit_mask));
        let bucket = if has_candidates {
            let idx = bucket_key(masked, self.bucket_mask) as usize;
            self.buckets[idx].as_slice()
        } else {
            &[]
        };
        bucket
            .iter()
            .filter(move |e| masked_value(e.weak, self.weak_bytes) == masked)
            .map(|e| e.block_id)
    }

    /// Removes every entry for `block_id` from the index. No-op if absent.
    pub fn remove(&mut self, block_id: u32) {
        let mut removed = false;
        for bucket in &mut self.buckets {
            let before = bucket.len();
            bucket.retain(|e| e.block_id != block_id);
            if bucket.len() != before {
                removed = true;
            }
        }
        if removed {
            self.entry_count = self.entry_count.saturating_sub(1);
        }
    }

    /// `true` once enough entries have been removed since the last build
    /// that a rebuild would meaningfully shorten average chain length.
    #[must_use]
    pub fn should_rebuild(&self) -> bool {
        self.built_for_entry_count >= 32 && self.entry_count <= self.built_for_entry_count / 2
    }

    /// Rebuilds the bucket table and bit-hash sized for the current entry
    /// count, discarding stale empty buckets.
    pub fn rebuild(&mut self) {
        let entries: Vec<Entry> = self
            .buckets
            .iter()
            .flatten()
            .copied()
            .collect();
        *self = Self::from_entries(&entries, self.weak_bytes);
    }

    /// Number of block entries currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_count
    }

    /// `true` if no blocks remain in the index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}

fn bucket_count_for(needed: usize) -> usize {
    (needed.max(1) * 2).next_power_of_two()
}

fn bucket_key(masked: u32, bucket_mask: u32) -> u32 {
    // Multiplicative mixing so adjacent weak sums don't cluster in
    // adjacent buckets.
    masked.wrapping_mul(0x9E37_79B9) >> 16 & bucket_mask
}

fn bit_hash_index(masked: u32, bit_mask: u64) -> u64 {
    u64::from(masked.wrapping_mul(0x85EB_CA6B)) & bit_mask
}

fn set_bit(bits: &mut [u64], index: u64) {
    let word = (index / 64) as usize;
    let bit = index % 64;
    bits[word] |= 1 << bit;
}

fn test_bit(bits: &[u64], index: u64) -> bool {
    let word = (index / 64) as usize;
    let bit = index % 64;
    bits[word] & (1 << bit) != 0
}
