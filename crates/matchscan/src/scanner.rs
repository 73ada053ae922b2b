//! Byte-level scan of a seed stream: rolls the weak checksum one byte at a
//! time, probes the block hash index, confirms candidates with the strong
//! hash, and writes matches into a [`BlockSink`].

use std::io::{self, Read};

use checksums::rolling::RollingChecksum;
use checksums::strong::{block_prefix, Md4, Sha1};
use control::{StrongAlgorithm, TargetDescription};
use zindex::BlockIndex;

use crate::needed::NeededSet;
use crate::sink::BlockSink;

/// Whether the scanner currently holds a run of consecutive weak-matched
/// block-ids awaiting the consecutive-match threshold, or has already
/// crossed it and is confirming blocks one at a time.
///
/// `Pending`/`Confirmed` each carry the exact byte position their successor
/// block is expected at (`blocksize` bytes past the last one), since a
/// target's blocks are laid out at fixed `blocksize` strides — the
/// successor's weak sum only has meaning to check for at that one position,
/// never at the bytes in between.
#[derive(Clone, Copy)]
enum RunState {
    Empty,
    Pending { start_pos: usize, start_id: u32, len: u8 },
    Confirmed { next_pos: usize, next_id: u32 },
}

/// Reads `seed` fully and scans it for blocks of `target`, marking matches
/// present in `needed` and removing their entries from `index`, writing
/// validated contents into `sink`.
///
/// Returns the number of blocks matched.
pub fn scan<R: Read>(
    mut seed: R,
    target: &TargetDescription,
    index: &mut BlockIndex,
    needed: &mut NeededSet,
    sink: &mut dyn BlockSink,
) -> io::Result<usize> {
    let mut data = Vec::new();
    seed.read_to_end(&mut data)?;
    Ok(scan_bytes(&data, target, index, needed, sink))
}

/// Same as [`scan`] but over an in-memory buffer, for callers that already
/// hold the seed (or a `.part` file) in memory or via a memory map.
pub fn scan_bytes(
    data: &[u8],
    target: &TargetDescription,
    index: &mut BlockIndex,
    needed: &mut NeededSet,
    sink: &mut dyn BlockSink,
) -> usize {
    let blocksize = target.blocksize as usize;
    let real_len = data.len();
    if real_len == 0 || blocksize == 0 {
        return 0;
    }
    let k = target.seq_matches;

    // The final block of the target was hashed with zero padding out to a
    // full blocksize; a seed whose real content simply ends where that
    // block's real bytes end (the common case of an identical prior copy)
    // needs the same zero padding synthesized here so its last window can
    // still be tested as a full block.
    let mut data = data.to_vec();
    data.resize(real_len + blocksize, 0);
    let data = data.as_slice();

    let mut weak = RollingChecksum::new();
    weak.update_from_block(&data[0..blocksize]);

    let mut matched = 0usize;
    let mut run = RunState::Empty;
    let mut pos = 0usize;

    loop {
        let window = &data[pos..pos + blocksize];

        match run {
            RunState::Empty => {
                if let Some(id) = first_candidate(index, weak.value()) {
                    if k <= 1 {
                        if confirm(target, id, window) {
                            commit_at(target, needed, index, sink, id, window, pos);
                            matched += 1;
                            run = RunState::Confirmed {
                                next_pos: pos + blocksize,
                                next_id: id + 1,
                            };
                        }
                    } else {
                        run = RunState::Pending {
                            start_pos: pos,
                            start_id: id,
                            len: 1,
                        };
                    }
                }
            }
            RunState::Pending { start_pos, start_id, len } => {
                let boundary = start_pos + usize::from(len) * blocksize;
                if pos == boundary {
                    let wanted = start_id + u32::from(len);
                    if has_candidate(index, weak.value(), wanted) {
                        let new_len = len + 1;
                        if new_len >= k {
                            let in_bounds = start_pos + usize::from(new_len) * blocksize <= data.len();
                            let all_confirmed = in_bounds
                                && (0..new_len).all(|j| {
                                    let p = start_pos + usize::from(j) * blocksize;
                                    confirm(target, start_id + u32::from(j), &data[p..p + blocksize])
                                });
                            if all_confirmed {
                                for j in 0..new_len {
                                    let p = start_pos + usize::from(j) * blocksize;
                                    commit_at(
                                        target,
                                        needed,
                                        index,
                                        sink,
                                        start_id + u32::from(j),
                                        &data[p..p + blocksize],
                                        p,
                                    );
                                    matched += 1;
                                }
                                run = RunState::Confirmed {
                                    next_pos: start_pos + usize::from(new_len) * blocksize,
                                    next_id: start_id + u32::from(new_len),
                                };
                            } else {
                                run = RunState::Empty;
                            }
                        } else {
                            run = RunState::Pending { start_pos, start_id, len: new_len };
                        }
                    } else {
                        run = RunState::Empty;
                    }
                }
            }
            RunState::Confirmed { next_pos, next_id } => {
                if pos == next_pos {
                    if has_candidate(index, weak.value(), next_id) && confirm(target, next_id, window) {
                        commit_at(target, needed, index, sink, next_id, window, pos);
                        matched += 1;
                        run = RunState::Confirmed {
                            next_pos: pos + blocksize,
                            next_id: next_id + 1,
                        };
                    } else {
                        run = RunState::Empty;
                    }
                }
            }
        }

        if index.should_rebuild() {
            index.rebuild();
        }

        if pos + 1 >= real_len {
            break;
        }
        weak.roll(data[pos], data[pos + blocksize])
            .expect("window was filled above");
        pos += 1;
    }

    matched
}

fn first_candidate(index: &BlockIndex, weak_value: u32) -> Option<u32> {
    index.candidates(weak_value).next()
}

fn has_candidate(index: &BlockIndex, weak_value: u32, wanted: u32) -> bool {
    index.candidates(weak_value).any(|id| id == wanted)
}

fn confirm(target: &TargetDescription, block_id: u32, window: &[u8]) -> bool {
    let Some(block) = target.blocks.get(block_id as usize) else {
        return false;
    };
    let prefix_len = usize::from(target.strong_bytes);
    let candidate = match target.strong_algorithm {
        StrongAlgorithm::Md4 => block_prefix::<Md4>(window, prefix_len),
        StrongAlgorithm::Sha1 => block_prefix::<Sha1>(window, prefix_len),
    };
    candidate == block.strong_prefix
}

fn commit_at(
    target: &TargetDescription,
    needed: &mut NeededSet,
    index: &mut BlockIndex,
    sink: &mut dyn BlockSink,
    block_id: u32,
    window: &[u8],
    source_offset: usize,
) {
    let logical_len = target.block_len(block_id) as usize;
    sink.note_match(block_id, source_offset);
    let _ = sink.write_block(block_id, &window[..logical_len]);
    needed.remove(block_id);
    index.remove(block_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use control::{choose_widths, BlockRecord};

    struct MemorySink {
        written: std::collections::BTreeMap<u32, Vec<u8>>,
    }

    impl BlockSink for MemorySink {
        fn write_block(&mut self, block_id: u32, data: &[u8]) -> io::Result<()> {
            self.written.insert(block_id, data.to_vec());
            Ok(())
        }
    }

    fn build_target(content: &[u8], blocksize: u32) -> TargetDescription {
        let length = content.len() as u64;
        let widths = choose_widths(length, blocksize);
        let block_count = length.div_ceil(u64::from(blocksize)) as u32;

        let blocks = (0..block_count)
            .map(|id| {
                let start = (id as usize) * blocksize as usize;
                let end = (start + blocksize as usize).min(content.len());
                let mut block_bytes = content[start..end].to_vec();
                block_bytes.resize(blocksize as usize, 0);

                let mut weak = RollingChecksum::new();
                weak.update_from_block(&block_bytes);
                let strong_prefix =
                    block_prefix::<Sha1>(&block_bytes, usize::from(widths.strong_bytes));

                BlockRecord {
                    id,
                    weak: weak.value(),
                    strong_prefix,
                }
            })
            .collect();

        TargetDescription {
            blocksize,
            length,
            seq_matches: widths.k,
            weak_bytes: widths.weak_bytes,
            strong_bytes: widths.strong_bytes,
            strong_algorithm: StrongAlgorithm::Sha1,
            whole_file_sha1: None,
            urls: vec!["http://example.invalid/f".into()],
            filename: None,
            mtime: None,
            blocks,
        }
    }

    /// Like `build_target`, but pins `seq_matches` to `k` directly instead
    /// of deriving it from content length, so a consecutive-match threshold
    /// of 2 or more can be exercised without constructing a multi-gigabyte
    /// fixture.
    fn build_target_with_k(content: &[u8], blocksize: u32, k: u8) -> TargetDescription {
        let length = content.len() as u64;
        let block_count = length.div_ceil(u64::from(blocksize)) as u32;

        let blocks = (0..block_count)
            .map(|id| {
                let start = (id as usize) * blocksize as usize;
                let end = (start + blocksize as usize).min(content.len());
                let mut block_bytes = content[start..end].to_vec();
                block_bytes.resize(blocksize as usize, 0);

                let mut weak = RollingChecksum::new();
                weak.update_from_block(&block_bytes);
                let strong_prefix = block_prefix::<Sha1>(&block_bytes, 8);

                BlockRecord {
                    id,
                    weak: weak.value(),
                    strong_prefix,
                }
            })
            .collect();

        TargetDescription {
            blocksize,
            length,
            seq_matches: k,
            weak_bytes: 4,
            strong_bytes: 8,
            strong_algorithm: StrongAlgorithm::Sha1,
            whole_file_sha1: None,
            urls: vec!["http://example.invalid/f".into()],
            filename: None,
            mtime: None,
            blocks,
        }
    }

    fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state & 0xff) as u8
            })
            .collect()
    }

    #[test]
    fn identity_seed_matches_every_block() {
        let content = random_bytes(10_000, 42);
        let target = build_target(&content, 1024);
        let mut index = BlockIndex::build(&target);
        let mut needed = NeededSet::full(target.block_count());
        let mut sink = MemorySink {
            written: Default::default(),
        };

        let matched = scan_bytes(&content, &target, &mut index, &mut needed, &mut sink);

        assert_eq!(matched as u32, target.block_count());
        assert!(needed.is_empty());
    }

    #[test]
    fn offset_shifted_seed_still_matches_every_block() {
        let content = random_bytes(10_000, 7);
        let target = build_target(&content, 1024);
        let mut seed = b"X".repeat(17);
        seed.extend_from_slice(&content);

        let mut index = BlockIndex::build(&target);
        let mut needed = NeededSet::full(target.block_count());
        let mut sink = MemorySink {
            written: Default::default(),
        };

        scan_bytes(&seed, &target, &mut index, &mut needed, &mut sink);
        assert!(needed.is_empty());
    }

    #[test]
    fn corrupt_byte_leaves_only_its_block_needed() {
        let mut content = random_bytes(10_000, 99);
        let target = build_target(&content, 1024);
        content[50] ^= 0xff;

        let mut index = BlockIndex::build(&target);
        let mut needed = NeededSet::full(target.block_count());
        let mut sink = MemorySink {
            written: Default::default(),
        };

        scan_bytes(&content, &target, &mut index, &mut needed, &mut sink);
        assert!(needed.contains(0));
        for id in 1..target.block_count() {
            assert!(!needed.contains(id), "block {id} unexpectedly needed");
        }
    }

    #[test]
    fn identity_seed_matches_every_block_when_two_consecutive_matches_are_required() {
        let content = random_bytes(10_000, 17);
        let target = build_target_with_k(&content, 1024, 2);
        let mut index = BlockIndex::build(&target);
        let mut needed = NeededSet::full(target.block_count());
        let mut sink = MemorySink {
            written: Default::default(),
        };

        let matched = scan_bytes(&content, &target, &mut index, &mut needed, &mut sink);

        assert_eq!(matched as u32, target.block_count());
        assert!(needed.is_empty());
    }

    #[test]
    fn single_isolated_block_does_not_confirm_when_two_consecutive_matches_are_required() {
        let content = random_bytes(10_000, 23);
        let target = build_target_with_k(&content, 1024, 2);

        let mut seed = random_bytes(500, 1);
        seed.extend_from_slice(&content[0..1024]);
        seed.extend(random_bytes(500, 2));

        let mut index = BlockIndex::build(&target);
        let mut needed = NeededSet::full(target.block_count());
        let mut sink = MemorySink {
            written: Default::default(),
        };

        scan_bytes(&seed, &target, &mut index, &mut needed, &mut sink);
        assert!(needed.contains(0));
    }

    #[test]
    fn mixed_seed_matches_head_and_tail_only() {
        let content = random_bytes(10_000, 5);
        let target = build_target(&content, 1024);
        let mut seed = content[0..4096].to_vec();
        seed.extend(random_bytes(2000, 123));
        seed.extend_from_slice(&content[content.len() - 1024..]);

        let mut index = BlockIndex::build(&target);
        let mut needed = NeededSet::full(target.block_count());
        let mut sink = MemorySink {
            written: Default::default(),
        };

        scan_bytes(&seed, &target, &mut index, &mut needed, &mut sink);
        for id in 0..4 {
            assert!(!needed.contains(id));
        }
        assert!(!needed.contains(9));
        for id in 4..9 {
            assert!(needed.contains(id));
        }
    }
}
