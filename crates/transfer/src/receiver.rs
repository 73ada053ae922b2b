//! Splits a received byte-range buffer back into whole blocks, so the
//! coordinator can hand each one to the strong-hash verifier independently
//! of how many blocks a single fetched range happened to span.

use control::TargetDescription;

/// Splits `data` (read starting at the block-aligned `start_offset`) into
/// `(block_id, full_block_bytes)` pairs.
///
/// The amount to zero-pad a block to is always taken from
/// [`TargetDescription::block_len`] — the single source of truth for how
/// long a block's real content is — never inferred from how many bytes
/// `data` itself happened to contain. This keeps the one genuinely valid
/// short-tail case (the file's final block, which is shorter than
/// `blocksize` by design) distinct from a truncated or short read on any
/// other block, which downstream strong-hash verification will simply
/// reject rather than silently accept.
#[must_use]
pub fn split_into_blocks(target: &TargetDescription, start_offset: u64, data: &[u8]) -> Vec<(u32, Vec<u8>)> {
    let blocksize = u64::from(target.blocksize);
    debug_assert_eq!(start_offset % blocksize, 0, "fetched ranges are always block-aligned");

    let mut blocks = Vec::new();
    let mut offset = start_offset;
    let mut cursor = 0usize;

    while cursor < data.len() {
        let block_id = (offset / blocksize) as u32;
        if block_id >= target.block_count() {
            break;
        }
        let logical_len = target.block_len(block_id) as usize;
        let available = data.len() - cursor;
        let take = logical_len.min(available);

        let mut block_bytes = data[cursor..cursor + take].to_vec();
        block_bytes.resize(target.blocksize as usize, 0);
        blocks.push((block_id, block_bytes));

        cursor += take;
        offset += blocksize;
    }

    blocks
}
