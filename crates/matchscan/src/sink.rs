//! The write side of a match: wherever a confirmed block's bytes end up.

use std::io;

/// Accepts validated block contents at a known block-id.
///
/// Implemented by the target store; the scanner and the reconstruction
/// coordinator depend only on this trait so they never need to know how
/// (or where) blocks are physically stored.
pub trait BlockSink {
    /// Writes the full contents of `block_id` (`target.block_len(block_id)`
    /// bytes, already validated against the strong hash).
    fn write_block(&mut self, block_id: u32, data: &[u8]) -> io::Result<()>;

    /// Called once per confirmed match, just before [`Self::write_block`],
    /// with the byte offset in the scanned seed the match was found at.
    /// Sinks that only care about the reconstructed bytes (the common
    /// case) can ignore this; a range-planning sink uses it to record
    /// which seed bytes can be reused in place of a download.
    fn note_match(&mut self, _block_id: u32, _source_offset: usize) {}
}
