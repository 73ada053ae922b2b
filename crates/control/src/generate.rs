//! Builds a [`TargetDescription`] from a data stream, the generator side of
//! the control-file codec.

use std::io::Read;

use checksums::rolling::RollingChecksum;
use checksums::strong::{block_prefix, Sha1, StrongDigest};

use crate::error::Result;
use crate::sizing::choose_widths;
use crate::target::{BlockRecord, StrongAlgorithm, TargetDescription};

/// Caller-supplied metadata that has no bearing on the checksum table
/// itself but is carried into the emitted control file.
#[derive(Clone, Debug, Default)]
pub struct GeneratorOptions {
    /// Explicit block size; `None` lets the generator pick one from the
    /// source length the same way `make.c` does for unspecified `-b`.
    pub blocksize: Option<u32>,
    /// Suggested output filename (rejected downstream if it contains `/`).
    pub filename: Option<String>,
    /// Mirror URLs, in the order they should appear in the control file.
    pub urls: Vec<String>,
    /// Modification time to record, Unix seconds.
    pub mtime: Option<i64>,
}

/// Default block size used when the caller does not request one: `2048`
/// below 100 MiB, `4096` at or above, matching `make.c`'s heuristic.
#[must_use]
pub fn default_blocksize(length: u64) -> u32 {
    const HUNDRED_MIB: u64 = 100 * 1024 * 1024;
    if length >= HUNDRED_MIB {
        4096
    } else {
        2048
    }
}

/// Reads all of `source`, computing the whole-file SHA-1 and the per-block
/// weak/strong checksum table, and returns a fully-populated
/// [`TargetDescription`] ready for [`crate::codec::emit`].
pub fn generate<R: Read>(mut source: R, options: &GeneratorOptions) -> Result<TargetDescription> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;

    let length = data.len() as u64;
    let blocksize = options.blocksize.unwrap_or_else(|| default_blocksize(length));
    let widths = choose_widths(length, blocksize);

    let mut whole_file = Sha1::new();
    whole_file.update(&data);
    let whole_file_sha1 = whole_file.finalize();

    let block_count = length.div_ceil(u64::from(blocksize.max(1))).max(1) as u32;
    let mut blocks = Vec::with_capacity(block_count as usize);

    for id in 0..block_count {
        let start = usize::try_from(u64::from(id) * u64::from(blocksize)).unwrap_or(usize::MAX);
        let end = (start + blocksize as usize).min(data.len());
        let mut window = data.get(start..end).unwrap_or(&[]).to_vec();
        window.resize(blocksize as usize, 0);

        let mut weak = RollingChecksum::new();
        weak.update(&window);

        let strong_prefix = block_prefix::<Sha1>(&window, usize::from(widths.strong_bytes));

        blocks.push(BlockRecord {
            id,
            weak: weak.value(),
            strong_prefix,
        });
    }

    Ok(TargetDescription {
        blocksize,
        length,
        seq_matches: widths.k,
        weak_bytes: widths.weak_bytes,
        strong_bytes: widths.strong_bytes,
        strong_algorithm: StrongAlgorithm::Sha1,
        whole_file_sha1: Some(whole_file_sha1),
        urls: options.urls.clone(),
        filename: options.filename.clone(),
        mtime: options.mtime,
        blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn generated_target_round_trips_through_the_codec() {
        let data = b"the quick brown fox jumps over the lazy dog, many times over".repeat(40);
        let options = GeneratorOptions {
            blocksize: Some(64),
            filename: Some("payload.bin".to_string()),
            urls: vec!["http://example.invalid/payload.bin".to_string()],
            mtime: Some(1_153_858_937),
        };

        let target = generate(data.as_slice(), &options).unwrap();
        assert_eq!(target.length, data.len() as u64);

        let mut buf = Vec::new();
        codec::emit(&mut buf, &target).unwrap();
        let reparsed = codec::parse(buf.as_slice()).unwrap();

        assert_eq!(reparsed.length, target.length);
        assert_eq!(reparsed.blocksize, target.blocksize);
        assert_eq!(reparsed.blocks.len(), target.blocks.len());
        assert_eq!(reparsed.whole_file_sha1, target.whole_file_sha1);
    }

    #[test]
    fn empty_input_still_produces_a_single_empty_block() {
        let target = generate(&b""[..], &GeneratorOptions::default()).unwrap();
        assert_eq!(target.length, 0);
        assert_eq!(target.block_count(), 1);
    }

    #[test]
    fn no_urls_or_filename_yields_no_url_fallback() {
        let target = generate(&b"abc"[..], &GeneratorOptions::default()).unwrap();
        assert!(target.urls.is_empty());
    }
}
