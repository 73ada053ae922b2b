//! Strong per-block digests.
//!
//! The control file names which algorithm (MD4 or SHA-1) the target's
//! per-block strong checksums were generated with; callers select the
//! concrete hasher through the [`StrongDigest`] trait rather than assuming
//! one algorithm.

mod md4;
mod sha1;

pub use md4::Md4;
pub use sha1::Sha1;

/// A streaming strong-checksum algorithm usable as a zsync block digest.
pub trait StrongDigest: Sized {
    /// Full digest output type (16 bytes for MD4, 20 for SHA-1).
    type Digest: AsRef<[u8]>;

    /// Creates a hasher with empty state.
    fn new() -> Self;

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest.
    fn finalize(self) -> Self::Digest;

    /// Hashes `data` in one shot.
    fn digest(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Computes the strong-hash prefix for one block: hash exactly `block.len()`
/// bytes (the caller is responsible for zero-padding a short final block to
/// the full blocksize before calling this) and keep the leading `prefix_len`
/// bytes.
pub fn block_prefix<D: StrongDigest>(block: &[u8], prefix_len: usize) -> Vec<u8> {
    let digest = D::digest(block);
    let bytes = digest.as_ref();
    bytes[..prefix_len.min(bytes.len())].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_truncates_to_requested_width() {
        let full = Sha1::digest(b"hello world");
        let prefix = block_prefix::<Sha1>(b"hello world", 8);
        assert_eq!(prefix.as_slice(), &full[..8]);
    }
}
