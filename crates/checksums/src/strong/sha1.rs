use digest::Digest;

use super::StrongDigest;

/// Streaming SHA-1 hasher: both the modern per-block strong checksum and the
/// whole-file hash use this type.
#[derive(Clone, Debug, Default)]
pub struct Sha1 {
    inner: sha1::Sha1,
}

impl Sha1 {
    /// Creates a hasher with an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: sha1::Sha1::new(),
        }
    }
}

impl StrongDigest for Sha1 {
    type Digest = [u8; 20];

    fn new() -> Self {
        Sha1::new()
    }

    fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    fn finalize(self) -> Self::Digest {
        self.inner.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_known_digest() {
        let digest = <Sha1 as StrongDigest>::digest(b"");
        assert_eq!(
            hex(&digest),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
