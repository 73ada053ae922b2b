//! Derivation of sound checksum widths from file size and block size,
//! ported from `make.c`'s `rsum_len` / `checksum_len` calculation.

/// The `(k, weak_bytes, strong_bytes)` triple chosen for a target of length
/// `length` with the given `blocksize`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChecksumWidths {
    /// Consecutive-match requirement before a strong-hash confirmation is
    /// attempted.
    pub k: u8,
    /// Width in bytes of the on-wire weak checksum, `1..=4`.
    pub weak_bytes: u8,
    /// Width in bytes of the strong-hash prefix, `4..=16`.
    pub strong_bytes: u8,
}

/// Computes checksum widths for a file of `length` bytes split into blocks
/// of `blocksize` bytes.
#[must_use]
pub fn choose_widths(length: u64, blocksize: u32) -> ChecksumWidths {
    let length = length.max(1) as f64;
    let blocksize = f64::from(blocksize.max(1));

    let mut k: u8 = 1;
    let mut weak_bytes =
        (((length.log2() + blocksize.log2()) - 8.6) / 8.0).ceil() as i64;

    if weak_bytes > 4 {
        weak_bytes = 4;
        k = 2;
    }
    weak_bytes = weak_bytes.max(2);

    let blocks_term = (1.0 + length / blocksize).log2();
    let candidate_a = ((20.0 + length.log2() + blocks_term) / (8.0 * f64::from(k))).ceil() as i64;
    let candidate_b = ((20.0 + blocks_term) / 8.0).ceil() as i64;
    let strong_bytes = candidate_a.max(candidate_b).clamp(4, 16);

    ChecksumWidths {
        k,
        weak_bytes: weak_bytes.clamp(1, 4) as u8,
        strong_bytes: strong_bytes as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_file_uses_minimum_widths() {
        let widths = choose_widths(10_000, 1024);
        assert_eq!(widths.k, 1);
        assert_eq!(widths.weak_bytes, 2);
        assert!((4..=16).contains(&widths.strong_bytes));
    }

    #[test]
    fn huge_file_switches_to_two_consecutive_matches() {
        // Large enough that the unclamped weak_bytes calculation exceeds 4.
        let widths = choose_widths(1 << 40, 2048);
        assert_eq!(widths.k, 2);
        assert_eq!(widths.weak_bytes, 4);
    }

    #[test]
    fn strong_bytes_always_in_range() {
        for length in [1u64, 1_000, 1_000_000, 1 << 32] {
            for blocksize in [512u32, 2048, 4096, 32768] {
                let widths = choose_widths(length, blocksize);
                assert!((4..=16).contains(&widths.strong_bytes));
                assert!((1..=4).contains(&widths.weak_bytes));
            }
        }
    }
}
