//! Adler-style rolling weak checksum (`rsum`).
//!
//! Mirrors zsync's weak checksum: `a` accumulates the byte sum, `b`
//! accumulates the weighted prefix sum, both truncated to 16 bits. Sliding
//! the window by one byte is an O(1) update.

use std::fmt;

/// Errors raised while rolling the checksum window.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RollingError {
    /// `roll` was called before any bytes were ever loaded into the window.
    #[error("rolling checksum requires a non-empty window")]
    EmptyWindow,
}

/// Rolling checksum over a window of `blocksize` bytes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RollingChecksum {
    a: u32,
    b: u32,
    len: usize,
}

impl RollingChecksum {
    /// Creates a rolling checksum with zeroed state.
    #[must_use]
    pub const fn new() -> Self {
        Self { a: 0, b: 0, len: 0 }
    }

    /// Resets the checksum back to its initial state.
    pub fn reset(&mut self) {
        self.a = 0;
        self.b = 0;
        self.len = 0;
    }

    /// Number of bytes currently folded into the checksum.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes have been observed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears the state and folds in exactly `block`.
    pub fn update_from_block(&mut self, block: &[u8]) {
        self.reset();
        self.update(block);
    }

    /// Folds in an additional slice of bytes.
    pub fn update(&mut self, chunk: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;
        for &byte in chunk {
            a = (a + u32::from(byte)) & 0xffff;
            b = (b + a) & 0xffff;
        }
        self.a = a;
        self.b = b;
        self.len += chunk.len();
    }

    /// Rolls the window forward by one byte: removes `outgoing`, appends
    /// `incoming`. Requires the window to already hold at least one byte.
    #[inline]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> Result<(), RollingError> {
        if self.len == 0 {
            return Err(RollingError::EmptyWindow);
        }
        let window_len = self.len as u32;
        let out = u32::from(outgoing);
        let inn = u32::from(incoming);

        let new_a = self.a.wrapping_sub(out).wrapping_add(inn) & 0xffff;
        let new_b = self
            .b
            .wrapping_sub(window_len.wrapping_mul(out))
            .wrapping_add(new_a)
            & 0xffff;

        self.a = new_a;
        self.b = new_b;
        Ok(())
    }

    /// The packed 32-bit rolling sum, `(a << 16) | b`.
    #[must_use]
    pub const fn value(&self) -> u32 {
        (self.a << 16) | self.b
    }

    /// The `a` (byte-sum) component alone.
    #[must_use]
    pub const fn a(&self) -> u32 {
        self.a
    }

    /// The `b` (prefix-sum) component alone.
    #[must_use]
    pub const fn b(&self) -> u32 {
        self.b
    }
}

impl fmt::Display for RollingChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.value())
    }
}

/// Computes the mask applied to the `a` component before a weak sum is used
/// as a lookup key, given the control file's on-wire weak-checksum width `W`.
///
/// `W<=2` drops `a` from the key entirely (mask 0, lookup by `b` alone),
/// `W==3` keeps the low byte of `a`, `W>=4` keeps all of `a`.
#[must_use]
pub const fn weak_a_mask(weak_bytes: u8) -> u32 {
    match weak_bytes {
        0 | 1 | 2 => 0,
        3 => 0xff,
        _ => 0xffff,
    }
}

/// Applies a weak-checksum-width mask to a full 32-bit rolling value,
/// producing the key actually used for index lookups.
#[must_use]
pub const fn masked_value(value: u32, weak_bytes: u8) -> u32 {
    let a_mask = weak_a_mask(weak_bytes);
    let a = (value >> 16) & a_mask;
    let b = value & 0xffff;
    (a << 16) | b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_checksum_is_zero() {
        let c = RollingChecksum::new();
        assert_eq!(c.value(), 0);
        assert!(c.is_empty());
    }

    #[test]
    fn roll_matches_full_recompute() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let window = 8usize;

        let mut rolled = RollingChecksum::new();
        rolled.update(&data[0..window]);

        for start in 1..=(data.len() - window) {
            rolled.roll(data[start - 1], data[start + window - 1]).unwrap();

            let mut fresh = RollingChecksum::new();
            fresh.update(&data[start..start + window]);

            assert_eq!(rolled.value(), fresh.value(), "mismatch at start={start}");
        }
    }

    #[test]
    fn roll_on_empty_window_errors() {
        let mut c = RollingChecksum::new();
        assert_eq!(c.roll(b'a', b'b'), Err(RollingError::EmptyWindow));
    }

    #[test]
    fn weak_mask_table() {
        assert_eq!(weak_a_mask(1), 0);
        assert_eq!(weak_a_mask(2), 0);
        assert_eq!(weak_a_mask(3), 0xff);
        assert_eq!(weak_a_mask(4), 0xffff);
    }

    #[test]
    fn masked_value_hides_a_component_for_narrow_width() {
        let mut c = RollingChecksum::new();
        c.update(b"abcdefgh");
        let full = c.value();
        let masked = masked_value(full, 1);
        assert_eq!(masked >> 16, 0);
        assert_eq!(masked & 0xffff, full & 0xffff);
    }

    proptest::proptest! {
        #[test]
        fn roll_equals_recompute_for_random_windows(
            data in proptest::collection::vec(proptest::num::u8::ANY, 16..64),
            window in 1usize..16,
        ) {
            if window >= data.len() {
                return Ok(());
            }
            let mut rolled = RollingChecksum::new();
            rolled.update(&data[0..window]);
            for start in 1..=(data.len() - window) {
                rolled.roll(data[start - 1], data[start + window - 1]).unwrap();
                let mut fresh = RollingChecksum::new();
                fresh.update(&data[start..start + window]);
                proptest::prop_assert_eq!(rolled.value(), fresh.value());
            }
        }
    }
}
