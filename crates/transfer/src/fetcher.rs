//! The external HTTP byte-range collaborator the coordinator drives during
//! the fetch phase. Transport itself lives outside this crate; only the
//! contract is defined here.

use thiserror::Error;

/// Failure fetching a byte range from a mirror URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport itself failed (connection refused, TLS error, DNS,
    /// non-2xx/206 status, etc).
    #[error("fetch failed for {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The server returned fewer bytes than requested, other than the
    /// final byte of the file.
    #[error("short response from {url}: wanted {wanted} bytes, got {got}")]
    ShortResponse {
        /// The URL that was requested.
        url: String,
        /// Bytes requested.
        wanted: u64,
        /// Bytes actually received.
        got: u64,
    },
}

/// Given a URL and an inclusive byte range, returns the bytes or an error.
///
/// A server returning more than requested has the surplus ignored by the
/// caller; a short response is only tolerated when `hi` is the last byte
/// of the target file.
pub trait RangeFetcher {
    /// Fetches bytes `[lo, hi]` (inclusive) of `url`.
    fn fetch_range(&mut self, url: &str, lo: u64, hi: u64) -> Result<Vec<u8>, FetchError>;
}
