//! The one concrete [`RangeFetcher`]: plain HTTP(S) byte-range GETs via
//! `ureq`.

use std::io::Read;
use std::time::Duration;

use transfer::{FetchError, RangeFetcher};

/// Issues `Range: bytes=lo-hi` GET requests against whatever `ureq`'s
/// default TLS/connection stack supports.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Builds a fetcher with conservative connect/read timeouts.
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(30))
            .build();
        Self { agent }
    }

    /// Performs a plain (non-range) GET, for fetching a control file given
    /// as a URL on the command line.
    pub fn get_whole(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.agent.get(url).call().map_err(|err| FetchError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        let mut buf = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut buf)
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        Ok(buf)
    }
}

impl RangeFetcher for HttpFetcher {
    fn fetch_range(&mut self, url: &str, lo: u64, hi: u64) -> Result<Vec<u8>, FetchError> {
        let wanted = hi - lo + 1;
        let range_header = format!("bytes={lo}-{hi}");
        let response = self
            .agent
            .get(url)
            .set("Range", &range_header)
            .call()
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        let mut buf = Vec::new();
        response
            .into_reader()
            .take(wanted)
            .read_to_end(&mut buf)
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        if (buf.len() as u64) < wanted {
            return Err(FetchError::ShortResponse {
                url: url.to_string(),
                wanted,
                got: buf.len() as u64,
            });
        }
        Ok(buf)
    }
}
