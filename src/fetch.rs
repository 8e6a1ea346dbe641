//! HTTP access for external scripts.
//!
//! Discovery only talks to the [`ScriptFetcher`] trait. The default
//! implementation, [`HttpFetcher`], is a blocking `reqwest` client and is only
//! compiled with the `fetch` feature.

use std::time::Duration;

use thiserror::Error;

/// Why a single script download failed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure.
    #[error("failed to download {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered with a non-2xx status.
    #[error("failed to download {url}: HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Something that can GET a URL and hand back the body.
pub trait ScriptFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default `User-Agent` header.
pub fn default_user_agent() -> String {
    format!("mhtsplit/{}", env!("CARGO_PKG_VERSION"))
}

/// Blocking HTTP fetcher with a per-request timeout.
#[cfg(feature = "fetch")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "fetch")]
impl ScriptFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().map_err(transport)?;
        Ok(body.to_vec())
    }
}
