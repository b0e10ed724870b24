//! Web page retrieval for the AI-assisted path.

pub mod fetcher;

use thiserror::Error;

pub use fetcher::{Fetcher, PageContent, DEFAULT_TIMEOUT};

/// Page fetch errors.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Transport failure (DNS, connect, timeout).
    #[error("failed to fetch {url}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying failure
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-2xx status.
    #[error("unexpected status code {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {url}")]
    Body {
        /// Requested URL
        url: String,
        /// Underlying failure
        #[source]
        source: reqwest::Error,
    },

    /// The document could not be parsed.
    #[error("failed to parse HTML: {0}")]
    Parse(String),
}
