//! Page fetching.
//!
//! The refresher only needs "GET with a deadline, give me the body". Tests
//! plug in their own `Fetcher`; production uses `HttpFetcher`.

mod http;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use subgauge_core::FailureKind;

pub use http::HttpFetcher;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),
    #[error("HTTP status {0} (expected 2xx)")]
    Status(u16),
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::Status(_) => FailureKind::Status,
            FetchError::Transport(_) => FailureKind::Transport,
            FetchError::InvalidUrl(_) => FailureKind::InvalidUrl,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status(s) => Some(*s),
            _ => None,
        }
    }
}

/// GET one target within `deadline`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, deadline: Duration) -> Result<Bytes, FetchError>;
}
