use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::ACCEPT;

use subgauge_core::error::{Result, SubgaugeError};

use super::{FetchError, Fetcher};

const USER_AGENT: &str = concat!("subgauge/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed fetcher. One client (and connection pool) per process.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SubgaugeError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, deadline: Duration) -> std::result::Result<Bytes, FetchError> {
        let url = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        // The deadline covers connect, headers, and the full body.
        let request = async {
            let resp = self
                .client
                .get(url)
                .header(ACCEPT, "text/html")
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            resp.bytes()
                .await
                .map_err(|e| FetchError::Transport(format!("failed to read response body: {e}")))
        };

        tokio::time::timeout(deadline, request)
            .await
            .map_err(|_| FetchError::Timeout(deadline))?
    }
}
