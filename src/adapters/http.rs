use crate::domain::ports::RemoteSource;
use crate::utils::error::{ReleaseError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Plain GET access over HTTP(S) using the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(ReleaseError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
