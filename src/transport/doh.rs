use std::time::Duration;

use reqwest::Client;
use tracing::trace;

use crate::error::DnsCachedError;

const QUERY_TIMEOUT: Duration = Duration::from_secs(3);
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// A DNS-over-HTTPS upstream (RFC 8484, POST form). The teacher only ever
/// serves this protocol (`transport/doh.rs`'s `DohServer`); this is the
/// client half it doesn't have, built from the same content-type convention.
pub struct DohUpstream {
    client: Client,
    url: String,
}

impl DohUpstream {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(QUERY_TIMEOUT)
            .build()
            .expect("reqwest client builds with default TLS backend");
        Self { client, url }
    }

    pub async fn query(&self, wire: &[u8]) -> Result<Vec<u8>, DnsCachedError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
            .header(reqwest::header::ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .body(wire.to_vec())
            .send()
            .await
            .map_err(|e| DnsCachedError::UpstreamIo(format!("{}: {e}", self.url)))?;

        if !response.status().is_success() {
            return Err(DnsCachedError::UpstreamIo(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DnsCachedError::UpstreamIo(format!("{}: {e}", self.url)))?;
        trace!(upstream = %self.url, bytes = bytes.len(), "received DoH upstream reply");
        Ok(bytes.to_vec())
    }

    pub fn label(&self) -> &str {
        &self.url
    }
}
