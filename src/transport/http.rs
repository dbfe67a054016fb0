use std::time::Duration;

use http::header::AUTHORIZATION;
use reqwest::{redirect, Client};
use tracing::debug;

use crate::error::TransportError;
use crate::transport::{Transport, TransportResponse};

/// `reqwest` backed transport.
///
/// Redirects are not followed, a `302 Found` is returned to the caller as is.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, authorization: &str) -> Result<TransportResponse, TransportError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}
