use std::time::Duration;

use anyhow::{Context, Error, Result, bail};
use async_trait::async_trait;

use super::{Backend, ChatRequest, ChatResponse, ModeRequest, StatusResponse};
use crate::chat::Mode;

/// Talks to the backend over HTTP. The backend keeps the mode and
/// history in a cookie session so a single client with a cookie store
/// is reused for every call.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    api_base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse, Error> {
        let resp = self
            .client
            .post(self.url("/chat"))
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await?;

        // Error responses still carry a JSON body with an `error` field
        let status = resp.status();
        let body: ChatResponse = resp
            .json()
            .await
            .with_context(|| format!("Invalid chat response (HTTP {})", status))?;
        tracing::debug!("Chat response HTTP {}: {:?}", status, body);
        Ok(body)
    }

    async fn set_mode(&self, mode: Mode) -> Result<(), Error> {
        self.client
            .post(self.url("/mode"))
            .header("Content-Type", "application/json")
            .json(&ModeRequest { mode })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        let resp = self
            .client
            .post(self.url("/clear"))
            .header("Content-Type", "application/json")
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("Clear failed with HTTP {}", resp.status());
        }
        Ok(())
    }

    async fn status(&self) -> Result<StatusResponse, Error> {
        let status = self
            .client
            .get(self.url("/status"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Invalid status response")?;
        Ok(status)
    }
}
