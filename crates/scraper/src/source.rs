//! Where pages come from.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{Result, ScrapeError};

/// Fetches the HTML body of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Live source backed by a reqwest client with the library's default timeouts.
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }

        let client = builder
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;

        // A non-success page is still markup; the parsers decide whether it
        // holds what they need.
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "non-success response");
        }

        response.text().await.map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })
    }
}

/// In-memory source serving canned pages keyed by absolute URL.
///
/// Unknown URLs fail like an unreachable host. Every requested URL is
/// recorded so callers can check how many fetches a run made.
#[derive(Default)]
pub struct MemoryPageSource {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.insert(url.into(), html.into());
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageSource for MemoryPageSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScrapeError::Unreachable {
                url: url.to_string(),
                reason: "no such page".to_string(),
            })
    }
}
