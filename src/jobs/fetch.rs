#[cfg(test)]
use std::collections::HashMap;
use std::fmt;
#[cfg(test)]
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

const PREVIEW_CHARS: usize = 120;

/// Why a fetch produced no content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchMiss {
    Timeout,
    Transport(String),
    Status(u16),
}

impl fmt::Display for FetchMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMiss::Timeout => write!(f, "request timed out"),
            FetchMiss::Transport(msg) => write!(f, "transport error: {msg}"),
            FetchMiss::Status(code) => write!(f, "non-success status {code}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fetched {
    Body(String),
    Empty(FetchMiss),
}

impl Fetched {
    pub fn into_body(self) -> Option<String> {
        match self {
            Fetched::Body(b) => Some(b),
            Fetched::Empty(_) => None,
        }
    }

    pub fn is_body(&self) -> bool { matches!(self, Fetched::Body(_)) }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Fetched;
}

pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Fetched {
        let resp = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => return miss(url, from_reqwest(e)),
        };
        let status = resp.status();
        if !status.is_success() {
            return miss(url, FetchMiss::Status(status.as_u16()));
        }
        match resp.text().await {
            Ok(body) => {
                debug!(url, status = status.as_u16(), preview = %preview(&body), "fetched");
                Fetched::Body(body)
            }
            Err(e) => miss(url, from_reqwest(e)),
        }
    }
}

fn from_reqwest(err: reqwest::Error) -> FetchMiss {
    if err.is_timeout() { FetchMiss::Timeout } else { FetchMiss::Transport(err.to_string()) }
}

fn miss(url: &str, reason: FetchMiss) -> Fetched {
    warn!(url, reason = %reason, "no content");
    Fetched::Empty(reason)
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).map(|c| if c.is_whitespace() { ' ' } else { c }).collect()
}
