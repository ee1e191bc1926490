//! HTTP client for the collection API.

use crate::{ApiConfig, ResultEnvelope};
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

/// Failure classes for a lookup. Exactly two: the collaborator was
/// unreachable (or answered with a non-success status), or its body could
/// not be interpreted as a result envelope.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The lookup capability the UI is wired against. The production
/// implementation is [`QueryClient`]; tests inject scripted stand-ins.
pub trait Lookup {
    /// Search one facet: `field` is the facet name as displayed (e.g.
    /// "Culture"), `value` the facet value to match.
    fn lookup(&self, field: &str, value: &str) -> Result<ResultEnvelope, LookupError>;

    /// Follow a pagination token from a previous envelope's `info`.
    fn page(&self, url: &str) -> Result<ResultEnvelope, LookupError>;
}

pub struct QueryClient {
    http: Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl QueryClient {
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            page_size: config.page_size,
        })
    }

    fn lookup_url(&self, field: &str, value: &str) -> String {
        // The API takes the facet name lowercased as the query parameter
        // ("Culture" searches as &culture=...).
        format!(
            "{}/object?apikey={}&size={}&{}={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            self.page_size,
            urlencoding::encode(&field.to_lowercase()),
            urlencoding::encode(value),
        )
    }

    fn fetch(&self, url: &str) -> Result<ResultEnvelope, LookupError> {
        let response = self.http.get(url).send()?.error_for_status()?;
        // Read the body as text and decode it ourselves so a malformed body
        // surfaces as Decode rather than a transport error.
        let body = response.text()?;
        let envelope = serde_json::from_str(&body)?;
        Ok(envelope)
    }
}

impl Lookup for QueryClient {
    fn lookup(&self, field: &str, value: &str) -> Result<ResultEnvelope, LookupError> {
        let url = self.lookup_url(field, value);
        log::debug!("lookup {}={:?}", field, value);
        self.fetch(&url)
    }

    fn page(&self, url: &str) -> Result<ResultEnvelope, LookupError> {
        log::debug!("page {}", url);
        self.fetch(url)
    }
}
