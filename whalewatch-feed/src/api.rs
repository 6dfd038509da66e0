//! Request/response client for the dashboard REST API.
//!
//! Covers the historical whale query (backfill of past alerts) and the
//! symbol list. Failures surface as one human-readable [`ApiError`] to
//! the immediate caller; retrying is the caller's decision.

use serde::Deserialize;
use url::Url;

use crate::alert::AlertRecord;
use crate::config::{join_api, resolve_api_base};
use crate::error::ApiError;

/// Historical whale query response, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct WhaleHistory {
    pub count: usize,
    pub data: Vec<AlertRecord>,
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    symbols: Vec<String>,
}

/// Thin client over the request/response endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Client against the environment-resolved API base.
    pub fn new() -> Self {
        Self::with_base_url(resolve_api_base())
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Past whale alerts, newest first; both filters optional.
    pub async fn whale_history(
        &self,
        symbol: Option<&str>,
        limit: Option<usize>,
    ) -> Result<WhaleHistory, ApiError> {
        self.get_json(whales_url(&self.base_url, symbol, limit)).await
    }

    /// Symbols known to the backend, for filter selectors.
    pub async fn symbols(&self) -> Result<Vec<String>, ApiError> {
        let response: SymbolsResponse = self.get_json(join_api(&self.base_url, "symbols")).await?;
        Ok(response.symbols)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the `whales` query URL with optional filters.
fn whales_url(base: &Url, symbol: Option<&str>, limit: Option<usize>) -> Url {
    let mut url = join_api(base, "whales");
    if limit.is_some() || symbol.is_some() {
        let mut pairs = url.query_pairs_mut();
        if let Some(limit) = limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(symbol) = symbol {
            pairs.append_pair("symbol", symbol);
        }
    }
    url
}
