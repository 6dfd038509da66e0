//! Feed configuration and API base-url resolution.

use std::time::Duration;

use url::Url;

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "WHALEWATCH_API_BASE";

/// Fallback API base when the environment does not provide one.
pub const DEFAULT_API_BASE: &str = "http://64.23.190.226/api/";

/// Relative path of the push feed under the API base.
pub const STREAM_PATH: &str = "whales/stream";

/// Capacity of the shared notification store.
pub const NOTIFICATION_CAPACITY: usize = 50;

/// Capacity of a page-local live feed view.
pub const LIVE_FEED_CAPACITY: usize = 100;

/// Most recent toasts kept on screen at once.
pub const MAX_ACTIVE_TOASTS: usize = 3;

/// How long a toast stays on screen before auto-expiring.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// Configuration for one stream subscription.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// API base URL; stream and query paths are joined onto this.
    pub base_url: Url,
    /// Optional symbol filter for the subscription.
    pub symbol: Option<String>,
    /// Fixed delay before reconnecting after a failure.
    pub reconnect_delay: Duration,
    /// Alert channel buffer size.
    pub channel_buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: resolve_api_base(),
            symbol: None,
            reconnect_delay: Duration::from_secs(5),
            channel_buffer_size: 256,
        }
    }
}

impl FeedConfig {
    /// Configuration against an explicit API base.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            ..Default::default()
        }
    }

    /// Restrict the subscription to a single symbol.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set reconnect delay
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set channel buffer size
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }

    /// Full URL of the push feed for this subscription.
    pub fn stream_url(&self) -> Url {
        let mut url = join_api(&self.base_url, STREAM_PATH);
        if let Some(symbol) = &self.symbol {
            url.query_pairs_mut().append_pair("symbol", symbol);
        }
        url
    }
}

/// Resolve the API base from the environment, falling back to the fixed
/// default when unset or unparseable.
pub fn resolve_api_base() -> Url {
    std::env::var(API_BASE_ENV)
        .ok()
        .and_then(|raw| parse_api_base(&raw))
        .unwrap_or_else(|| {
            Url::parse(DEFAULT_API_BASE).expect("default api base is a valid url")
        })
}

/// Parse a base URL, appending the trailing slash that relative joins need.
fn parse_api_base(raw: &str) -> Option<Url> {
    if raw.ends_with('/') {
        Url::parse(raw).ok()
    } else {
        Url::parse(&format!("{raw}/")).ok()
    }
}

/// Join a relative API path onto the base.
pub(crate) fn join_api(base: &Url, path: &str) -> Url {
    base.join(path)
        .expect("api base url joins with a relative path")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8000/api/").unwrap()
    }

    #[test]
    fn test_stream_url_without_filter() {
        let config = FeedConfig::new(base());
        assert_eq!(
            config.stream_url().as_str(),
            "http://localhost:8000/api/whales/stream"
        );
    }

    #[test]
    fn test_stream_url_with_symbol_filter() {
        let config = FeedConfig::new(base()).with_symbol("BTC/USD");
        assert_eq!(
            config.stream_url().as_str(),
            "http://localhost:8000/api/whales/stream?symbol=BTC%2FUSD"
        );
    }

    #[test]
    fn test_parse_api_base_appends_trailing_slash() {
        let url = parse_api_base("http://localhost:8000/api").unwrap();
        assert_eq!(
            join_api(&url, "whales").as_str(),
            "http://localhost:8000/api/whales"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = FeedConfig::new(base())
            .with_reconnect_delay(Duration::from_secs(2))
            .with_channel_buffer_size(32);

        assert_eq!(config.reconnect_delay, Duration::from_secs(2));
        assert_eq!(config.channel_buffer_size, 32);
        assert!(config.symbol.is_none());
    }
}
