//! Core data types for whale alerts.
//!
//! These types match the JSON payloads emitted by the dashboard API, both
//! on the push feed and in historical query responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single large-trade alert as emitted by the remote feed.
///
/// Immutable value; the push feed and the historical query are the only
/// producers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AlertRecord {
    /// Time the trade was observed upstream (ISO-8601 on the wire)
    pub timestamp: DateTime<Utc>,
    /// Market symbol, e.g. "BTC/USD"
    pub symbol: String,
    /// Side of the trade
    pub side: Side,
    /// Trade quantity in base units
    #[serde(rename = "qty")]
    pub quantity: f64,
}

/// Order side (buy or sell), lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Check if this is a buy
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Check if this is a sell
    pub fn is_sell(&self) -> bool {
        matches!(self, Side::Sell)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
