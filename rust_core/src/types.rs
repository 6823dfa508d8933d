//! Market records and match results shared across the crate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MarketError;
use crate::matching::event_key::EventKey;

/// Trading venue a market was fetched from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Kalshi,
    Polymarket,
    #[default]
    Other,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Kalshi => "kalshi",
            Venue::Polymarket => "polymarket",
            Venue::Other => "other",
        }
    }
}

/// A binary market as supplied by a venue connector.
///
/// Only `ticker`, `title` and `metadata` take part in matching. The quote
/// fields ride along so a match can be priced without a second lookup.
/// Prices are on the 0-1 scale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub ticker: String,
    pub title: String,
    #[serde(default)]
    pub venue: Venue,
    #[serde(default)]
    pub yes_price: Option<f64>,
    #[serde(default)]
    pub no_price: Option<f64>,
    #[serde(default)]
    pub yes_bid: Option<f64>,
    #[serde(default)]
    pub yes_ask: Option<f64>,
    #[serde(default)]
    pub no_bid: Option<f64>,
    #[serde(default)]
    pub no_ask: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub liquidity: Option<f64>,
    /// Venue-specific fields (event times, slugs, outcome names, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Market {
    pub fn new(ticker: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_venue(mut self, venue: Venue) -> Self {
        self.venue = venue;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_quotes(mut self, yes_bid: f64, yes_ask: f64, no_bid: f64, no_ask: f64) -> Self {
        self.yes_bid = Some(yes_bid);
        self.yes_ask = Some(yes_ask);
        self.no_bid = Some(no_bid);
        self.no_ask = Some(no_ask);
        self
    }

    /// String value of a metadata field, if present and a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Reject records the matcher must not process.
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.ticker.trim().is_empty() {
            return Err(MarketError::EmptyTicker);
        }
        if self.title.trim().is_empty() {
            return Err(MarketError::EmptyTitle {
                ticker: self.ticker.clone(),
            });
        }
        Ok(())
    }
}

/// Best bid/ask for the YES side of a market.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedQuote {
    pub yes_bid: Option<f64>,
    pub yes_ask: Option<f64>,
    pub no_bid: Option<f64>,
    pub no_ask: Option<f64>,
}

/// Two markets, one per venue, that describe the same real-world event.
///
/// Holds borrowed views into the caller's snapshots; it lives only as long as
/// the snapshots it was built from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketMatch<'a> {
    pub primary: &'a Market,
    pub secondary: &'a Market,
    pub key: EventKey,
    /// YES on `primary` corresponds to NO on `secondary`
    pub inverted: bool,
}

impl<'a> MarketMatch<'a> {
    /// Secondary quotes expressed in terms of the primary market's YES outcome.
    pub fn aligned_secondary(&self) -> AlignedQuote {
        let m = self.secondary;
        if self.inverted {
            AlignedQuote {
                yes_bid: m.no_bid,
                yes_ask: m.no_ask,
                no_bid: m.yes_bid,
                no_ask: m.yes_ask,
            }
        } else {
            AlignedQuote {
                yes_bid: m.yes_bid,
                yes_ask: m.yes_ask,
                no_bid: m.no_bid,
                no_ask: m.no_ask,
            }
        }
    }
}

/// Counters for one matching pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub primary_total: usize,
    pub secondary_total: usize,
    pub secondary_indexed: usize,
    pub secondary_skipped: usize,
    pub secondary_duplicates: usize,
    pub primary_skipped: usize,
    pub matched: usize,
    pub inverted: usize,
}

/// Result of `MarketMatcher::match_markets`.
///
/// Only the primary venue's leftovers are reported; secondary markets that
/// found no partner are not tracked.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatchOutcome<'a> {
    pub matches: Vec<MarketMatch<'a>>,
    pub unmatched: Vec<&'a Market>,
    pub stats: MatchStats,
}
