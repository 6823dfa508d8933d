//! Venue provider abstractions
//!
//! Defines the MarketProvider trait that venue connectors implement to hand
//! the matcher a uniform market snapshot, plus `fetch_and_match`, which runs
//! one matching pass over two providers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::matching::event_key::EventKey;
use crate::matching::MarketMatcher;
use crate::types::{AlignedQuote, Market, MatchOutcome, MatchStats, Venue};

pub mod snapshot;

pub use snapshot::SnapshotProvider;

/// Source of markets for one venue
///
/// Connectors own authentication, polling and transport; the matcher only
/// sees the `Market` records they return.
#[async_trait]
pub trait MarketProvider: Send + Sync {
    /// Venue this provider serves
    fn venue(&self) -> Venue;

    /// Current snapshot of all open markets
    async fn fetch_markets(&self) -> Result<Vec<Market>>;

    /// Single market by ticker
    async fn fetch_market(&self, ticker: &str) -> Result<Option<Market>>;

    /// Updates for one market; the channel closes when the provider drops it
    async fn subscribe(&self, ticker: &str) -> Result<mpsc::Receiver<Market>>;
}

/// One matched pair, owned and ready to serialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub key: EventKey,
    pub primary_ticker: String,
    pub primary_title: String,
    pub secondary_ticker: String,
    pub secondary_title: String,
    pub inverted: bool,
    /// Secondary quotes in terms of the primary market's YES
    pub secondary_aligned: AlignedQuote,
}

/// Owned result of a matching pass over two provider snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub generated_at: DateTime<Utc>,
    pub primary_venue: Venue,
    pub secondary_venue: Venue,
    pub matches: Vec<MatchedPair>,
    /// Tickers of primary markets without a partner
    pub unmatched: Vec<String>,
    pub stats: MatchStats,
}

impl MatchReport {
    pub fn from_outcome(outcome: &MatchOutcome<'_>, primary_venue: Venue, secondary_venue: Venue) -> Self {
        let matches = outcome
            .matches
            .iter()
            .map(|m| MatchedPair {
                key: m.key.clone(),
                primary_ticker: m.primary.ticker.clone(),
                primary_title: m.primary.title.clone(),
                secondary_ticker: m.secondary.ticker.clone(),
                secondary_title: m.secondary.title.clone(),
                inverted: m.inverted,
                secondary_aligned: m.aligned_secondary(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            primary_venue,
            secondary_venue,
            matches,
            unmatched: outcome.unmatched.iter().map(|m| m.ticker.clone()).collect(),
            stats: outcome.stats,
        }
    }
}

/// Fetch both venues concurrently and match the snapshots.
pub async fn fetch_and_match(
    matcher: &MarketMatcher,
    primary: &dyn MarketProvider,
    secondary: &dyn MarketProvider,
) -> Result<MatchReport> {
    let (primary_markets, secondary_markets) = tokio::try_join!(
        async {
            primary
                .fetch_markets()
                .await
                .with_context(|| format!("Failed to fetch {} markets", primary.venue().as_str()))
        },
        async {
            secondary
                .fetch_markets()
                .await
                .with_context(|| format!("Failed to fetch {} markets", secondary.venue().as_str()))
        },
    )?;

    info!(
        "Fetched {} {} markets and {} {} markets",
        primary_markets.len(),
        primary.venue().as_str(),
        secondary_markets.len(),
        secondary.venue().as_str()
    );

    let outcome = matcher.match_markets(&primary_markets, &secondary_markets);
    Ok(MatchReport::from_outcome(&outcome, primary.venue(), secondary.venue()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FailingProvider;

    #[async_trait]
    impl MarketProvider for FailingProvider {
        fn venue(&self) -> Venue {
            Venue::Polymarket
        }

        async fn fetch_markets(&self) -> Result<Vec<Market>> {
            Err(anyhow!("connection refused"))
        }

        async fn fetch_market(&self, _ticker: &str) -> Result<Option<Market>> {
            Ok(None)
        }

        async fn subscribe(&self, _ticker: &str) -> Result<mpsc::Receiver<Market>> {
            Err(anyhow!("not supported"))
        }
    }

    fn market(ticker: &str, title: &str) -> Market {
        Market::new(ticker, title).with_metadata("start_time", "2025-01-01T20:00:00Z")
    }

    #[tokio::test]
    async fn test_fetch_and_match() {
        let kalshi = SnapshotProvider::new(
            Venue::Kalshi,
            vec![
                market("KAL-1", "Will the Lakers beat the Celtics?"),
                market("KAL-2", "Heat vs Knicks"),
            ],
        );
        let poly = SnapshotProvider::new(
            Venue::Polymarket,
            vec![market("POLY-1", "Celtics to win vs Lakers").with_quotes(0.40, 0.42, 0.58, 0.60)],
        );
        let matcher = MarketMatcher::with_builtin_aliases().unwrap();

        let report = fetch_and_match(&matcher, &kalshi, &poly).await.unwrap();
        assert_eq!(report.primary_venue, Venue::Kalshi);
        assert_eq!(report.matches.len(), 1);
        let pair = &report.matches[0];
        assert_eq!(pair.primary_ticker, "KAL-1");
        assert_eq!(pair.secondary_ticker, "POLY-1");
        assert!(pair.inverted);
        assert_eq!(pair.secondary_aligned.yes_ask, Some(0.60));
        assert_eq!(report.unmatched, vec!["KAL-2".to_string()]);
        assert_eq!(report.stats.inverted, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let kalshi = SnapshotProvider::new(Venue::Kalshi, vec![market("KAL-1", "Lakers vs Celtics")]);
        let matcher = MarketMatcher::with_builtin_aliases().unwrap();

        let err = fetch_and_match(&matcher, &kalshi, &FailingProvider).await.unwrap_err();
        assert!(err.to_string().contains("polymarket"));
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let kalshi = SnapshotProvider::new(Venue::Kalshi, vec![market("KAL-1", "Lakers vs Celtics")]);
        let poly = SnapshotProvider::new(Venue::Polymarket, vec![market("POLY-1", "Lakers vs Celtics")]);
        let matcher = MarketMatcher::with_builtin_aliases().unwrap();

        let report = fetch_and_match(&matcher, &kalshi, &poly).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["primary_venue"], "kalshi");
        assert_eq!(json["matches"][0]["key"], "2025-01-01:boston celtics:los angeles lakers");
        let back: MatchReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
