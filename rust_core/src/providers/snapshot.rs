//! In-memory market provider backed by a snapshot.
//!
//! Serves recorded venue data (a JSON array of markets) through the same
//! `MarketProvider` seam a live connector would use. `replace` swaps the
//! snapshot and pushes each subscribed market's new record to its subscribers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::MarketProvider;
use crate::types::{Market, Venue};

const SUBSCRIPTION_BUFFER: usize = 64;

pub struct SnapshotProvider {
    venue: Venue,
    markets: RwLock<Vec<Market>>,
    subscribers: Mutex<Vec<(String, mpsc::Sender<Market>)>>,
}

impl SnapshotProvider {
    pub fn new(venue: Venue, markets: Vec<Market>) -> Self {
        Self {
            venue,
            markets: RwLock::new(markets),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Load a JSON array of markets. Records without a venue tag get `venue`.
    pub async fn from_file(venue: Venue, path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let mut markets: Vec<Market> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        for market in markets.iter_mut().filter(|m| m.venue == Venue::Other) {
            market.venue = venue;
        }

        info!(
            "Loaded {} {} markets from {}",
            markets.len(),
            venue.as_str(),
            path.display()
        );
        Ok(Self::new(venue, markets))
    }

    pub fn len(&self) -> usize {
        self.markets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.read().is_empty()
    }

    /// Swap in a new snapshot, then notify subscribers of their markets.
    pub fn replace(&self, markets: Vec<Market>) {
        let mut guard = self.markets.write();
        *guard = markets;
        let snapshot = RwLockWriteGuard::downgrade(guard);

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|(_, tx)| !tx.is_closed());

        for (ticker, tx) in subscribers.iter() {
            if let Some(market) = snapshot.iter().find(|m| &m.ticker == ticker) {
                if tx.try_send(market.clone()).is_err() {
                    debug!("Subscriber for {} is full, dropping update", ticker);
                }
            }
        }
    }
}

#[async_trait]
impl MarketProvider for SnapshotProvider {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn fetch_markets(&self) -> Result<Vec<Market>> {
        Ok(self.markets.read().clone())
    }

    async fn fetch_market(&self, ticker: &str) -> Result<Option<Market>> {
        Ok(self.markets.read().iter().find(|m| m.ticker == ticker).cloned())
    }

    /// The current record, if any, is delivered first.
    async fn subscribe(&self, ticker: &str) -> Result<mpsc::Receiver<Market>> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

        let current = self.markets.read().iter().find(|m| m.ticker == ticker).cloned();
        if let Some(market) = current {
            tx.try_send(market).context("Failed to deliver current market")?;
        }

        self.subscribers.lock().push((ticker.to_string(), tx));
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("{}_{}_{}.json", name, std::process::id(), nanos))
    }

    #[tokio::test]
    async fn test_fetch_market() {
        let provider = SnapshotProvider::new(
            Venue::Kalshi,
            vec![Market::new("KAL-1", "Lakers vs Celtics"), Market::new("KAL-2", "Heat vs Knicks")],
        );
        assert_eq!(provider.len(), 2);
        assert_eq!(provider.fetch_markets().await.unwrap().len(), 2);
        assert_eq!(
            provider.fetch_market("KAL-2").await.unwrap().map(|m| m.title),
            Some("Heat vs Knicks".to_string())
        );
        assert!(provider.fetch_market("KAL-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subscribe_receives_current_and_replacement() {
        let provider = SnapshotProvider::new(
            Venue::Polymarket,
            vec![Market::new("POLY-1", "Lakers vs Celtics").with_quotes(0.40, 0.42, 0.58, 0.60)],
        );
        let mut rx = provider.subscribe("POLY-1").await.unwrap();
        assert_eq!(rx.recv().await.unwrap().yes_ask, Some(0.42));

        provider.replace(vec![
            Market::new("POLY-1", "Lakers vs Celtics").with_quotes(0.45, 0.47, 0.53, 0.55),
            Market::new("POLY-2", "Heat vs Knicks"),
        ]);
        assert_eq!(rx.recv().await.unwrap().yes_ask, Some(0.47));
        assert_eq!(provider.len(), 2);
    }

    #[tokio::test]
    async fn test_update_visible_before_notification() {
        let provider = Arc::new(SnapshotProvider::new(
            Venue::Polymarket,
            vec![Market::new("POLY-1", "Lakers vs Celtics").with_quotes(0.40, 0.42, 0.58, 0.60)],
        ));
        let mut rx = provider.subscribe("POLY-1").await.unwrap();
        rx.recv().await.unwrap();

        let writer = Arc::clone(&provider);
        let handle = tokio::task::spawn_blocking(move || {
            for i in 1..=50u32 {
                let ask = 0.42 + f64::from(i) / 1000.0;
                writer.replace(vec![
                    Market::new("POLY-1", "Lakers vs Celtics").with_quotes(0.40, ask, 0.58, 0.60),
                ]);
            }
        });

        for _ in 0..50 {
            let update = rx.recv().await.unwrap();
            let current = provider.fetch_market("POLY-1").await.unwrap().unwrap();
            assert!(current.yes_ask.unwrap() >= update.yes_ask.unwrap());
        }
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_subscribers_are_dropped() {
        let provider = SnapshotProvider::new(Venue::Kalshi, vec![]);
        let rx = provider.subscribe("KAL-1").await.unwrap();
        drop(rx);
        provider.replace(vec![Market::new("KAL-1", "Lakers vs Celtics")]);
        assert!(provider.subscribers.lock().is_empty());
    }

    #[tokio::test]
    async fn test_from_file_tags_venue() {
        let path = temp_path("snapshot_provider");
        std::fs::write(
            &path,
            r#"[
                {"ticker": "POLY-1", "title": "Lakers vs Celtics", "metadata": {"slug": "nba-lal-bos-2025-01-01"}},
                {"ticker": "KAL-1", "title": "Lakers vs Celtics", "venue": "kalshi"}
            ]"#,
        )
        .unwrap();

        let provider = SnapshotProvider::from_file(Venue::Polymarket, &path).await.unwrap();
        let markets = provider.fetch_markets().await.unwrap();
        assert_eq!(markets[0].venue, Venue::Polymarket);
        assert_eq!(markets[1].venue, Venue::Kalshi);
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_from_file_errors() {
        assert!(SnapshotProvider::from_file(Venue::Kalshi, Path::new("/nonexistent/snapshot.json"))
            .await
            .is_err());

        let path = temp_path("snapshot_provider_bad");
        std::fs::write(&path, "{not json").unwrap();
        assert!(SnapshotProvider::from_file(Venue::Kalshi, &path).await.is_err());
        std::fs::remove_file(&path).ok();
    }
}
