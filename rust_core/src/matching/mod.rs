//! Cross-venue market matching
//!
//! This module provides:
//! - Alias resolution of team names (`team`)
//! - Title parsing into two canonical teams (`title`)
//! - Event keys joining the two venues (`event_key`)
//! - YES/NO inversion detection (`inversion`)
//! - `MarketMatcher`, which indexes the secondary venue and looks up each primary market

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod event_key;
pub mod inversion;
pub mod team;
pub mod title;

use crate::config::MatcherConfig;
use crate::types::{Market, MarketMatch, MatchOutcome, MatchStats};
use event_key::{EventKey, EventKeyBuilder};
use inversion::InversionDetector;
use team::AliasTable;
use title::{ParsedTitle, TitleParser};

/// Indexed secondary market with the parse needed for the inversion check
struct IndexEntry<'a> {
    market: &'a Market,
    parsed: ParsedTitle,
}

/// Pairs markets from a primary and a secondary venue.
///
/// Immutable after construction; one instance can serve any number of
/// matching passes, concurrently if shared.
#[derive(Debug, Clone)]
pub struct MarketMatcher {
    keys: EventKeyBuilder,
    inversion: InversionDetector,
}

impl MarketMatcher {
    pub fn new(aliases: Arc<AliasTable>, config: &MatcherConfig) -> Result<Self, regex::Error> {
        let parser = TitleParser::new(aliases)?;
        Ok(Self {
            keys: EventKeyBuilder::new(parser.clone(), config)?,
            inversion: InversionDetector::new(parser, config.use_declared_subject),
        })
    }

    /// Matcher over the built-in alias table and default settings.
    pub fn with_builtin_aliases() -> Result<Self, regex::Error> {
        Self::new(AliasTable::builtin(), &MatcherConfig::default())
    }

    /// Matcher for a loaded configuration, including its alias file.
    pub fn from_config(config: &MatcherConfig) -> anyhow::Result<Self> {
        let aliases = config.alias_table()?;
        Ok(Self::new(aliases, config)?)
    }

    pub fn key_builder(&self) -> &EventKeyBuilder {
        &self.keys
    }

    pub fn build_key(&self, market: &Market) -> Option<EventKey> {
        self.keys.build_key(market)
    }

    pub fn is_inverted(&self, a: &Market, b: &Market) -> bool {
        self.inversion.is_inverted(a, b)
    }

    /// One matching pass.
    ///
    /// Every primary market ends up either in exactly one match or in
    /// `unmatched`. Secondary markets that key to an already-indexed event
    /// replace the earlier entry. Never fails; per-market problems are logged
    /// and counted.
    pub fn match_markets<'a>(&self, primary: &'a [Market], secondary: &'a [Market]) -> MatchOutcome<'a> {
        let mut stats = MatchStats {
            primary_total: primary.len(),
            secondary_total: secondary.len(),
            ..Default::default()
        };

        let index = self.build_index(secondary, &mut stats);

        let mut matches = Vec::new();
        let mut unmatched = Vec::new();

        for market in primary {
            let keyed = match self.keys.build(market) {
                Ok(keyed) => keyed,
                Err(e) => {
                    debug!("Skipping primary market {}: {}", market.ticker, e);
                    stats.primary_skipped += 1;
                    unmatched.push(market);
                    continue;
                }
            };

            let Some(entry) = index.get(&keyed.key) else {
                unmatched.push(market);
                continue;
            };

            let inverted =
                self.inversion
                    .is_inverted_parsed(market, &keyed.parsed, entry.market, &entry.parsed);
            if inverted {
                debug!(
                    "Inverted match {} <-> {} on {}",
                    market.ticker, entry.market.ticker, keyed.key
                );
                stats.inverted += 1;
            }

            matches.push(MarketMatch {
                primary: market,
                secondary: entry.market,
                key: keyed.key,
                inverted,
            });
        }

        stats.matched = matches.len();

        info!(
            "Matched {} of {} primary markets against {} indexed ({} inverted, {} unmatched, {} skipped)",
            stats.matched,
            stats.primary_total,
            stats.secondary_indexed,
            stats.inverted,
            unmatched.len(),
            stats.primary_skipped + stats.secondary_skipped
        );

        MatchOutcome {
            matches,
            unmatched,
            stats,
        }
    }

    fn build_index<'a>(
        &self,
        secondary: &'a [Market],
        stats: &mut MatchStats,
    ) -> FxHashMap<EventKey, IndexEntry<'a>> {
        let mut index: FxHashMap<EventKey, IndexEntry<'a>> = FxHashMap::default();
        index.reserve(secondary.len());

        for market in secondary {
            let keyed = match self.keys.build(market) {
                Ok(keyed) => keyed,
                Err(e) => {
                    debug!("Skipping secondary market {}: {}", market.ticker, e);
                    stats.secondary_skipped += 1;
                    continue;
                }
            };

            let entry = IndexEntry {
                market,
                parsed: keyed.parsed,
            };
            if let Some(previous) = index.insert(keyed.key.clone(), entry) {
                warn!(
                    "Duplicate event key {}: {} replaces {}",
                    keyed.key, market.ticker, previous.market.ticker
                );
                stats.secondary_duplicates += 1;
            }
        }

        stats.secondary_indexed = index.len();
        index
    }
}

// ============================================================================
// Tests
// ============================================================================
