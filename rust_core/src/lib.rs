//! Venue Match Core - cross-venue matching of binary sports markets.
//!
//! This module provides:
//! - Team alias resolution against an immutable, shared alias table
//! - Title parsing of head-to-head market titles into canonical teams
//! - Event keys (`date:teamLow:teamHigh`) that join markets across venues
//! - YES/NO inversion detection between matched markets
//! - A single-pass matcher producing matched pairs and the primary remainder
//! - A provider seam for venue connectors, with an in-memory snapshot provider

pub mod config;
pub mod error;
pub mod league_config;
pub mod logging;
pub mod matching;
pub mod providers;
mod types;

pub use config::MatcherConfig;
pub use error::{KeyError, MarketError, ParseFailure};
pub use matching::event_key::{EventKey, EventKeyBuilder};
pub use matching::inversion::InversionDetector;
pub use matching::team::{AliasGroup, AliasTable, CanonicalTeam};
pub use matching::title::{ParsedTitle, Separator, TitleParser};
pub use matching::MarketMatcher;
pub use providers::{fetch_and_match, MarketProvider, MatchReport, MatchedPair, SnapshotProvider};
pub use types::*;
