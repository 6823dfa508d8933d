//! Event key construction.
//!
//! An event key is `date:teamLow:teamHigh`, the event date plus the two
//! canonical teams in lexicographic order. Two markets with the same key are
//! the same real-world game, whichever venue listed them and whichever team
//! their title put first.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use super::title::{ParsedTitle, TitleParser};
use crate::config::MatcherConfig;
use crate::error::KeyError;
use crate::league_config::slug_matches_league;
use crate::types::Market;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Integer timestamps above this are taken to be milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Deterministic join key for one real-world event
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKey(String);

impl EventKey {
    /// Team argument order does not affect the result.
    pub fn new(date: NaiveDate, team_a: &str, team_b: &str) -> Self {
        let (low, high) = if team_a <= team_b {
            (team_a, team_b)
        } else {
            (team_b, team_a)
        };
        Self(format!("{}:{}:{}", date.format(DATE_FORMAT), low, high))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYY-MM-DD` portion.
    pub fn date_str(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A market that produced a key, with the parse kept for inversion checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedMarket {
    pub key: EventKey,
    pub date: NaiveDate,
    pub parsed: ParsedTitle,
}

/// Builds event keys from market metadata and titles.
#[derive(Debug, Clone)]
pub struct EventKeyBuilder {
    parser: TitleParser,
    date_fields: Vec<String>,
    slug_fields: Vec<String>,
    slug_date: Regex,
}

impl EventKeyBuilder {
    pub fn new(parser: TitleParser, config: &MatcherConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            parser,
            date_fields: config.date_fields.clone(),
            slug_fields: config.slug_fields.clone(),
            slug_date: Regex::new(r"(\d{4}-\d{2}-\d{2})$")?,
        })
    }

    pub fn parser(&self) -> &TitleParser {
        &self.parser
    }

    /// Key for a market, or `None` when it has no usable date or title.
    pub fn build_key(&self, market: &Market) -> Option<EventKey> {
        self.build(market).ok().map(|k| k.key)
    }

    pub fn build(&self, market: &Market) -> Result<KeyedMarket, KeyError> {
        market.validate()?;
        let parsed = self.parser.parse(&market.title)?;
        let date = self
            .extract_date(market, parsed.league)
            .ok_or(KeyError::MissingDate)?;
        let key = EventKey::new(date, &parsed.first, &parsed.second);
        Ok(KeyedMarket { key, date, parsed })
    }

    /// Event date: structured timestamp fields first, then a trailing
    /// `YYYY-MM-DD` on a slug-like field. With a known `league`, only slugs
    /// carrying that league's prefix are trusted.
    pub fn extract_date(&self, market: &Market, league: Option<&str>) -> Option<NaiveDate> {
        for field in &self.date_fields {
            let Some(value) = market.metadata.get(field) else {
                continue;
            };
            match date_from_timestamp(value) {
                Some(date) => return Some(date),
                None => debug!(
                    "Market {}: unusable date in '{}': {}",
                    market.ticker, field, value
                ),
            }
        }

        for field in &self.slug_fields {
            let Some(slug) = market.metadata_str(field) else {
                continue;
            };
            if let Some(league) = league {
                if !slug_matches_league(slug, league) {
                    debug!("Market {}: {} '{}' is not a {} slug", market.ticker, field, slug, league);
                    continue;
                }
            }
            let date = self
                .slug_date
                .captures(slug)
                .and_then(|caps| caps.get(1))
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT).ok());
            match date {
                Some(date) => return Some(date),
                None => debug!("Market {}: no date at end of {} '{}'", market.ticker, field, slug),
            }
        }

        None
    }
}

/// Date portion of an ISO timestamp string, or the UTC date of a Unix timestamp.
fn date_from_timestamp(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let date_part = s.trim().split(['T', ' ']).next()?;
            NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            let secs = if raw.unsigned_abs() > MILLIS_THRESHOLD.unsigned_abs() {
                raw / 1000
            } else {
                raw
            };
            DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::team::AliasTable;
    use serde_json::json;

    fn builder() -> EventKeyBuilder {
        let parser = TitleParser::new(AliasTable::builtin()).unwrap();
        EventKeyBuilder::new(parser, &MatcherConfig::default()).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_key_is_order_independent() {
        let date = ymd(2025, 1, 1);
        let a = EventKey::new(date, "los angeles lakers", "boston celtics");
        let b = EventKey::new(date, "boston celtics", "los angeles lakers");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "2025-01-01:boston celtics:los angeles lakers");
        assert_eq!(a.date_str(), "2025-01-01");
    }

    #[test]
    fn test_date_from_kalshi_expiration() {
        let market = Market::new("KXNBAGAME-25JAN01LALBOS", "Lakers vs Celtics")
            .with_metadata("expected_expiration_time", "2025-01-01T23:00:00Z");
        assert_eq!(builder().extract_date(&market, None), Some(ymd(2025, 1, 1)));
    }

    #[test]
    fn test_date_only_string() {
        let market = Market::new("KAL-1", "Lakers vs Celtics").with_metadata("start_time", "2025-03-09");
        assert_eq!(builder().extract_date(&market, None), Some(ymd(2025, 3, 9)));
    }

    #[test]
    fn test_unix_timestamps() {
        // 2025-01-01T20:00:00Z
        let secs = Market::new("KAL-1", "Lakers vs Celtics").with_metadata("start_time", json!(1_735_761_600));
        let millis =
            Market::new("KAL-2", "Lakers vs Celtics").with_metadata("start_time", json!(1_735_761_600_000i64));
        assert_eq!(builder().extract_date(&secs, None), Some(ymd(2025, 1, 1)));
        assert_eq!(builder().extract_date(&millis, None), Some(ymd(2025, 1, 1)));
    }

    #[test]
    fn test_out_of_range_timestamps_are_not_dates() {
        for raw in [i64::MIN, i64::MAX, -i64::MAX] {
            let market = Market::new("KAL-1", "Lakers vs Celtics").with_metadata("start_time", json!(raw));
            assert_eq!(builder().extract_date(&market, None), None);
            assert_eq!(builder().build(&market), Err(KeyError::MissingDate));
        }
    }

    #[test]
    fn test_out_of_range_timestamp_falls_back_to_slug() {
        let market = Market::new("POLY-1", "Lakers vs Celtics")
            .with_metadata("start_time", json!(i64::MIN))
            .with_metadata("slug", "nba-lal-bos-2025-01-01");
        assert_eq!(builder().extract_date(&market, None), Some(ymd(2025, 1, 1)));
    }

    #[test]
    fn test_slug_from_other_league_ignored() {
        let market = Market::new("POLY-1", "NBA: Heat vs Jets").with_metadata("slug", "nfl-mia-nyj-2025-01-05");
        assert_eq!(builder().extract_date(&market, Some("nba")), None);
        assert_eq!(builder().extract_date(&market, None), Some(ymd(2025, 1, 5)));
        assert_eq!(builder().build(&market), Err(KeyError::MissingDate));
    }

    #[test]
    fn test_slug_from_title_league_used() {
        let market = Market::new("POLY-1", "NBA: Celtics @ Lakers").with_metadata("slug", "nba-bos-lal-2025-01-05");
        let keyed = builder().build(&market).unwrap();
        assert_eq!(keyed.parsed.league, Some("nba"));
        assert_eq!(keyed.date, ymd(2025, 1, 5));
    }

    #[test]
    fn test_invalid_timestamp_falls_back_to_slug() {
        let market = Market::new("POLY-1", "Colorado State vs Saint Mary's")
            .with_metadata("expected_expiration_time", "not-a-date")
            .with_metadata("slug", "cwbb-colst-stmry-2025-11-08");
        assert_eq!(builder().extract_date(&market, None), Some(ymd(2025, 11, 8)));
    }

    #[test]
    fn test_slug_date_must_be_trailing_and_valid() {
        let mid = Market::new("POLY-1", "A vs B").with_metadata("slug", "nba-2025-01-01-lal-bos");
        let bad = Market::new("POLY-2", "A vs B").with_metadata("slug", "nba-lal-bos-2025-13-40");
        assert_eq!(builder().extract_date(&mid, None), None);
        assert_eq!(builder().extract_date(&bad, None), None);
    }

    #[test]
    fn test_missing_metadata() {
        let market = Market::new("KAL-1", "Lakers vs Celtics");
        assert_eq!(builder().extract_date(&market, None), None);
        assert_eq!(builder().build(&market), Err(KeyError::MissingDate));
        assert_eq!(builder().build_key(&market), None);
    }

    #[test]
    fn test_non_string_slug_ignored() {
        let market = Market::new("POLY-1", "Lakers vs Celtics").with_metadata("slug", json!(["2025-01-01"]));
        assert_eq!(builder().extract_date(&market, None), None);
    }

    #[test]
    fn test_build_key_from_title_and_date() {
        let market = Market::new("KAL-1", "Will the Lakers beat the Celtics?")
            .with_metadata("start_time", "2025-01-01T20:00:00Z");
        let keyed = builder().build(&market).unwrap();
        assert_eq!(keyed.key.as_str(), "2025-01-01:boston celtics:los angeles lakers");
        assert_eq!(keyed.parsed.first, "los angeles lakers");
        assert_eq!(keyed.date, ymd(2025, 1, 1));
    }

    #[test]
    fn test_build_rejects_bad_title_and_empty_fields() {
        let no_sep = Market::new("KAL-1", "Lakers win the title")
            .with_metadata("start_time", "2025-01-01T20:00:00Z");
        assert!(matches!(builder().build(&no_sep), Err(KeyError::Title(_))));

        let empty = Market::new("", "Lakers vs Celtics").with_metadata("start_time", "2025-01-01");
        assert!(matches!(builder().build(&empty), Err(KeyError::InvalidMarket(_))));
    }
}
