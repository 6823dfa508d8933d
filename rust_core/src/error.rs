//! Error types for the matching engine.
//!
//! None of these ever escape `MarketMatcher::match_markets`; they describe why a
//! single market could not be keyed and are surfaced through logs and the
//! unmatched list.

use thiserror::Error;

/// Reason a market title could not be split into two canonical teams.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no separator found")]
    NoSeparator,

    #[error("unexpected team count")]
    UnexpectedTeamCount(usize),

    #[error("team normalization failed")]
    TeamNormalizationFailed,
}

/// Market record that violates the non-empty ticker/title invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error("market has an empty ticker")]
    EmptyTicker,

    #[error("market {ticker} has an empty title")]
    EmptyTitle { ticker: String },
}

/// Why a market could not be turned into an event key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error(transparent)]
    InvalidMarket(#[from] MarketError),

    #[error("no event date in metadata")]
    MissingDate,

    #[error("unparseable title: {0}")]
    Title(#[from] ParseFailure),
}
