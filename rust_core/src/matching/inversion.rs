//! Proposition inversion detection.
//!
//! Two markets on the same game are inverted when YES on one pays out on the
//! team that YES on the other pays out against. Each side's YES subject comes
//! from metadata when the venue declares it, otherwise from a directional
//! title ("X beat Y", "X to win vs Y"). A neutral "A vs B" title carries no
//! subject, and a pair with an unknown subject on either side is reported as
//! not inverted.

use serde_json::Value;

use super::team::CanonicalTeam;
use super::title::{ParsedTitle, TitleParser};
use crate::types::Market;

/// Outcome labels that name a side of the contract rather than a team.
const GENERIC_OUTCOMES: &[&str] = &["yes", "no"];

#[derive(Debug, Clone)]
pub struct InversionDetector {
    parser: TitleParser,
    use_declared_subject: bool,
}

impl InversionDetector {
    pub fn new(parser: TitleParser, use_declared_subject: bool) -> Self {
        Self {
            parser,
            use_declared_subject,
        }
    }

    /// Whether YES on `a` corresponds to NO on `b`.
    ///
    /// Titles that fail to parse give `false`; callers are expected to pass
    /// markets that already share an event key.
    pub fn is_inverted(&self, a: &Market, b: &Market) -> bool {
        match (self.parser.parse(&a.title), self.parser.parse(&b.title)) {
            (Ok(pa), Ok(pb)) => self.is_inverted_parsed(a, &pa, b, &pb),
            _ => false,
        }
    }

    pub fn is_inverted_parsed(
        &self,
        a: &Market,
        parsed_a: &ParsedTitle,
        b: &Market,
        parsed_b: &ParsedTitle,
    ) -> bool {
        match (self.subject(a, parsed_a), self.subject(b, parsed_b)) {
            (Some(sa), Some(sb)) => sa != sb,
            _ => false,
        }
    }

    /// Canonical team that YES on `market` backs, if it can be determined.
    pub fn subject(&self, market: &Market, parsed: &ParsedTitle) -> Option<CanonicalTeam> {
        if self.use_declared_subject {
            if let Some(team) = self.declared_subject(market, parsed) {
                return Some(team);
            }
        }
        parsed.subject().map(str::to_string)
    }

    /// Subject named in venue metadata, kept only if it is one of the two teams.
    fn declared_subject(&self, market: &Market, parsed: &ParsedTitle) -> Option<CanonicalTeam> {
        let raw = declared_subject_raw(market)?;
        let team = self.parser.aliases().resolve(&raw);
        (team == parsed.first || team == parsed.second).then_some(team)
    }
}

fn declared_subject_raw(market: &Market) -> Option<String> {
    if let Some(sub) = market.metadata_str("yes_sub_title") {
        if !is_generic(sub) {
            return Some(sub.to_string());
        }
    }

    if let Some(outcomes) = market.metadata.get("outcomes") {
        if let Some(first) = first_team_outcome(outcomes) {
            return Some(first);
        }
    }

    market
        .metadata
        .get("tokens")
        .and_then(Value::as_array)
        .and_then(|tokens| tokens.first())
        .and_then(|token| token.get("outcome"))
        .and_then(Value::as_str)
        .filter(|outcome| !is_generic(outcome))
        .map(str::to_string)
}

/// `outcomes` arrives either as an array or as a JSON-encoded array string.
fn first_team_outcome(outcomes: &Value) -> Option<String> {
    let list = match outcomes {
        Value::Array(items) => items.clone(),
        Value::String(encoded) => serde_json::from_str::<Vec<Value>>(encoded).ok()?,
        _ => return None,
    };
    list.iter()
        .filter_map(Value::as_str)
        .find(|outcome| !is_generic(outcome))
        .map(str::to_string)
}

fn is_generic(label: &str) -> bool {
    let label = label.trim();
    label.is_empty() || GENERIC_OUTCOMES.iter().any(|g| label.eq_ignore_ascii_case(g))
}

// ============================================================================
// Tests
// ============================================================================
