//! Market title parsing.
//!
//! Turns a free-text head-to-head title ("Will the Lakers beat the Celtics?",
//! "NBA: Celtics @ Lakers - Jan 5") into two canonical team names. Parsing is
//! an ordered pipeline of small string -> string steps over one owned buffer;
//! the separator step swaps the separator phrase for `DELIMITER` and the
//! split step cuts on it.

use regex::Regex;
use std::sync::Arc;

use super::team::{AliasTable, CanonicalTeam};
use crate::error::ParseFailure;
use crate::league_config::{league_for_title_prefix, title_prefixes};

/// Internal team delimiter; never appears in a team name.
const DELIMITER: char = '\u{1F}';
const DELIMITER_STR: &str = "\u{1F}";

const MONTHS: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

/// Which phrase joined the two teams in the title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// vs, vs., versus, v, v.
    Versus,
    /// "away @ home"
    At,
    /// beat, defeat, win against
    Beat,
}

/// Two teams extracted from a title, in title order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub first: CanonicalTeam,
    pub second: CanonicalTeam,
    pub separator: Separator,
    /// A "to win"/"wins" phrase followed the first team
    pub win_phrase: bool,
    /// League code named by a "NBA:"-style prefix
    pub league: Option<&'static str>,
}

impl ParsedTitle {
    /// The title states which team YES backs ("X beat Y", "X to win vs Y").
    pub fn is_directional(&self) -> bool {
        self.separator == Separator::Beat || self.win_phrase
    }

    /// Team that YES pays out on, when the title says so.
    pub fn subject(&self) -> Option<&str> {
        self.is_directional().then_some(self.first.as_str())
    }
}

/// Compiled parsing pipeline.
#[derive(Debug, Clone)]
pub struct TitleParser {
    aliases: Arc<AliasTable>,
    interrogative: Regex,
    league_prefix: Regex,
    filler: Regex,
    trailing_date: Regex,
    separator: Regex,
    at_separator: Regex,
    fallback_separators: Vec<Regex>,
    trailing_dash: Regex,
    win_phrase: Regex,
}

impl TitleParser {
    pub fn new(aliases: Arc<AliasTable>) -> Result<Self, regex::Error> {
        let league_prefix = format!(r"^({}):\s*", title_prefixes().join("|"));

        Ok(Self {
            aliases,
            interrogative: Regex::new(r"^(?:will\s+the\s+|will\s+|does\s+|can\s+)")?,
            league_prefix: Regex::new(&league_prefix)?,
            filler: Regex::new(r"\s+(?:game|match)\s+")?,
            trailing_date: Regex::new(&format!(
                r"\s*[–-]\s*(?:{})[a-z]*\s+\d{{1,2}}(?:st|nd|rd|th)?.*$",
                MONTHS
            ))?,
            separator: Regex::new(r"\s+(beat|defeat|win\s+against|vs\.?|versus|v\.?)\s+")?,
            at_separator: Regex::new(r"\s+@\s+")?,
            fallback_separators: vec![
                Regex::new(r"\s+vs\.?\s+")?,
                Regex::new(r"\s+versus\s+")?,
                Regex::new(r"\s+v\.?\s+")?,
                Regex::new(r"\s+@\s+")?,
            ],
            trailing_dash: Regex::new(r"\s*[–-]\s*")?,
            win_phrase: Regex::new(r"\s+(?:to\s+win|to|wins?)$")?,
        })
    }

    pub fn aliases(&self) -> &Arc<AliasTable> {
        &self.aliases
    }

    /// Extract the two canonical teams, in title order.
    pub fn parse_teams(&self, title: &str) -> Result<(CanonicalTeam, CanonicalTeam), ParseFailure> {
        self.parse(title).map(|p| (p.first, p.second))
    }

    pub fn parse(&self, title: &str) -> Result<ParsedTitle, ParseFailure> {
        let mut text = title.to_lowercase();

        text = replace_first(&self.interrogative, text, "");
        let league = self
            .league_prefix
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| league_for_title_prefix(m.as_str()))
            .map(|c| c.league_code);
        text = replace_first(&self.league_prefix, text, "");
        text = replace_all(&self.filler, text, " ");
        text = replace_first(&self.trailing_date, text, "");

        let (replaced, separator) = self.mark_separators(text);
        text = replaced;
        text.retain(|c| !matches!(c, '?' | '!' | '.'));

        let separator = match separator {
            Some(kind) => kind,
            None => {
                let (replaced, kind) = self.mark_fallback_separator(text);
                text = replaced;
                kind.ok_or(ParseFailure::NoSeparator)?
            }
        };

        let parts: Vec<&str> = text.split(DELIMITER).map(str::trim).collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(ParseFailure::UnexpectedTeamCount(parts.len()));
        }

        let second_raw = self
            .trailing_dash
            .split(parts[1])
            .next()
            .unwrap_or_default()
            .trim();
        let (first_raw, first_win) = self.strip_win_phrase(parts[0]);
        let (second_raw, _) = self.strip_win_phrase(second_raw);

        let first = self.aliases.resolve(first_raw);
        let second = self.aliases.resolve(second_raw);
        if first.is_empty() || second.is_empty() {
            return Err(ParseFailure::TeamNormalizationFailed);
        }

        Ok(ParsedTitle {
            first,
            second,
            separator,
            win_phrase: first_win,
            league,
        })
    }

    /// Swap every separator phrase for the delimiter, reporting the first one seen.
    fn mark_separators(&self, text: String) -> (String, Option<Separator>) {
        let first_word = self.separator.captures(&text).and_then(|caps| {
            let start = caps.get(0)?.start();
            Some((start, classify(caps.get(1)?.as_str())))
        });
        let first_at = self.at_separator.find(&text).map(|m| (m.start(), Separator::At));

        let kind = match (first_word, first_at) {
            (Some(w), Some(a)) => Some(if w.0 <= a.0 { w.1 } else { a.1 }),
            (w, a) => w.or(a).map(|(_, kind)| kind),
        };

        let text = replace_all(&self.separator, text, DELIMITER_STR);
        let text = replace_all(&self.at_separator, text, DELIMITER_STR);
        (text, kind)
    }

    /// Retry on the punctuation-stripped text; the first pattern that matches is used.
    fn mark_fallback_separator(&self, text: String) -> (String, Option<Separator>) {
        for (idx, pattern) in self.fallback_separators.iter().enumerate() {
            if pattern.is_match(&text) {
                let kind = if idx == 3 { Separator::At } else { Separator::Versus };
                return (replace_all(pattern, text, DELIMITER_STR), Some(kind));
            }
        }
        (text, None)
    }

    fn strip_win_phrase<'t>(&self, part: &'t str) -> (&'t str, bool) {
        match self.win_phrase.find(part) {
            Some(m) => (part[..m.start()].trim_end(), true),
            None => (part, false),
        }
    }
}

fn classify(phrase: &str) -> Separator {
    match phrase.split_whitespace().next().unwrap_or_default() {
        "beat" | "defeat" | "win" => Separator::Beat,
        _ => Separator::Versus,
    }
}

fn replace_first(pattern: &Regex, text: String, with: &str) -> String {
    pattern.replace(&text, with).into_owned()
}

fn replace_all(pattern: &Regex, text: String, with: &str) -> String {
    pattern.replace_all(&text, with).into_owned()
}

// ============================================================================
// Tests
// ============================================================================
