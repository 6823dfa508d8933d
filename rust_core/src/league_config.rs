//! League configuration for supported sports.
//!
//! This module provides:
//! - Static configuration for the leagues whose markets get matched
//! - The league prefixes venues put in front of market titles ("NBA: ...")
//! - The slug prefix a league's markets carry ("nba-lal-bos-2025-01-05")

/// Configuration for a single league.
#[derive(Debug, Clone)]
pub struct LeagueConfig {
    /// League code (e.g., "nfl", "ncaab")
    pub league_code: &'static str,
    /// Title prefixes that name this league, without the trailing colon
    pub title_prefixes: &'static [&'static str],
    /// Polymarket slug prefix for this league
    pub poly_prefix: &'static str,
}

/// Static configuration for all supported leagues.
pub static LEAGUE_CONFIGS: &[LeagueConfig] = &[
    LeagueConfig {
        league_code: "nfl",
        title_prefixes: &["nfl"],
        poly_prefix: "nfl",
    },
    LeagueConfig {
        league_code: "ncaaf",
        title_prefixes: &["ncaaf"],
        poly_prefix: "cfb",
    },
    LeagueConfig {
        league_code: "nba",
        title_prefixes: &["nba"],
        poly_prefix: "nba",
    },
    // Bare "NCAA:" titles are almost always basketball
    LeagueConfig {
        league_code: "ncaab",
        title_prefixes: &["ncaab", "ncaa"],
        poly_prefix: "cbb",
    },
    LeagueConfig {
        league_code: "nhl",
        title_prefixes: &["nhl"],
        poly_prefix: "nhl",
    },
    LeagueConfig {
        league_code: "mlb",
        title_prefixes: &["mlb"],
        poly_prefix: "mlb",
    },
];

/// Get league configuration by code.
pub fn get_league_config(league: &str) -> Option<&'static LeagueConfig> {
    LEAGUE_CONFIGS
        .iter()
        .find(|c| c.league_code.eq_ignore_ascii_case(league))
}

/// League that owns a title prefix ("ncaa" -> ncaab).
pub fn league_for_title_prefix(prefix: &str) -> Option<&'static LeagueConfig> {
    LEAGUE_CONFIGS
        .iter()
        .find(|c| c.title_prefixes.iter().any(|p| p.eq_ignore_ascii_case(prefix)))
}

/// Whether a slug belongs to the league ("nba-lal-bos-..." for nba).
/// Unknown league codes accept any slug.
pub fn slug_matches_league(slug: &str, league: &str) -> bool {
    match get_league_config(league) {
        Some(config) => slug
            .to_ascii_lowercase()
            .strip_prefix(config.poly_prefix)
            .is_some_and(|rest| rest.starts_with('-')),
        None => true,
    }
}

/// Every title prefix across all leagues, longest first so that a regex
/// alternation built from them never stops at a shorter prefix.
pub fn title_prefixes() -> Vec<&'static str> {
    let mut prefixes: Vec<&'static str> = LEAGUE_CONFIGS
        .iter()
        .flat_map(|c| c.title_prefixes.iter().copied())
        .collect();
    prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    prefixes
}

// ============================================================================
// Tests
// ============================================================================
