//! Team alias resolution.
//!
//! This module provides:
//! - The built-in alias table (abbreviations, nicknames, full names)
//! - `AliasTable`: an immutable, ordered alias lookup shared via `Arc`
//! - JSON persistence for operator-supplied alias groups
//!
//! Lookup order is exact match first, then a substring scan in table order.
//! Table order is the tie-break: when an alias is declared by more than one
//! team, the first declaration wins, and the first alias that overlaps the
//! input wins the substring scan.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Normalized lowercase team name, articles removed, aliases resolved.
pub type CanonicalTeam = String;

const ARTICLES: &[&str] = &["the", "a", "an"];

/// Built-in groups: canonical name -> aliases (abbreviations, nicknames, full names).
/// Declaration order matters; see module docs.
static BUILTIN_GROUPS: &[(&str, &[&str])] = &[
    // NBA
    ("los angeles lakers", &["lal", "lakers", "la lakers", "los angeles lakers"]),
    ("los angeles clippers", &["lac", "clippers", "la clippers", "los angeles clippers"]),
    ("golden state warriors", &["gsw", "warriors", "golden state warriors"]),
    ("boston celtics", &["bos", "celtics", "boston celtics"]),
    ("miami heat", &["mia", "heat", "miami heat"]),
    ("dallas mavericks", &["dal", "mavericks", "mavs", "dallas mavericks"]),
    ("phoenix suns", &["phx", "suns", "phoenix suns"]),
    ("denver nuggets", &["den", "nuggets", "denver nuggets"]),
    ("milwaukee bucks", &["mil", "bucks", "milwaukee bucks"]),
    ("philadelphia 76ers", &["phi", "76ers", "sixers", "philadelphia 76ers"]),
    ("new york knicks", &["nyk", "knicks", "ny knicks", "new york knicks"]),
    ("brooklyn nets", &["bkn", "nets", "brooklyn nets"]),
    ("chicago bulls", &["bulls", "chicago bulls"]),
    ("cleveland cavaliers", &["cavaliers", "cavs", "cleveland cavaliers"]),
    ("atlanta hawks", &["atl", "hawks", "atlanta hawks"]),
    ("charlotte hornets", &["cha", "hornets", "charlotte hornets"]),
    ("detroit pistons", &["pistons", "detroit pistons"]),
    ("indiana pacers", &["pacers", "indiana pacers"]),
    ("orlando magic", &["orl", "magic", "orlando magic"]),
    ("toronto raptors", &["raptors", "toronto raptors"]),
    ("washington wizards", &["wizards", "washington wizards"]),
    ("houston rockets", &["rockets", "houston rockets"]),
    ("memphis grizzlies", &["mem", "grizzlies", "memphis grizzlies"]),
    ("new orleans pelicans", &["nop", "pelicans", "pels", "new orleans pelicans"]),
    ("san antonio spurs", &["sas", "spurs", "san antonio spurs"]),
    ("minnesota timberwolves", &["timberwolves", "wolves", "minnesota timberwolves"]),
    ("oklahoma city thunder", &["okc", "thunder", "oklahoma city thunder"]),
    ("portland trail blazers", &["por", "trail blazers", "blazers", "portland trail blazers"]),
    ("sacramento kings", &["sac", "kings", "sacramento kings"]),
    ("utah jazz", &["uta", "jazz", "utah jazz"]),
    // NFL
    ("buffalo bills", &["buf", "bills", "buffalo bills"]),
    ("miami dolphins", &["mia", "dolphins", "miami dolphins"]),
    ("new england patriots", &["nep", "patriots", "pats", "new england patriots"]),
    ("new york jets", &["nyj", "jets", "ny jets", "new york jets"]),
    ("baltimore ravens", &["bal", "ravens", "baltimore ravens"]),
    ("cincinnati bengals", &["cin", "bengals", "cincinnati bengals"]),
    ("cleveland browns", &["cle", "browns", "cleveland browns"]),
    ("pittsburgh steelers", &["pit", "steelers", "pittsburgh steelers"]),
    ("kansas city chiefs", &["chiefs", "kansas city chiefs"]),
    ("san francisco 49ers", &["sfo", "49ers", "niners", "san francisco 49ers"]),
    ("dallas cowboys", &["cowboys", "dallas cowboys"]),
    ("philadelphia eagles", &["eagles", "philadelphia eagles"]),
    ("new york giants", &["nyg", "giants", "ny giants", "new york giants"]),
    ("green bay packers", &["packers", "green bay packers"]),
    ("detroit lions", &["lions", "detroit lions"]),
    ("chicago bears", &["bears", "chicago bears"]),
    ("minnesota vikings", &["vikings", "minnesota vikings"]),
    ("seattle seahawks", &["seahawks", "seattle seahawks"]),
    ("los angeles rams", &["lar", "rams", "la rams", "los angeles rams"]),
    ("los angeles chargers", &["chargers", "la chargers", "los angeles chargers"]),
    ("las vegas raiders", &["raiders", "las vegas raiders"]),
    ("denver broncos", &["broncos", "denver broncos"]),
    ("houston texans", &["texans", "houston texans"]),
    ("tennessee titans", &["titans", "tennessee titans"]),
    ("indianapolis colts", &["colts", "indianapolis colts"]),
    ("jacksonville jaguars", &["jax", "jaguars", "jags", "jacksonville jaguars"]),
    ("tampa bay buccaneers", &["buccaneers", "bucs", "tampa bay buccaneers"]),
    ("new orleans saints", &["saints", "new orleans saints"]),
    ("atlanta falcons", &["falcons", "atlanta falcons"]),
    ("carolina panthers", &["panthers", "carolina panthers"]),
    ("arizona cardinals", &["cardinals", "arizona cardinals"]),
    ("washington commanders", &["commanders", "washington commanders"]),
    // MLB
    ("new york yankees", &["nyy", "yankees", "yanks", "new york yankees"]),
    ("boston red sox", &["bos", "red sox", "boston red sox"]),
    ("los angeles dodgers", &["lad", "dodgers", "los angeles dodgers"]),
    ("chicago cubs", &["chc", "cubs", "chicago cubs"]),
    ("new york mets", &["nym", "mets", "new york mets"]),
    ("houston astros", &["astros", "houston astros"]),
    ("atlanta braves", &["braves", "atlanta braves"]),
    ("philadelphia phillies", &["phillies", "philadelphia phillies"]),
    ("san diego padres", &["padres", "san diego padres"]),
    ("chicago white sox", &["chw", "white sox", "chicago white sox"]),
    ("toronto blue jays", &["blue jays", "toronto blue jays"]),
    ("seattle mariners", &["mariners", "seattle mariners"]),
    // NHL
    ("toronto maple leafs", &["tor", "maple leafs", "leafs", "toronto maple leafs"]),
    ("montreal canadiens", &["mtl", "canadiens", "habs", "montreal canadiens"]),
    ("boston bruins", &["bos", "bruins", "boston bruins"]),
    ("edmonton oilers", &["edm", "oilers", "edmonton oilers"]),
    ("new york rangers", &["nyr", "rangers", "new york rangers"]),
    ("vegas golden knights", &["vgk", "golden knights", "vegas golden knights"]),
    ("colorado avalanche", &["avalanche", "colorado avalanche"]),
    ("tampa bay lightning", &["tbl", "lightning", "tampa bay lightning"]),
    // College
    ("duke blue devils", &["duke", "blue devils", "duke blue devils"]),
    ("north carolina tar heels", &["unc", "north carolina", "tar heels", "north carolina tar heels"]),
    ("kentucky wildcats", &["kentucky", "wildcats", "kentucky wildcats"]),
    ("kansas jayhawks", &["jayhawks", "kansas jayhawks"]),
    ("gonzaga bulldogs", &["gonzaga", "zags", "gonzaga bulldogs"]),
    ("connecticut huskies", &["uconn", "connecticut huskies"]),
    ("villanova wildcats", &["villanova", "nova", "villanova wildcats"]),
];

/// One canonical team and the names that resolve to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasGroup {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl AliasGroup {
    pub fn new(canonical: &str, aliases: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Immutable alias lookup.
///
/// Construct once at startup and share as `Arc<AliasTable>`.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    groups: Vec<AliasGroup>,
    /// (alias, canonical) in precedence order
    entries: Vec<(String, CanonicalTeam)>,
    /// alias -> index into `entries`
    exact: FxHashMap<String, usize>,
}

/// Built-in table, built on first access.
static BUILTIN_TABLE: OnceLock<Arc<AliasTable>> = OnceLock::new();

impl AliasTable {
    /// Table with no aliases; every name resolves to its cleaned form.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared handle to the built-in table.
    pub fn builtin() -> Arc<AliasTable> {
        BUILTIN_TABLE
            .get_or_init(|| Arc::new(Self::from_groups(builtin_groups())))
            .clone()
    }

    /// Build a table from ordered groups. Earlier declarations win.
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = AliasGroup>,
    {
        let mut table = Self::default();

        for group in groups {
            let canonical = clean_name(&group.canonical);
            if canonical.is_empty() {
                debug!("Skipping alias group with empty canonical name");
                continue;
            }

            let mut kept = Vec::with_capacity(group.aliases.len() + 1);
            let names = group
                .aliases
                .iter()
                .map(|a| clean_name(a))
                .chain(std::iter::once(canonical.clone()));

            for alias in names {
                if alias.is_empty() {
                    continue;
                }
                if let Some(&idx) = table.exact.get(&alias) {
                    if table.entries[idx].1 != canonical {
                        debug!(
                            "Alias '{}' already maps to '{}', ignoring '{}'",
                            alias, table.entries[idx].1, canonical
                        );
                    }
                    continue;
                }
                table.exact.insert(alias.clone(), table.entries.len());
                table.entries.push((alias.clone(), canonical.clone()));
                kept.push(alias);
            }

            table.groups.push(AliasGroup {
                canonical,
                aliases: kept,
            });
        }

        table
    }

    /// Operator-supplied groups ahead of the built-in ones.
    pub fn with_overrides(overrides: Vec<AliasGroup>) -> Self {
        Self::from_groups(overrides.into_iter().chain(builtin_groups()))
    }

    /// Load override groups from a JSON file and merge them with the built-in table.
    ///
    /// Format: `[{"canonical": "...", "aliases": ["...", ...]}, ...]`
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read alias file {}", path.display()))?;
        let overrides: Vec<AliasGroup> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse alias file {}", path.display()))?;
        debug!("Loaded {} alias groups from {}", overrides.len(), path.display());
        Ok(Self::with_overrides(overrides))
    }

    /// Save the table's groups in the format `load_file` reads.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.groups)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write alias file {}", path.display()))
    }

    /// Resolve a raw team name to its canonical form.
    ///
    /// Never fails: names absent from the table come back cleaned but
    /// otherwise unchanged, so two venues spelling an unknown team the same
    /// way still agree.
    pub fn resolve(&self, raw: &str) -> CanonicalTeam {
        let cleaned = clean_name(raw);
        if cleaned.is_empty() {
            return cleaned;
        }

        if let Some(&idx) = self.exact.get(&cleaned) {
            return self.entries[idx].1.clone();
        }

        // Substring scan in table order; first overlap wins
        for (alias, canonical) in &self.entries {
            if cleaned.contains(alias.as_str()) || alias.contains(cleaned.as_str()) {
                debug!("Fuzzy alias '{}' -> '{}' via '{}'", cleaned, canonical, alias);
                return canonical.clone();
            }
        }

        debug!("Team '{}' not in alias table, using cleaned name", cleaned);
        cleaned
    }

    pub fn groups(&self) -> &[AliasGroup] {
        &self.groups
    }

    /// Number of distinct aliases (canonical names included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn builtin_groups() -> impl Iterator<Item = AliasGroup> {
    BUILTIN_GROUPS
        .iter()
        .map(|(canonical, aliases)| AliasGroup::new(canonical, aliases))
}

/// Lowercase, trim, collapse whitespace and drop one leading article.
fn clean_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut words: Vec<&str> = lowered.split_whitespace().collect();
    if words.len() > 1 && ARTICLES.contains(&words[0]) {
        words.remove(0);
    }
    words.join(" ")
}

// ============================================================================
// Tests
// ============================================================================
