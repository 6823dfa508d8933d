//! Configuration for the matcher

use anyhow::{anyhow, Context, Result};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::matching::team::AliasTable;

pub const DEFAULT_DATE_FIELDS: &[&str] = &[
    "expected_expiration_time",
    "start_time",
    "event_start_time",
    "game_start_time",
];
pub const DEFAULT_SLUG_FIELDS: &[&str] = &["slug", "event_slug"];
pub const DEFAULT_USE_DECLARED_SUBJECT: bool = true;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherConfig {
    /// JSON alias groups placed ahead of the built-in table
    pub alias_file: Option<PathBuf>,
    /// Metadata timestamp fields, tried in order
    pub date_fields: Vec<String>,
    /// Metadata fields that may end in a `YYYY-MM-DD` date
    pub slug_fields: Vec<String>,
    /// Trust a YES subject declared in metadata over the title
    pub use_declared_subject: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            alias_file: None,
            date_fields: to_owned_list(DEFAULT_DATE_FIELDS),
            slug_fields: to_owned_list(DEFAULT_SLUG_FIELDS),
            use_declared_subject: DEFAULT_USE_DECLARED_SUBJECT,
        }
    }
}

impl MatcherConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            alias_file: env::var("MATCHER_ALIAS_FILE")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),

            date_fields: env::var("MATCHER_DATE_FIELDS")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|fields| !fields.is_empty())
                .unwrap_or_else(|| to_owned_list(DEFAULT_DATE_FIELDS)),

            slug_fields: env::var("MATCHER_SLUG_FIELDS")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|fields| !fields.is_empty())
                .unwrap_or_else(|| to_owned_list(DEFAULT_SLUG_FIELDS)),

            use_declared_subject: parse_bool(
                "MATCHER_USE_DECLARED_SUBJECT",
                DEFAULT_USE_DECLARED_SUBJECT,
            )?,
        })
    }

    /// Built-in aliases, with the alias file's groups in front when one is set.
    pub fn alias_table(&self) -> Result<Arc<AliasTable>> {
        match &self.alias_file {
            None => Ok(AliasTable::builtin()),
            Some(path) => {
                let table = AliasTable::load_file(path)
                    .with_context(|| format!("Failed to load alias file {}", path.display()))?;
                Ok(Arc::new(table))
            }
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse environment variable as bool with default fallback
fn parse_bool(var_name: &str, default: bool) -> Result<bool> {
    match env::var(var_name) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("{} must be a boolean", var_name)),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatcherConfig::default();
        assert_eq!(config.alias_file, None);
        assert_eq!(config.date_fields[0], "expected_expiration_time");
        assert_eq!(config.date_fields.len(), 4);
        assert_eq!(config.slug_fields, vec!["slug".to_string(), "event_slug".to_string()]);
        assert!(config.use_declared_subject);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" start_time, ,game_time "),
            vec!["start_time".to_string(), "game_time".to_string()]
        );
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_parse_bool_with_default() {
        assert!(parse_bool("NON_EXISTENT_MATCHER_VAR_XYZ", true).unwrap());
        assert!(!parse_bool("NON_EXISTENT_MATCHER_VAR_XYZ", false).unwrap());
    }

    #[test]
    fn test_builtin_alias_table_without_file() {
        let table = MatcherConfig::default().alias_table().unwrap();
        assert_eq!(table.resolve("Lakers"), "los angeles lakers");
    }

    #[test]
    fn test_missing_alias_file_is_an_error() {
        let config = MatcherConfig {
            alias_file: Some(PathBuf::from("/nonexistent/matcher/aliases.json")),
            ..Default::default()
        };
        assert!(config.alias_table().is_err());
    }
}
