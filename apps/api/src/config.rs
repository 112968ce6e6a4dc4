use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which advisory tagger backs the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggerKind {
    /// Regex heuristics only.
    None,
    /// Built-in surname / organization-suffix lexicon, optionally extended from a file.
    Lexicon,
}

impl FromStr for TaggerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "" => Ok(TaggerKind::None),
            "lexicon" => Ok(TaggerKind::Lexicon),
            other => bail!("unknown tagger '{other}' (expected 'lexicon' or 'none')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub tagger: TaggerKind,
    /// JSON file with extra `persons` / `organizations` for the lexicon tagger.
    pub tagger_lexicon: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// Default for the per-request `debug` flag.
    pub parse_debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            tagger: TaggerKind::Lexicon,
            tagger_lexicon: None,
            max_upload_bytes: 10 * 1024 * 1024,
            parse_debug: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        let defaults = Config::default();

        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            tagger: env_or("TAGGER", defaults.tagger)?,
            tagger_lexicon: std::env::var_os("TAGGER_LEXICON")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            parse_debug: env_or("PARSE_DEBUG", defaults.parse_debug)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagger_kind_parses_case_insensitively() {
        assert_eq!("Lexicon".parse::<TaggerKind>().unwrap(), TaggerKind::Lexicon);
        assert_eq!(" none ".parse::<TaggerKind>().unwrap(), TaggerKind::None);
        assert!("spacy".parse::<TaggerKind>().is_err());
    }

    #[test]
    fn test_invalid_value_names_the_variable() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
        assert!(parse_value::<bool>("PARSE_DEBUG", "true").unwrap());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.tagger, TaggerKind::Lexicon);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!config.parse_debug);
    }
}
