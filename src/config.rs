// src/config.rs
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_DOMAINS: &[&str] = &["techcrunch.com", "thenextweb.com"];
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";
const ENV_CHANNEL_ID: &str = "DISCORD_CHANNEL_ID";
const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
const ENV_INTERVAL: &str = "RELAY_INTERVAL_SECS";
const ENV_QUEUE_CAPACITY: &str = "RELAY_QUEUE_CAPACITY";
const ENV_DOMAINS: &str = "NEWS_DOMAINS";
const ENV_DOMAINS_PATH: &str = "NEWS_DOMAINS_PATH";

/// Startup configuration problems. All fatal: the process exits instead of
/// running with a partial setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
    #[error("reading domains from {path}: {reason}")]
    DomainsFile { path: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub channel_id: u64,
    pub news_api_key: String,
    pub interval_secs: u64,
    pub queue_capacity: usize,
    pub domains: Vec<String>,
}

impl Config {
    /// Read configuration from the environment, loaded once at startup.
    /// Credentials are required; the rest fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord_token = require(ENV_DISCORD_TOKEN)?;
        let channel_id: u64 = require(ENV_CHANNEL_ID)?
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidVar {
                var: ENV_CHANNEL_ID,
                reason: e.to_string(),
            })?;
        let news_api_key = require(ENV_NEWS_API_KEY)?;

        let interval_secs = parse_var(ENV_INTERVAL, DEFAULT_INTERVAL_SECS)?;
        if interval_secs == 0 {
            return Err(ConfigError::InvalidVar {
                var: ENV_INTERVAL,
                reason: "must be at least 1".into(),
            });
        }
        let queue_capacity = parse_var(ENV_QUEUE_CAPACITY, DEFAULT_QUEUE_CAPACITY)?;
        if queue_capacity == 0 {
            return Err(ConfigError::InvalidVar {
                var: ENV_QUEUE_CAPACITY,
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            discord_token,
            channel_id,
            news_api_key,
            interval_secs,
            queue_capacity,
            domains: load_domains()?,
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn parse_var<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidVar {
                var,
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

/// Domain allow-list resolution order:
/// 1) $NEWS_DOMAINS (comma-separated)
/// 2) $NEWS_DOMAINS_PATH (TOML `domains = [...]` or JSON array)
/// 3) built-in defaults
fn load_domains() -> Result<Vec<String>, ConfigError> {
    if let Ok(raw) = std::env::var(ENV_DOMAINS) {
        let list = clean_list(raw.split(',').map(str::to_string).collect());
        if list.is_empty() {
            return Err(ConfigError::InvalidVar {
                var: ENV_DOMAINS,
                reason: "no domains listed".into(),
            });
        }
        return Ok(list);
    }
    if let Ok(path) = std::env::var(ENV_DOMAINS_PATH) {
        return load_domains_from(Path::new(&path));
    }
    Ok(DEFAULT_DOMAINS.iter().map(|s| s.to_string()).collect())
}

/// Load the domain allow-list from an explicit path. Supports TOML or JSON.
pub fn load_domains_from(path: &Path) -> Result<Vec<String>, ConfigError> {
    let file_err = |reason: String| ConfigError::DomainsFile {
        path: path.display().to_string(),
        reason,
    };
    let content = fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let list =
        parse_domains(&content, &ext).ok_or_else(|| file_err("unsupported domains format".into()))?;
    if list.is_empty() {
        return Err(file_err("no domains listed".into()));
    }
    Ok(list)
}

fn parse_domains(s: &str, hint_ext: &str) -> Option<Vec<String>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("domains");
    if try_toml {
        if let Some(v) = parse_toml(s) {
            return Some(v);
        }
    }
    // Try JSON array
    if let Some(v) = parse_json(s) {
        return Some(v);
    }
    // Fallback: also try TOML if not attempted
    if !try_toml {
        if let Some(v) = parse_toml(s) {
            return Some(v);
        }
    }
    None
}

fn parse_toml(s: &str) -> Option<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TomlDomains {
        domains: Vec<String>,
    }
    toml::from_str::<TomlDomains>(s)
        .ok()
        .map(|v| clean_list(v.domains))
}

fn parse_json(s: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(s).ok().map(clean_list)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() {
            set.insert(t.to_string());
        }
    }
    set.into_iter().collect()
}
