//! Service configuration loaded from environment variables.
//!
//! The server binary reads these once at startup; command-line flags may
//! override the port and data directory afterwards.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Result};
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 5000;

/// Origins accepted during local development when nothing else is configured.
pub const DEV_ORIGINS: &[&str] = &[
    "http://localhost:5000",
    "http://localhost:5173",
    "http://localhost:3001",
    "http://localhost:3000",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Internal error details are only returned to callers outside production.
    pub fn exposes_internal_errors(&self) -> bool { matches!(self, Environment::Development) }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory of the JSON document store; `None` keeps confessions in memory.
    pub data_dir: Option<PathBuf>,
    pub environment: Environment,
    pub allowed_origins: Vec<String>,
    pub auth_secret: Option<String>,
    pub auth_issuer: Option<String>,
    /// Static `token -> subject` pairs, honoured in development only.
    pub dev_tokens: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: None,
            environment: Environment::Development,
            allowed_origins: DEV_ORIGINS.iter().map(|s| s.to_string()).collect(),
            auth_secret: None,
            auth_issuer: None,
            dev_tokens: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = try_load(var("PORT"), "PORT", DEFAULT_PORT)?;
        let environment = try_load(var("CONFESSIONS_ENV"), "CONFESSIONS_ENV", Environment::Development)?;
        let data_dir = var("CONFESSIONS_DATA_DIR").map(PathBuf::from);

        let mut allowed_origins: Vec<String> = var("CONFESSIONS_ALLOWED_ORIGINS")
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|| match environment {
                Environment::Development => DEV_ORIGINS.iter().map(|s| s.to_string()).collect(),
                Environment::Production => Vec::new(),
            });
        if let Some(frontend) = var("FRONTEND_URL") {
            if !allowed_origins.contains(&frontend) { allowed_origins.push(frontend); }
        }
        if allowed_origins.iter().any(|o| o == "*") {
            return Err(anyhow!("Wildcard origin '*' is not allowed; list explicit origins in CONFESSIONS_ALLOWED_ORIGINS"));
        }
        if environment == Environment::Production && allowed_origins.is_empty() {
            warn!(target: "startup", "No allowed origins configured for production; cross-origin browsers will be refused");
        }

        let dev_tokens = match var("CONFESSIONS_DEV_TOKENS") {
            Some(raw) => parse_token_pairs(&raw)?,
            None => Vec::new(),
        };
        if environment == Environment::Production && !dev_tokens.is_empty() {
            warn!(target: "startup", "CONFESSIONS_DEV_TOKENS ignored in production");
        }

        Ok(Self {
            port,
            data_dir,
            environment,
            allowed_origins,
            auth_secret: var("CONFESSIONS_AUTH_SECRET"),
            auth_issuer: var("CONFESSIONS_AUTH_ISSUER"),
            dev_tokens: if environment == Environment::Production { Vec::new() } else { dev_tokens },
        })
    }
}

fn try_load<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: Display,
{
    match raw {
        None => {
            info!(target: "startup", "{key} not set, using default");
            Ok(default)
        }
        Some(v) => v.parse().map_err(|e| anyhow!("Invalid {key} value '{v}': {e}")),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).map(|s| s.to_string()).collect()
}

fn parse_token_pairs(raw: &str) -> Result<Vec<(String, String)>> {
    split_list(raw)
        .into_iter()
        .map(|pair| match pair.split_once('=') {
            Some((token, subject)) if !token.trim().is_empty() && !subject.trim().is_empty() => {
                Ok((token.trim().to_string(), subject.trim().to_string()))
            }
            _ => Err(anyhow!("Invalid CONFESSIONS_DEV_TOKENS entry '{pair}', expected token=subject")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.environment, Environment::Development);
        assert!(cfg.data_dir.is_none());
        assert_eq!(cfg.allowed_origins.len(), DEV_ORIGINS.len());
        assert!(cfg.auth_secret.is_none());
    }

    #[test]
    fn production_uses_frontend_url_only() {
        let cfg = Config::from_lookup(lookup(&[
            ("CONFESSIONS_ENV", "production"),
            ("FRONTEND_URL", "https://confess.example.com"),
            ("CONFESSIONS_DEV_TOKENS", "t1=alice"),
        ]))
        .unwrap();
        assert_eq!(cfg.allowed_origins, vec!["https://confess.example.com".to_string()]);
        assert!(!cfg.environment.exposes_internal_errors());
        assert!(cfg.dev_tokens.is_empty());
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CONFESSIONS_ENV", "staging")])).is_err());
    }

    #[test]
    fn dev_tokens_parse() {
        let cfg = Config::from_lookup(lookup(&[("CONFESSIONS_DEV_TOKENS", "t1=alice, t2=bob")])).unwrap();
        assert_eq!(cfg.dev_tokens, vec![("t1".into(), "alice".into()), ("t2".into(), "bob".into())]);
        assert!(Config::from_lookup(lookup(&[("CONFESSIONS_DEV_TOKENS", "broken")])).is_err());
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        let err = Config::from_lookup(lookup(&[("CONFESSIONS_ALLOWED_ORIGINS", "http://a.example, *")])).unwrap_err();
        assert!(err.to_string().contains("Wildcard origin"));
        assert!(Config::from_lookup(lookup(&[("CONFESSIONS_ENV", "production"), ("FRONTEND_URL", "*")])).is_err());
    }
}
