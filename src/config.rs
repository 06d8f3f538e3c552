use log::warn;
use std::env;
use std::str::FromStr;

use crate::blockchain::DEFAULT_DIFFICULTY;

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            difficulty: parse_or("DIFFICULTY", lookup("DIFFICULTY"), defaults.difficulty),
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("{key}={v:?} is not valid, falling back to {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_values() {
        let cfg = Config::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "5000"),
            ("DIFFICULTY", "2"),
        ]));
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.difficulty, 2);
    }

    #[test]
    fn garbage_falls_back() {
        let cfg = Config::from_lookup(lookup(&[("PORT", "eighty"), ("DIFFICULTY", "-1")]));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.difficulty, Config::default().difficulty);
    }
}
