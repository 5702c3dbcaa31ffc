use std::env;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:rusty_rally.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Runtime settings, read from the environment (and a `.env` file if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub store_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Unparsable numbers fall back to the defaults rather than aborting startup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);
        let store_timeout = lookup("STORE_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.store_timeout);

        Self {
            database_url,
            max_connections,
            store_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "1"),
            ("STORE_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.store_timeout, Duration::from_secs(3));
    }

    #[test]
    fn garbage_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_MAX_CONNECTIONS", "zero"),
            ("STORE_TIMEOUT_SECS", "-4"),
        ]));
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            config.store_timeout,
            Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS)
        );
    }
}
