use std::time::Duration;

use serde::Deserialize;

use crate::services::SessionOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub user_name: String,
    pub persist_timeout_ms: u64,
    pub reload_on_cancel: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset keys take their defaults;
    /// malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let reload_on_cancel = match lookup("BOARD_RELOAD_ON_CANCEL") {
            Some(value) => parse_flag(&value)?,
            None => true,
        };
        let persist_timeout_ms = match lookup("BOARD_PERSIST_TIMEOUT_MS") {
            Some(value) => parse_timeout_ms(&value)?,
            None => 10_000,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:todo-board.db".into()),
            user_name: lookup("BOARD_USER").unwrap_or_else(|| "local".into()),
            persist_timeout_ms,
            reload_on_cancel,
        })
    }

    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            persist_timeout: self.persist_timeout(),
            reload_on_cancel: self.reload_on_cancel,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:todo-board.db".into(),
            user_name: "local".into(),
            persist_timeout_ms: 10_000,
            reload_on_cancel: true,
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, anyhow::Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("BOARD_RELOAD_ON_CANCEL must be true or false, got '{}'", other),
    }
}

fn parse_timeout_ms(value: &str) -> Result<u64, anyhow::Error> {
    match value.trim().parse::<u64>() {
        Ok(0) => anyhow::bail!("BOARD_PERSIST_TIMEOUT_MS must be greater than zero"),
        Ok(ms) => Ok(ms),
        Err(e) => anyhow::bail!("BOARD_PERSIST_TIMEOUT_MS must be a number of milliseconds, got '{}': {}", value, e),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn parses_flags() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag(" YES ").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn parses_timeouts() {
        assert_eq!(parse_timeout_ms(" 250 ").unwrap(), 250);
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("ten").is_err());
        assert!(parse_timeout_ms("-5").is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn lookup_reads_every_key() {
        let env = vars(&[
            ("DATABASE_URL", "sqlite:/tmp/work.db"),
            ("BOARD_USER", "dana"),
            ("BOARD_PERSIST_TIMEOUT_MS", "2500"),
            ("BOARD_RELOAD_ON_CANCEL", "no"),
        ]);
        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.database_url, "sqlite:/tmp/work.db");
        assert_eq!(config.user_name, "dana");
        assert_eq!(config.persist_timeout(), Duration::from_millis(2500));
        assert!(!config.reload_on_cancel);
    }

    #[test]
    fn malformed_values_fail_instead_of_falling_back() {
        let env = vars(&[
            ("DATABASE_URL", "sqlite:/tmp/work.db"),
            ("BOARD_RELOAD_ON_CANCEL", "maybe"),
        ]);
        assert!(Config::from_lookup(|key| env.get(key).cloned()).is_err());

        let env = vars(&[("BOARD_PERSIST_TIMEOUT_MS", "0")]);
        assert!(Config::from_lookup(|key| env.get(key).cloned()).is_err());

        let env = vars(&[("BOARD_PERSIST_TIMEOUT_MS", "soon")]);
        assert!(Config::from_lookup(|key| env.get(key).cloned()).is_err());
    }

    #[test]
    fn unset_keys_take_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.database_url, Config::default().database_url);
        assert_eq!(config.user_name, "local");
        assert_eq!(config.persist_timeout_ms, 10_000);
        assert!(config.reload_on_cancel);
    }

    #[test]
    fn default_session_options() {
        let options = Config::default().session_options();
        assert_eq!(options.persist_timeout, Duration::from_secs(10));
        assert!(options.reload_on_cancel);
    }
}
