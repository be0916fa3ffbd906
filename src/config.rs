//! Runtime configuration read from the environment (and `.env` via `dotenv`).

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ATTACHMENTS_DIR: &str = "attachments";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Expected {0} in the environment.")]
    Missing(&'static str),
    #[error("{key} must be {expected}, got `{value}`.")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// The only guild the bot answers in and registers commands on.
    pub guild_id: u64,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Where submitted screenshots are written.
    pub attachments_dir: PathBuf,
    /// Users allowed to delete runs.
    pub admin_user_ids: Vec<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let guild_raw = required("SERVER_ID")?;
        let guild_id = guild_raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ConfigError::Invalid {
                key: "SERVER_ID",
                expected: "a valid number",
                value: guild_raw.clone(),
            })?;

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    key: "DATABASE_MAX_CONNECTIONS",
                    expected: "a positive number",
                    value: raw,
                })?,
            _ => DEFAULT_MAX_CONNECTIONS,
        };

        let admin_user_ids = match lookup("ADMIN_USER_IDS") {
            Some(raw) => parse_id_list(&raw).ok_or(ConfigError::Invalid {
                key: "ADMIN_USER_IDS",
                expected: "a comma separated list of user ids",
                value: raw,
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            guild_id,
            database_url: required("DATABASE_URL")?,
            database_max_connections,
            attachments_dir: lookup("ATTACHMENTS_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ATTACHMENTS_DIR)),
            admin_user_ids,
        })
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_user_ids.contains(&user_id)
    }
}

fn parse_id_list(raw: &str) -> Option<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().ok())
        .collect()
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

    const BASE: [(&str, &str); 3] = [
        ("DISCORD_TOKEN", "token"),
        ("SERVER_ID", "1234"),
        ("DATABASE_URL", "postgres://localhost/raidtimes"),
    ];

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config = Config::from_lookup(lookup_from(&BASE)).unwrap();
        assert_eq!(config.guild_id, 1234);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.attachments_dir, PathBuf::from("attachments"));
        assert!(config.admin_user_ids.is_empty());
        assert!(!config.is_admin(1));
    }

    #[test]
    fn admin_ids_are_parsed() {
        let mut pairs = BASE.to_vec();
        pairs.push(("ADMIN_USER_IDS", "11, 22,"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.admin_user_ids, vec![11, 22]);
        assert!(config.is_admin(22));
    }

    #[test]
    fn missing_and_malformed_values_are_reported() {
        let err = Config::from_lookup(lookup_from(&BASE[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let mut pairs = BASE.to_vec();
        pairs[1] = ("SERVER_ID", "not-a-number");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_ID", .. }));
    }
}
