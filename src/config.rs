//! Runtime configuration from environment variables
//!
//! - `HEDGE_HOST`: Bind address (default: 0.0.0.0)
//! - `HEDGE_PORT`: Port number (default: 8080)
//! - `HEDGE_LIVENESS_INTERVAL_SECS`: Seconds between liveness checks (default: 1200)
//! - `HEDGE_DELAY_THRESHOLD_SECS`: Reading age that counts as delayed (default: 1200)
//! - `HEDGE_TIMEZONE`: IANA zone for alert start times (default: America/Vancouver)
//! - `HEDGE_ALERT_TOPIC`: Push topic for alerts (default: alerts)
//! - `HEDGE_READING_TOPIC`: Queue topic for readings (default: temperatures)
//! - `HEDGE_PUSH_URL`: Push endpoint; unset logs notifications instead
//! - `HEDGE_PUSH_TOKEN`: Bearer token for the push endpoint
//! - `HEDGE_PUSH_DRY_RUN`: Validate pushes without delivering (default: false)
//! - `HEDGE_SNAPSHOT_PATH`: Store snapshot file; unset disables persistence

use std::path::PathBuf;

use chrono_tz::Tz;

use crate::functions::RelaySettings;

/// Longest accepted delay threshold (one year)
const MAX_DELAY_THRESHOLD_SECS: i64 = 365 * 24 * 60 * 60;

/// Relay process configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub liveness_interval_secs: u64,
    pub push_url: Option<String>,
    pub push_token: Option<String>,
    pub snapshot_path: Option<PathBuf>,
    pub settings: RelaySettings,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            liveness_interval_secs: 20 * 60,
            push_url: None,
            push_token: None,
            snapshot_path: None,
            settings: RelaySettings::default(),
        }
    }
}

impl RelayConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timezone = match var("HEDGE_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name))?,
            None => defaults.settings.timezone,
        };

        let delay_threshold_secs = parse_or(&var, "HEDGE_DELAY_THRESHOLD_SECS", 20 * 60_i64)?;
        if !(1..=MAX_DELAY_THRESHOLD_SECS).contains(&delay_threshold_secs) {
            return Err(ConfigError::InvalidValue {
                key: "HEDGE_DELAY_THRESHOLD_SECS".to_string(),
                value: delay_threshold_secs.to_string(),
            });
        }
        let liveness_interval_secs =
            parse_or(&var, "HEDGE_LIVENESS_INTERVAL_SECS", defaults.liveness_interval_secs)?;
        if liveness_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HEDGE_LIVENESS_INTERVAL_SECS".to_string(),
                value: "0".to_string(),
            });
        }

        let dry_run = match var("HEDGE_PUSH_DRY_RUN") {
            Some(v) => v.eq_ignore_ascii_case("true") || v == "1",
            None => false,
        };

        Ok(Self {
            host: var("HEDGE_HOST").unwrap_or(defaults.host),
            port: parse_or(&var, "HEDGE_PORT", defaults.port)?,
            liveness_interval_secs,
            push_url: var("HEDGE_PUSH_URL"),
            push_token: var("HEDGE_PUSH_TOKEN"),
            snapshot_path: var("HEDGE_SNAPSHOT_PATH").map(PathBuf::from),
            settings: RelaySettings {
                alert_topic: var("HEDGE_ALERT_TOPIC").unwrap_or(defaults.settings.alert_topic),
                reading_topic: var("HEDGE_READING_TOPIC")
                    .unwrap_or(defaults.settings.reading_topic),
                timezone,
                delay_threshold: chrono::Duration::seconds(delay_threshold_secs),
                dry_run,
            },
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.liveness_interval_secs, 1200);
        assert_eq!(config.settings.alert_topic, "alerts");
        assert_eq!(config.settings.reading_topic, "temperatures");
        assert_eq!(config.settings.timezone, chrono_tz::America::Vancouver);
        assert_eq!(config.settings.delay_threshold, chrono::Duration::minutes(20));
        assert!(!config.settings.dry_run);
        assert!(config.push_url.is_none());
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("HEDGE_PORT", "9090"),
            ("HEDGE_TIMEZONE", "Europe/London"),
            ("HEDGE_DELAY_THRESHOLD_SECS", "300"),
            ("HEDGE_PUSH_DRY_RUN", "TRUE"),
            ("HEDGE_PUSH_URL", "https://push.example/send"),
            ("HEDGE_SNAPSHOT_PATH", "/var/lib/hedge/store.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.settings.timezone, chrono_tz::Europe::London);
        assert_eq!(config.settings.delay_threshold, chrono::Duration::minutes(5));
        assert!(config.settings.dry_run);
        assert_eq!(config.push_url.as_deref(), Some("https://push.example/send"));
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("/var/lib/hedge/store.json"))
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            RelayConfig::from_lookup(lookup(&[("HEDGE_PORT", "eighty")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RelayConfig::from_lookup(lookup(&[("HEDGE_TIMEZONE", "Mars/Olympus")])),
            Err(ConfigError::InvalidTimezone(_))
        ));
        assert!(matches!(
            RelayConfig::from_lookup(lookup(&[("HEDGE_LIVENESS_INTERVAL_SECS", "0")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_delay_threshold_bounds() {
        for value in ["0", "-60", "1000000000000000", "31536001"] {
            assert!(
                matches!(
                    RelayConfig::from_lookup(lookup(&[("HEDGE_DELAY_THRESHOLD_SECS", value)])),
                    Err(ConfigError::InvalidValue { .. })
                ),
                "accepted threshold {}",
                value
            );
        }

        let config =
            RelayConfig::from_lookup(lookup(&[("HEDGE_DELAY_THRESHOLD_SECS", "31536000")])).unwrap();
        assert_eq!(config.settings.delay_threshold, chrono::Duration::days(365));
    }
}
