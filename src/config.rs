//! Environment configuration with sane defaults.

use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MONITORING_DURATION_SECS: u64 = 300;
pub const DEFAULT_MAX_DATA_POINTS: usize = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub update_interval_ms: u64,
    pub monitoring_duration_secs: u64,
    pub max_data_points: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse from an arbitrary key lookup so tests don't touch process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            update_interval_ms: parse_or(
                &lookup,
                "UPDATE_INTERVAL_MS",
                DEFAULT_UPDATE_INTERVAL_MS,
            )
            .max(1),
            monitoring_duration_secs: parse_or(
                &lookup,
                "MONITORING_DURATION_SECONDS",
                DEFAULT_MONITORING_DURATION_SECS,
            ),
            max_data_points: parse_or(&lookup, "MAX_DATA_POINTS", DEFAULT_MAX_DATA_POINTS).max(1),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unparseable {key}={raw:?}, using default");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = cfg(&[]);
        assert_eq!(c.port, 3000);
        assert_eq!(c.update_interval_ms, 1000);
        assert_eq!(c.monitoring_duration_secs, 300);
        assert_eq!(c.max_data_points, 300);
    }

    #[test]
    fn overrides_apply() {
        let c = cfg(&[
            ("PORT", "8080"),
            ("UPDATE_INTERVAL_MS", "250"),
            ("MONITORING_DURATION_SECONDS", "60"),
            ("MAX_DATA_POINTS", "50"),
        ]);
        assert_eq!(c.port, 8080);
        assert_eq!(c.update_interval_ms, 250);
        assert_eq!(c.monitoring_duration_secs, 60);
        assert_eq!(c.max_data_points, 50);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let c = cfg(&[("PORT", "not-a-port"), ("MAX_DATA_POINTS", "-3")]);
        assert_eq!(c.port, 3000);
        assert_eq!(c.max_data_points, 300);
    }

    #[test]
    fn zero_interval_and_capacity_clamped() {
        let c = cfg(&[("UPDATE_INTERVAL_MS", "0"), ("MAX_DATA_POINTS", "0")]);
        assert_eq!(c.update_interval_ms, 1);
        assert_eq!(c.max_data_points, 1);
    }
}
