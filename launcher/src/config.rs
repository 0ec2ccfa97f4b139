use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const MIN_GRACE_SECS: u64 = 1;
pub const MAX_GRACE_SECS: u64 = 120;
pub const DEFAULT_GRACE_SECS: u64 = 10;

pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const MAX_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

pub const MIN_ESCALATION_SECS: u64 = 1;
pub const MAX_ESCALATION_SECS: u64 = 60;
pub const DEFAULT_ESCALATION_SECS: u64 = 5;

/// Optional tuning knobs, read from `config.toml` in the tool's profile
/// directory. Absent file or absent fields mean the defaults below; every
/// value is clamped to a sane range so a typo cannot produce a watch that
/// gives up instantly or spins.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Seconds the game gets to show up after the launch trigger. Clamped to [1, 120].
    #[serde(default = "default_grace")]
    pub grace_secs: u64,
    /// Milliseconds between process-table snapshots. Clamped to [10, 1000].
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Seconds a cooperative cancellation may take before the exit is forced.
    /// Clamped to [1, 60].
    #[serde(default = "default_escalation")]
    pub cancel_escalation_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grace_secs: DEFAULT_GRACE_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            cancel_escalation_secs: DEFAULT_ESCALATION_SECS,
        }
    }
}

impl Config {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs.clamp(MIN_GRACE_SECS, MAX_GRACE_SECS))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS),
        )
    }

    pub fn cancel_escalation(&self) -> Duration {
        Duration::from_secs(
            self.cancel_escalation_secs
                .clamp(MIN_ESCALATION_SECS, MAX_ESCALATION_SECS),
        )
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file
/// does not exist. Returns an error if the file exists but cannot be read or
/// parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_grace() -> u64 {
    DEFAULT_GRACE_SECS
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_escalation() -> u64 {
    DEFAULT_ESCALATION_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn default_values_match_constants() {
        let c = Config::default();
        assert_eq!(c.grace_secs, DEFAULT_GRACE_SECS);
        assert_eq!(c.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(c.cancel_escalation_secs, DEFAULT_ESCALATION_SECS);
    }

    #[test]
    fn default_durations() {
        let c = Config::default();
        assert_eq!(c.grace(), Duration::from_secs(10));
        assert_eq!(c.poll_interval(), Duration::from_millis(50));
        assert_eq!(c.cancel_escalation(), Duration::from_secs(5));
    }

    // ── clamping ──────────────────────────────────────────────────────────────

    #[test]
    fn grace_clamps_both_ends() {
        let mut c = Config::default();
        c.grace_secs = 0;
        assert_eq!(c.grace(), Duration::from_secs(MIN_GRACE_SECS));
        c.grace_secs = 10_000;
        assert_eq!(c.grace(), Duration::from_secs(MAX_GRACE_SECS));
    }

    #[test]
    fn poll_interval_clamps_both_ends() {
        let mut c = Config::default();
        c.poll_interval_ms = 1;
        assert_eq!(
            c.poll_interval(),
            Duration::from_millis(MIN_POLL_INTERVAL_MS)
        );
        c.poll_interval_ms = 60_000;
        assert_eq!(
            c.poll_interval(),
            Duration::from_millis(MAX_POLL_INTERVAL_MS)
        );
    }

    #[test]
    fn escalation_clamps_both_ends() {
        let mut c = Config::default();
        c.cancel_escalation_secs = 0;
        assert_eq!(c.cancel_escalation(), Duration::from_secs(MIN_ESCALATION_SECS));
        c.cancel_escalation_secs = 999;
        assert_eq!(c.cancel_escalation(), Duration::from_secs(MAX_ESCALATION_SECS));
    }

    // ── load_or_default ───────────────────────────────────────────────────────

    #[test]
    fn load_or_default_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config.grace_secs, DEFAULT_GRACE_SECS);
    }

    #[test]
    fn load_or_default_parses_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "grace_secs = 30\npoll_interval_ms = 100\n").unwrap();

        let config = load_or_default(&path).unwrap();
        assert_eq!(config.grace_secs, 30);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.cancel_escalation_secs, DEFAULT_ESCALATION_SECS);
    }

    #[test]
    fn load_or_default_partial_toml_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = 200\n").unwrap();

        let config = load_or_default(&path).unwrap();
        assert_eq!(config.grace_secs, DEFAULT_GRACE_SECS);
        assert_eq!(config.poll_interval_ms, 200);
    }

    #[test]
    fn load_or_default_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not valid toml ][[[").unwrap();
        assert!(load_or_default(&path).is_err());
    }
}
