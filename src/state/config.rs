//! Application configuration with persistence.
//!
//! # Configuration File Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/dcrlens/config.json`
//! - macOS: `~/Library/Application Support/dcrlens/config.json`
//! - Windows: `%APPDATA%/dcrlens/config.json`
//!
//! Command-line flags override individual fields for one run without being
//! saved.
//!
//! # Example
//!
//! ```ignore
//! use dcrlens::state::AppConfig;
//!
//! let mut config = AppConfig::load();
//! config.cache_ttl_secs = 120;
//! config.save()?;
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use serde::{Deserialize, Serialize};

use crate::cache::{Clock, StalePolicy};
use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_TTL_SECS, DEFAULT_POLITEIA_URL, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_TABLE_ROWS,
};
use crate::controller::FinanceOptions;
use crate::pagination::ReportRange;

// ============================================================================
// Constants
// ============================================================================

/// Application name used for configuration directory.
const APP_NAME: &str = "dcrlens";

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

// ============================================================================
// AppConfig
// ============================================================================

/// Application configuration, stored as JSON in the user's configuration
/// directory. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// dcrdata explorer to query.
    pub base_url: String,
    /// Proposal discussion site.
    pub politeia_url: String,
    /// Cache lifetime of reports without a server-chosen expiry.
    pub cache_ttl_secs: u64,
    /// Rows kept in the live block table.
    pub table_rows: usize,
    /// Seconds between best-block polls.
    pub poll_interval_secs: u64,
    /// What to do with out-of-sequence report responses.
    pub stale_policy: StalePolicy,
    /// Months month/year navigation may visit; through the current month
    /// when unset.
    pub report_range: Option<ReportRange>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            politeia_url: DEFAULT_POLITEIA_URL.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            table_rows: DEFAULT_TABLE_ROWS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            stale_policy: StalePolicy::default(),
            report_range: None,
        }
    }
}

impl AppConfig {
    /// Returns the path to the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined
    /// or created.
    pub fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "Could not determine config directory. Expected XDG_CONFIG_HOME or ~/.config on Linux, ~/Library/Application Support on macOS, %APPDATA% on Windows"
            )
        })?;
        path.push(APP_NAME);
        fs::create_dir_all(&path)?;
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Loads the configuration from disk, falling back to defaults when the
    /// file is missing or unreadable.
    #[must_use]
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!("Config load failed, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Attempts to load the configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration path cannot be determined
    /// - The file cannot be read
    /// - The JSON content cannot be parsed
    pub fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        let content = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined or the file cannot
    /// be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Report cache lifetime.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Best-block poll interval, at least one second.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Finance controller options on the given clock.
    #[must_use]
    pub fn finance_options(&self, clock: Arc<dyn Clock>) -> FinanceOptions {
        FinanceOptions {
            cache_ttl: self.cache_ttl(),
            stale_policy: self.stale_policy,
            range: self
                .report_range
                .unwrap_or_else(|| ReportRange::through(clock.now())),
            politeia_url: self.politeia_url.clone(),
            clock,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use chrono::{TimeZone, Utc};
    use rstest::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "https://dcrdata.decred.org");
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.stale_policy, StalePolicy::Discard);
        assert!(config.report_range.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:7777","stale_policy":"keep"}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://localhost:7777");
        assert_eq!(config.stale_policy, StalePolicy::Keep);
        assert_eq!(config.table_rows, DEFAULT_TABLE_ROWS);
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = AppConfig {
            report_range: Some(ReportRange::new(2019, 1, 2023, 12)),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[rstest]
    #[case::zero(0, 1)]
    #[case::configured(30, 30)]
    fn test_poll_interval_floor(#[case] secs: u64, #[case] expected: u64) {
        let config = AppConfig {
            poll_interval_secs: secs,
            ..AppConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(expected));
    }

    #[test]
    fn test_finance_options_default_range_ends_now() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2023, 8, 3, 0, 0, 0).unwrap(),
        ));
        let options = AppConfig::default().finance_options(clock);
        assert_eq!(options.range, ReportRange::new(2016, 2, 2023, 8));
        assert_eq!(options.politeia_url, DEFAULT_POLITEIA_URL);
    }

    #[test]
    fn test_config_path_has_json_extension() {
        if let Ok(path) = AppConfig::config_path() {
            let extension = path.extension().and_then(|e| e.to_str());
            assert_eq!(extension, Some("json"));
        }
    }
}
