use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Unknown config key: '{0}'")]
    UnknownKey(String),
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}
fn default_currency() -> String {
    "€".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubSettings {
    pub organization: Option<String>,
    /// Access token, forwarded as-is. GITHUB_TOKEN or `gh auth token` are used when unset.
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL of a dashboard backend serving `/api/metrics` and `/api/users`
    pub dashboard_url: Option<String>,
    #[serde(default = "default_period_days")]
    pub period_days: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_period_days() -> u32 {
    30
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            organization: None,
            token: None,
            api_base: default_api_base(),
            dashboard_url: None,
            period_days: default_period_days(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Tunable assumptions of the ROI estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiConfig {
    /// Currency per workday per developer
    #[serde(default = "default_daily_rate")]
    pub average_daily_rate: f64,
    #[serde(default = "default_working_hours")]
    pub daily_working_hours: f64,
    #[serde(default = "default_working_days")]
    pub working_days_per_month: f64,
}

fn default_daily_rate() -> f64 {
    450.0
}
fn default_working_hours() -> f64 {
    8.0
}
fn default_working_days() -> f64 {
    20.0
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            average_daily_rate: default_daily_rate(),
            daily_working_hours: default_working_hours(),
            working_days_per_month: default_working_days(),
        }
    }
}

impl RoiConfig {
    /// Every field must be a finite, strictly positive number.
    pub fn validate(&self) -> Vec<String> {
        let fields = [
            ("average_daily_rate", self.average_daily_rate),
            ("daily_working_hours", self.daily_working_hours),
            ("working_days_per_month", self.working_days_per_month),
        ];
        fields
            .iter()
            .filter(|(_, value)| !is_positive(*value))
            .map(|(name, value)| format!("Invalid roi.{}: {} (must be > 0)", name, value))
            .collect()
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub github: GithubSettings,
    #[serde(default)]
    pub roi: RoiConfig,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("copilot-roi").join("config.toml")
    }

    /// Load config from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`AppConfig::load_from`], but a corrupt file yields defaults instead of an error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Serialize and write this config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<PathBuf, ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "config saved");
        Ok(path.to_path_buf())
    }

    /// Set a single value by dotted key (e.g. `roi.average_daily_rate`).
    /// Short aliases are accepted for the ROI fields.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "roi.average_daily_rate" | "daily-rate" => {
                self.roi.average_daily_rate = parse_positive(key, value)?
            }
            "roi.daily_working_hours" | "hours" => {
                self.roi.daily_working_hours = parse_positive(key, value)?
            }
            "roi.working_days_per_month" | "days-per-month" => {
                self.roi.working_days_per_month = parse_positive(key, value)?
            }
            "github.organization" | "org" => self.github.organization = non_empty(value),
            "github.token" | "token" => self.github.token = non_empty(value),
            "github.api_base" => self.github.api_base = value.trim_end_matches('/').to_string(),
            "github.dashboard_url" => {
                self.github.dashboard_url = non_empty(value.trim_end_matches('/'))
            }
            "github.period_days" => {
                self.github.period_days = parse_count(key, value)?.min(u32::MAX as u64) as u32;
            }
            "github.timeout_secs" => self.github.timeout_secs = parse_count(key, value)?,
            "settings.default_format" => self.settings.default_format = value.to_string(),
            "settings.color" => self.settings.color = value.to_string(),
            "settings.currency" => self.settings.currency = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if let Err(e) = crate::core::github::fetch::validate_endpoint(&self.github.api_base, "api_base") {
            issues.push(e.to_string());
        }
        if let Some(url) = &self.github.dashboard_url {
            if let Err(e) = crate::core::github::fetch::validate_endpoint(url, "dashboard_url") {
                issues.push(e.to_string());
            }
        }
        if self.github.period_days == 0 || self.github.period_days > 100 {
            issues.push(format!(
                "Invalid github.period_days: {} (must be between 1 and 100)",
                self.github.period_days
            ));
        }
        issues.extend(self.roi.validate());
        issues
    }
}

fn parse_positive(key: &str, value: &str) -> Result<f64, ConfigError> {
    let parsed: f64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("'{}' is not a number", value),
    })?;
    if !is_positive(parsed) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(parsed)
}

fn parse_count(key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("'{}' is not a positive integer", value),
        }),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Persistence for the ROI assumptions.
pub trait ConfigStore {
    fn save_roi(&mut self, roi: &RoiConfig) -> Result<(), ConfigError>;
}

/// The TOML config file. Saving the ROI section keeps every other section as it is on disk.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for ConfigFile {
    fn save_roi(&mut self, roi: &RoiConfig) -> Result<(), ConfigError> {
        let mut config = AppConfig::load_from(&self.path)?;
        config.roi = *roi;
        config.save_to(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_settings_are_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_roi_config_matches_dashboard_defaults() {
        let roi = RoiConfig::default();
        assert_eq!(roi.average_daily_rate, 450.0);
        assert_eq!(roi.daily_working_hours, 8.0);
        assert_eq!(roi.working_days_per_month, 20.0);
    }

    #[test]
    fn default_format_is_text() {
        let settings = Settings::default();
        assert_eq!(settings.default_format, "text");
        assert_eq!(settings.color, "auto");
    }

    #[test]
    fn validate_catches_invalid_format() {
        let mut config = AppConfig::default();
        config.settings.default_format = "xml".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("default_format")));
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_non_positive_roi_fields() {
        let mut config = AppConfig::default();
        config.roi.daily_working_hours = 0.0;
        config.roi.average_daily_rate = -1.0;
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.contains("daily_working_hours")));
        assert!(issues.iter().any(|i| i.contains("average_daily_rate")));
    }

    #[test]
    fn validate_does_not_cap_working_days() {
        let roi = RoiConfig {
            working_days_per_month: 45.0,
            ..Default::default()
        };
        assert!(roi.validate().is_empty());
    }

    #[test]
    fn validate_catches_plain_http_api_base() {
        let mut config = AppConfig::default();
        config.github.api_base = "http://api.github.com".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("HTTPS")));
    }

    #[test]
    fn validate_catches_period_out_of_range() {
        let mut config = AppConfig::default();
        config.github.period_days = 0;
        assert!(config.validate().iter().any(|i| i.contains("period_days")));
    }

    #[test]
    fn parse_roi_section() {
        let toml = r#"
[roi]
average_daily_rate = 600.0
daily_working_hours = 7.5
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.roi.average_daily_rate, 600.0);
        assert_eq!(config.roi.daily_working_hours, 7.5);
        assert_eq!(config.roi.working_days_per_month, 20.0);
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn set_value_accepts_aliases() {
        let mut config = AppConfig::default();
        config.set_value("daily-rate", "520").unwrap();
        config.set_value("roi.daily_working_hours", "7").unwrap();
        config.set_value("org", "acme").unwrap();
        assert_eq!(config.roi.average_daily_rate, 520.0);
        assert_eq!(config.roi.daily_working_hours, 7.0);
        assert_eq!(config.github.organization.as_deref(), Some("acme"));
    }

    #[test]
    fn set_value_rejects_zero_and_garbage() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.set_value("hours", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("hours", "eight"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("roi.bogus", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(config.roi, RoiConfig::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.github.organization = Some("acme".to_string());
        config.roi.working_days_per_month = 21.0;
        config.save_to(&path).unwrap();
        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[roi\naverage_daily_rate = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }

    #[test]
    fn config_file_store_preserves_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.github.organization = Some("acme".to_string());
        config.save_to(&path).unwrap();

        let mut store = ConfigFile::new(&path);
        let roi = RoiConfig {
            average_daily_rate: 700.0,
            ..Default::default()
        };
        store.save_roi(&roi).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.roi, roi);
        assert_eq!(loaded.github.organization.as_deref(), Some("acme"));
    }

    #[test]
    fn config_file_store_leaves_unparseable_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original = "[github]\norganization = \"acme\"\ntoken = \"secret\"\n[settings]\ncolor = 5\n";
        std::fs::write(&path, original).unwrap();

        let mut store = ConfigFile::new(&path);
        let result = store.save_roi(&RoiConfig {
            average_daily_rate: 500.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::ParseError(_))));

        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(after, original);
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, PathBuf::from("/tmp/test_xdg_config/copilot-roi/config.toml"));
    }
}
