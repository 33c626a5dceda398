use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::metrics_cmd::load_state;
use crate::cli::output::{print_json, OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::{AppConfig, ConfigError, ConfigFile, ConfigStore, RoiConfig};
use crate::core::loader::LoaderOptions;
use crate::core::models::report::RoiReport;
use crate::core::state::DashboardState;

/// Per-run overrides of the ROI assumptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoiOverrides {
    pub daily_rate: Option<f64>,
    pub hours: Option<f64>,
    pub days_per_month: Option<f64>,
}

impl RoiOverrides {
    pub fn apply(&self, base: RoiConfig) -> RoiConfig {
        RoiConfig {
            average_daily_rate: self.daily_rate.unwrap_or(base.average_daily_rate),
            daily_working_hours: self.hours.unwrap_or(base.daily_working_hours),
            working_days_per_month: self.days_per_month.unwrap_or(base.working_days_per_month),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.daily_rate.is_none() && self.hours.is_none() && self.days_per_month.is_none()
    }
}

#[derive(Serialize)]
struct RoiPayload<'a> {
    config: &'a RoiConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a RoiReport>,
}

/// Adopt `roi` for this run, persisting it through `store` first when `persist` is set.
/// Returns whether anything was written.
fn adopt_roi<S: ConfigStore>(
    state: &mut DashboardState,
    roi: RoiConfig,
    persist: bool,
    store: &mut S,
) -> Result<bool, ConfigError> {
    if persist {
        state.save_config(roi, store)?;
        Ok(true)
    } else {
        state.apply_config(roi);
        Ok(false)
    }
}

pub async fn run(
    config: &AppConfig,
    config_path: &Path,
    loader_opts: &LoaderOptions,
    overrides: RoiOverrides,
    save: bool,
    opts: &OutputOptions,
) -> Result<()> {
    let roi = overrides.apply(config.roi);
    let issues = roi.validate();
    if !issues.is_empty() {
        anyhow::bail!("Invalid ROI settings: {}", issues.join("; "));
    }

    let (_, mut state) = load_state(config, loader_opts, opts).await?;
    let mut store = ConfigFile::new(config_path);
    let saved = adopt_roi(&mut state, roi, save && !overrides.is_empty(), &mut store)
        .with_context(|| format!("Failed to save ROI settings to {}", config_path.display()))?;
    if saved {
        eprintln!("Saved ROI settings to {}", config_path.display());
    } else if save {
        eprintln!("Nothing to save: pass --daily-rate, --hours or --days-per-month");
    }

    match opts.format {
        OutputFormat::Text => match state.report() {
            Some(report) => println!(
                "{}",
                renderer::render_roi_report(report, state.config(), &opts.currency, opts.use_color)
            ),
            None => println!("{}", renderer::render_empty(opts.use_color)),
        },
        OutputFormat::Json => {
            let payload = RoiPayload {
                config: state.config(),
                report: state.report(),
            };
            print_json(&payload, opts)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_fields() {
        let overrides = RoiOverrides {
            hours: Some(7.5),
            ..Default::default()
        };
        let roi = overrides.apply(RoiConfig::default());
        assert_eq!(roi.average_daily_rate, 450.0);
        assert_eq!(roi.daily_working_hours, 7.5);
        assert_eq!(roi.working_days_per_month, 20.0);
        assert!(!overrides.is_empty());
        assert!(RoiOverrides::default().is_empty());
    }

    #[test]
    fn adopt_roi_persists_then_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut base = AppConfig::default();
        base.github.organization = Some("acme".to_string());
        base.save_to(&path).unwrap();

        let mut state = DashboardState::new(RoiConfig::default());
        let roi = RoiOverrides {
            daily_rate: Some(600.0),
            ..Default::default()
        }
        .apply(RoiConfig::default());
        let mut store = ConfigFile::new(&path);

        assert!(adopt_roi(&mut state, roi, true, &mut store).unwrap());
        assert_eq!(state.config().average_daily_rate, 600.0);
        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.roi, roi);
        assert_eq!(loaded.github.organization.as_deref(), Some("acme"));
    }

    #[test]
    fn adopt_roi_without_persist_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut state = DashboardState::new(RoiConfig::default());
        let roi = RoiConfig {
            daily_working_hours: 6.0,
            ..Default::default()
        };
        let mut store = ConfigFile::new(&path);

        assert!(!adopt_roi(&mut state, roi, false, &mut store).unwrap());
        assert_eq!(state.config().daily_working_hours, 6.0);
        assert!(!path.exists());
    }

    #[test]
    fn adopt_roi_keeps_state_when_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\ncolor = 5\n").unwrap();
        let mut state = DashboardState::new(RoiConfig::default());
        let roi = RoiConfig {
            average_daily_rate: 900.0,
            ..Default::default()
        };
        let mut store = ConfigFile::new(&path);

        assert!(adopt_roi(&mut state, roi, true, &mut store).is_err());
        assert_eq!(*state.config(), RoiConfig::default());
    }
}
