use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{print_json, start_spinner, stop_spinner, OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::loader::{Loader, LoaderOptions};
use crate::core::models::report::RoiReport;
use crate::core::models::usage::MetricsSnapshot;
use crate::core::state::DashboardState;

const LANGUAGE_ROWS: usize = 10;

#[derive(Serialize)]
struct MetricsPayload<'a> {
    source: String,
    #[serde(flatten)]
    snapshot: &'a MetricsSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    roi: Option<&'a RoiReport>,
}

/// Build the source and load one snapshot into a fresh state.
pub async fn load_state(
    config: &AppConfig,
    loader_opts: &LoaderOptions,
    opts: &OutputOptions,
) -> Result<(Loader, DashboardState)> {
    let loader = Loader::build(config, loader_opts).context("Failed to set up the data source")?;
    let mut state = DashboardState::new(config.roi);

    let spinner = start_spinner("Fetching Copilot metrics...", opts);
    let result = state.refresh(&loader).await;
    stop_spinner(spinner);

    result.with_context(|| format!("Failed to load metrics from {}", loader.describe()))?;
    Ok((loader, state))
}

pub async fn run(config: &AppConfig, loader_opts: &LoaderOptions, opts: &OutputOptions) -> Result<()> {
    let (loader, state) = load_state(config, loader_opts, opts).await?;
    let snapshot = state.snapshot().cloned().unwrap_or_default();

    match opts.format {
        OutputFormat::Text => {
            let Some(usage) = snapshot.usage.as_ref() else {
                println!("{}", renderer::render_empty(opts.use_color));
                return Ok(());
            };

            let mut sections = vec![
                renderer::render_overview(&loader.label(), usage, opts.use_color),
                renderer::render_daily(usage, opts.use_color),
                renderer::render_languages(usage, LANGUAGE_ROWS, opts.use_color),
            ];
            if let Some(billing) = &snapshot.billing {
                sections.push(renderer::render_billing(billing, opts.use_color));
            }
            if let Some(report) = state.report() {
                sections.push(renderer::render_roi_summary(
                    report,
                    &opts.currency,
                    opts.use_color,
                ));
            }
            println!("{}", sections.join("\n\n"));
        }
        OutputFormat::Json => {
            let payload = MetricsPayload {
                source: loader.describe(),
                snapshot: &snapshot,
                roi: state.report(),
            };
            print_json(&payload, opts)?;
        }
    }

    Ok(())
}
