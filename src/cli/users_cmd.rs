use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::output::{print_json, start_spinner, stop_spinner, OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::github::client::{resolve_token, GithubClient};
use crate::core::github::fetch::LoaderError;
use crate::core::loader::{Loader, LoaderOptions, SnapshotSource};

pub async fn run(config: &AppConfig, loader_opts: &LoaderOptions, opts: &OutputOptions) -> Result<()> {
    let loader = Loader::build(config, loader_opts).context("Failed to set up the data source")?;

    let spinner = start_spinner("Fetching seat assignments...", opts);
    let result = loader.fetch_roster().await;
    stop_spinner(spinner);
    let roster = result.with_context(|| format!("Failed to load seats from {}", loader.describe()))?;

    match opts.format {
        OutputFormat::Text => println!("{}", renderer::render_roster(&roster, opts.use_color)),
        OutputFormat::Json => print_json(&roster, opts)?,
    }
    Ok(())
}

/// Check that the resolved token can read the organization.
pub async fn verify(config: &AppConfig, org: Option<String>, opts: &OutputOptions) -> Result<()> {
    let github = &config.github;
    let org = org
        .or_else(|| github.organization.clone())
        .ok_or(LoaderError::MissingOrganization)?;
    let token = resolve_token(github.token.as_deref())?;
    let client = GithubClient::new(&github.api_base, &org, token, github.timeout_secs)?;

    client
        .verify()
        .await
        .with_context(|| format!("Cannot access organization '{}'", org))?;

    match opts.format {
        OutputFormat::Text => {
            colored::control::set_override(opts.use_color);
            println!("{} Connected to organization {}", "✓".green(), org.bold());
        }
        OutputFormat::Json => print_json(
            &serde_json::json!({ "organization": org, "ok": true }),
            opts,
        )?,
    }
    Ok(())
}
