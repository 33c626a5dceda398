use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{print_json, OutputFormat, OutputOptions};
use crate::core::config::{AppConfig, ConfigFile, ConfigStore, RoiConfig};

pub fn init(path: &Path, _opts: &OutputOptions) -> Result<()> {
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    match AppConfig::default().save_to(path) {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            println!("  Set your organization with `croi config set org <name>`.");
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Copy of `config` that is safe to print.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    if shown.github.token.is_some() {
        shown.github.token = Some("<redacted>".to_string());
    }
    shown
}

pub fn show(path: &Path, opts: &OutputOptions) -> Result<()> {
    let config = match AppConfig::load_from(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    let shown = redacted(&config);

    match opts.format {
        OutputFormat::Text => {
            if !path.exists() {
                println!("# No config file at {}, showing defaults", path.display());
            } else {
                println!("# {}", path.display());
            }
            let text = toml::to_string_pretty(&shown).context("Failed to serialize config")?;
            print!("{}", text);
        }
        OutputFormat::Json => print_json(&shown, opts)?,
    }
    Ok(())
}

pub fn check(path: &Path, _opts: &OutputOptions) -> Result<()> {
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `croi config init` to create one.");
        return Ok(());
    }

    let config = match AppConfig::load_from(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("Config is valid: {}", path.display());
        match &config.github.organization {
            Some(org) => println!("  Organization: {}", org),
            None => println!("  No organization set."),
        }
        println!(
            "  ROI: {} per day, {}h per day, {} days per month",
            config.roi.average_daily_rate,
            config.roi.daily_working_hours,
            config.roi.working_days_per_month
        );
    } else {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}

pub fn set(path: &Path, key: &str, value: &str, _opts: &OutputOptions) -> Result<()> {
    let mut config = AppConfig::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Err(e) = config.set_value(key, value) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    config.save_to(path)?;
    if key.contains("token") {
        println!("Updated {}", key);
    } else {
        println!("Set {} = {}", key, value);
    }
    Ok(())
}

/// Restore the ROI assumptions to their defaults, leaving every other section as is.
pub fn reset(path: &Path, _opts: &OutputOptions) -> Result<()> {
    let defaults = RoiConfig::default();
    ConfigFile::new(path)
        .save_roi(&defaults)
        .with_context(|| format!("Failed to reset {}", path.display()))?;
    println!(
        "Reset ROI settings to {} per day, {}h per day, {} days per month",
        defaults.average_daily_rate, defaults.daily_working_hours, defaults.working_days_per_month
    );
    Ok(())
}
