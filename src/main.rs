mod cli;
mod core;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::roi_cmd::RoiOverrides;
use crate::core::config::AppConfig;
use crate::core::loader::{LoaderOptions, SourceKind};

#[derive(Parser)]
#[command(
    name = "croi",
    about = "GitHub Copilot usage metrics and ROI estimates for an organization",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct SourceArgs {
    /// GitHub organization (default: github.organization from the config)
    #[arg(short, long)]
    org: Option<String>,

    /// Where to load data from (auto|github|dashboard|file)
    #[arg(long)]
    source: Option<String>,

    /// Read the metrics snapshot from a JSON file
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Number of days of history to fetch (1-100)
    #[arg(long)]
    days: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show usage metrics, languages, billing and a short ROI summary
    Metrics {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show the detailed ROI report
    Roi {
        #[command(flatten)]
        source: SourceArgs,

        /// Average daily rate per developer
        #[arg(long)]
        daily_rate: Option<f64>,

        /// Working hours per day
        #[arg(long)]
        hours: Option<f64>,

        /// Working days per month
        #[arg(long)]
        days_per_month: Option<f64>,

        /// Persist the given overrides to the config file
        #[arg(long)]
        save: bool,
    },
    /// List seat holders and their last activity
    Users {
        #[command(flatten)]
        source: SourceArgs,

        /// Read the roster from a JSON file
        #[arg(long, value_name = "PATH")]
        roster: Option<PathBuf>,
    },
    /// Check that the token can access the organization
    Verify {
        #[arg(short, long)]
        org: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Print the effective config (token redacted)
    Show,
    /// Validate config file
    Check,
    /// Set a value, e.g. `org acme` or `roi.average_daily_rate 500`
    Set { key: String, value: String },
    /// Restore the ROI assumptions to their defaults
    Reset,
}

fn loader_options(args: SourceArgs, roster: Option<PathBuf>) -> Result<LoaderOptions> {
    let kind = match args.source.as_deref() {
        None => SourceKind::Auto,
        Some(id) => match SourceKind::from_id(id) {
            Some(kind) => kind,
            None => anyhow::bail!("Unknown source: '{}' (expected auto, github, dashboard or file)", id),
        },
    };
    Ok(LoaderOptions {
        kind,
        org: args.org,
        snapshot: args.snapshot,
        roster,
        days: args.days,
    })
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},hyper_util=warn,hyper=warn,reqwest=warn,rustls=warn",
            default_level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_or_default(&config_path);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        let requested = cli
            .format
            .as_deref()
            .unwrap_or(config.settings.default_format.as_str());
        match OutputFormat::from_id(requested) {
            Some(format) => format,
            None => anyhow::bail!("Unknown format: '{}' (expected text or json)", requested),
        }
    };

    let output_opts = OutputOptions {
        format,
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color, &config.settings.color),
        verbose: cli.verbose,
        currency: config.settings.currency.clone(),
    };

    match cli.command {
        None => {
            let loader_opts = loader_options(SourceArgs::default(), None)?;
            cli::metrics_cmd::run(&config, &loader_opts, &output_opts).await?;
        }
        Some(Commands::Metrics { source }) => {
            let loader_opts = loader_options(source, None)?;
            cli::metrics_cmd::run(&config, &loader_opts, &output_opts).await?;
        }
        Some(Commands::Roi {
            source,
            daily_rate,
            hours,
            days_per_month,
            save,
        }) => {
            let loader_opts = loader_options(source, None)?;
            let overrides = RoiOverrides {
                daily_rate,
                hours,
                days_per_month,
            };
            cli::roi_cmd::run(&config, &config_path, &loader_opts, overrides, save, &output_opts)
                .await?;
        }
        Some(Commands::Users { source, roster }) => {
            let loader_opts = loader_options(source, roster)?;
            cli::users_cmd::run(&config, &loader_opts, &output_opts).await?;
        }
        Some(Commands::Verify { org }) => {
            cli::users_cmd::verify(&config, org, &output_opts).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init(&config_path, &output_opts)?,
            ConfigAction::Show => cli::config_cmd::show(&config_path, &output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&config_path, &output_opts)?,
            ConfigAction::Set { key, value } => {
                cli::config_cmd::set(&config_path, &key, &value, &output_opts)?
            }
            ConfigAction::Reset => cli::config_cmd::reset(&config_path, &output_opts)?,
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn roi_flags_parse() {
        let cli = Cli::try_parse_from([
            "croi", "roi", "--org", "acme", "--daily-rate", "500", "--hours", "7.5", "--save", "-j",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Some(Commands::Roi {
                source,
                daily_rate,
                hours,
                days_per_month,
                save,
            }) => {
                assert_eq!(source.org.as_deref(), Some("acme"));
                assert_eq!(daily_rate, Some(500.0));
                assert_eq!(hours, Some(7.5));
                assert_eq!(days_per_month, None);
                assert!(save);
            }
            _ => panic!("expected roi command"),
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        let args = SourceArgs {
            source: Some("s3".to_string()),
            ..Default::default()
        };
        assert!(loader_options(args, None).is_err());
    }

    #[test]
    fn source_flags_map_to_loader_options() {
        let args = SourceArgs {
            org: Some("acme".to_string()),
            source: Some("github".to_string()),
            snapshot: None,
            days: Some(14),
        };
        let opts = loader_options(args, Some(PathBuf::from("seats.json"))).unwrap();
        assert_eq!(opts.kind, SourceKind::Github);
        assert_eq!(opts.days, Some(14));
        assert_eq!(opts.roster, Some(PathBuf::from("seats.json")));
    }
}
