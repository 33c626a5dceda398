use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::github::client::{resolve_token, GithubClient};
use crate::core::github::dashboard::DashboardClient;
use crate::core::github::fetch::{decode_payload, LoaderError};
use crate::core::metrics::aggregate;
use crate::core::models::roster::Roster;
use crate::core::models::usage::MetricsSnapshot;
use crate::core::roster::build_roster;

/// Anything that can produce a metrics snapshot and a seat roster.
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, LoaderError>;
    async fn fetch_roster(&self) -> Result<Roster, LoaderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// File when a snapshot path is given, the dashboard backend when one
    /// is configured, GitHub otherwise.
    Auto,
    Github,
    Dashboard,
    File,
}

impl SourceKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "github" | "gh" => Some(Self::Github),
            "dashboard" | "backend" => Some(Self::Dashboard),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    fn resolve(self, config: &AppConfig, opts: &LoaderOptions) -> Self {
        match self {
            Self::Auto if opts.snapshot.is_some() || opts.roster.is_some() => Self::File,
            Self::Auto if config.github.dashboard_url.is_some() => Self::Dashboard,
            Self::Auto => Self::Github,
            other => other,
        }
    }
}

/// Command-line overrides applied on top of the config when building a source.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub kind: SourceKind,
    pub org: Option<String>,
    pub snapshot: Option<PathBuf>,
    pub roster: Option<PathBuf>,
    pub days: Option<u32>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            kind: SourceKind::Auto,
            org: None,
            snapshot: None,
            roster: None,
            days: None,
        }
    }
}

/// Fetches straight from the GitHub REST API and aggregates locally.
#[derive(Debug, Clone)]
pub struct GithubSource {
    client: GithubClient,
    period_days: u32,
}

impl GithubSource {
    pub fn new(client: GithubClient, period_days: u32) -> Self {
        Self {
            client,
            period_days: period_days.clamp(1, 100),
        }
    }

    pub fn client(&self) -> &GithubClient {
        &self.client
    }
}

impl SnapshotSource for GithubSource {
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, LoaderError> {
        info!(org = self.client.organization(), days = self.period_days, "fetching Copilot metrics");
        let (billing, records) =
            tokio::try_join!(self.client.billing(), self.client.metrics(self.period_days))?;
        debug!(days = records.len(), seats = billing.seat_breakdown.total, "fetched");

        let seat_total = Some(billing.seat_breakdown.total).filter(|t| *t > 0);
        let usage = aggregate(&records, seat_total);
        Ok(MetricsSnapshot {
            usage: Some(usage),
            billing: Some(billing),
        })
    }

    async fn fetch_roster(&self) -> Result<Roster, LoaderError> {
        let pages = self.client.seats().await?;
        Ok(build_roster(&pages, Utc::now()))
    }
}

impl SnapshotSource for DashboardClient {
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, LoaderError> {
        self.snapshot().await
    }

    async fn fetch_roster(&self) -> Result<Roster, LoaderError> {
        self.roster().await
    }
}

/// Reads JSON exports from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub snapshot: Option<PathBuf>,
    pub roster: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &'static str) -> Result<T, LoaderError> {
    debug!(path = %path.display(), "reading {}", what);
    let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_payload(&content, what)
}

impl SnapshotSource for FileSource {
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, LoaderError> {
        match &self.snapshot {
            Some(path) => read_json(path, "snapshot file"),
            None => Err(LoaderError::MissingSnapshotPath),
        }
    }

    async fn fetch_roster(&self) -> Result<Roster, LoaderError> {
        match &self.roster {
            Some(path) => read_json(path, "roster file"),
            None => Err(LoaderError::MissingRosterPath),
        }
    }
}

/// The source selected for this run.
#[derive(Debug, Clone)]
pub enum Loader {
    Github(GithubSource),
    Dashboard(DashboardClient),
    File(FileSource),
}

impl Loader {
    pub fn build(config: &AppConfig, opts: &LoaderOptions) -> Result<Self, LoaderError> {
        let github = &config.github;
        let org = opts
            .org
            .clone()
            .or_else(|| github.organization.clone())
            .filter(|o| !o.trim().is_empty());

        match opts.kind.resolve(config, opts) {
            SourceKind::File => {
                if opts.snapshot.is_none() && opts.roster.is_none() {
                    return Err(LoaderError::MissingSnapshotPath);
                }
                Ok(Self::File(FileSource {
                    snapshot: opts.snapshot.clone(),
                    roster: opts.roster.clone(),
                }))
            }
            SourceKind::Dashboard => {
                let url = github
                    .dashboard_url
                    .as_deref()
                    .ok_or(LoaderError::MissingDashboardUrl)?;
                let token = resolve_token(github.token.as_deref()).ok();
                Ok(Self::Dashboard(DashboardClient::new(
                    url,
                    org,
                    token,
                    github.timeout_secs,
                )?))
            }
            SourceKind::Github | SourceKind::Auto => {
                let org = org.ok_or(LoaderError::MissingOrganization)?;
                let token = resolve_token(github.token.as_deref())?;
                let client = GithubClient::new(&github.api_base, &org, token, github.timeout_secs)?;
                Ok(Self::Github(GithubSource::new(
                    client,
                    opts.days.unwrap_or(github.period_days),
                )))
            }
        }
    }

    /// Short name for headers: the organization, or the snapshot file name.
    pub fn label(&self) -> String {
        match self {
            Self::Github(src) => src.client().organization().to_string(),
            Self::Dashboard(src) => src.organization().unwrap_or("dashboard").to_string(),
            Self::File(src) => src
                .snapshot
                .as_ref()
                .or(src.roster.as_ref())
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "snapshot".to_string()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Github(src) => format!("github:{}", src.client().organization()),
            Self::Dashboard(_) => "dashboard".to_string(),
            Self::File(src) => match src.snapshot.as_ref().or(src.roster.as_ref()) {
                Some(path) => format!("file:{}", path.display()),
                None => "file".to_string(),
            },
        }
    }
}

impl SnapshotSource for Loader {
    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, LoaderError> {
        match self {
            Self::Github(src) => src.fetch_snapshot().await,
            Self::Dashboard(src) => src.fetch_snapshot().await,
            Self::File(src) => src.fetch_snapshot().await,
        }
    }

    async fn fetch_roster(&self) -> Result<Roster, LoaderError> {
        match self {
            Self::Github(src) => src.fetch_roster().await,
            Self::Dashboard(src) => src.fetch_roster().await,
            Self::File(src) => src.fetch_roster().await,
        }
    }
}
