use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::github::fetch::{parse_response, validate_endpoint, LoaderError};
use crate::core::metrics::DayMetrics;
use crate::core::models::billing::BillingSnapshot;
use crate::core::roster::SeatsPage;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("copilot-roi/", env!("CARGO_PKG_VERSION"));
const SEATS_PER_PAGE: usize = 50;
/// The metrics endpoint serves at most 100 days of history.
const METRICS_PER_PAGE: u32 = 100;
const MAX_SEAT_PAGES: u32 = 200;

/// Resolve the GitHub token from the config, GITHUB_TOKEN env, or `gh auth token`.
pub fn resolve_token(configured: Option<&str>) -> Result<String, LoaderError> {
    if let Some(token) = configured.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("using GitHub token from config");
        return Ok(token.to_string());
    }

    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.trim().is_empty() {
            debug!("using GitHub token from GITHUB_TOKEN");
            return Ok(token.trim().to_string());
        }
    }

    let output = match std::process::Command::new("gh").args(["auth", "token"]).output() {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, "`gh auth token` unavailable");
            return Err(LoaderError::MissingToken);
        }
    };

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            debug!("using GitHub token from `gh auth token`");
            return Ok(token);
        }
    }

    Err(LoaderError::MissingToken)
}

/// Build the shared HTTP client with the request timeout applied.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, LoaderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|source| LoaderError::Transport {
            url: "<client>".to_string(),
            source,
        })
}

/// `since`/`until` bounds for the last `days` days, in the format the metrics endpoint expects.
pub fn period_bounds(now: DateTime<Utc>, days: u32) -> (String, String) {
    let since = now - ChronoDuration::days(i64::from(days.max(1)));
    (
        since.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    )
}

/// Read-only client for the organization-level Copilot REST endpoints.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    org: String,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base)
            .field("org", &self.org)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GithubClient {
    pub fn new(
        api_base: &str,
        org: &str,
        token: String,
        timeout_secs: u64,
    ) -> Result<Self, LoaderError> {
        validate_endpoint(api_base, "api_base")?;
        if org.trim().is_empty() {
            return Err(LoaderError::MissingOrganization);
        }
        Ok(Self {
            http: http_client(timeout_secs)?,
            api_base: api_base.trim_end_matches('/').to_string(),
            org: org.trim().to_string(),
            token,
        })
    }

    pub fn organization(&self) -> &str {
        &self.org
    }

    fn url(&self, path: &str) -> String {
        format!("{}/orgs/{}{}", self.api_base, self.org, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &'static str,
    ) -> Result<T, LoaderError> {
        debug!(url, ?query, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|source| LoaderError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| LoaderError::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!(url, status, bytes = body.len(), "response");
        parse_response(status, &body, what)
    }

    /// `GET /orgs/{org}/copilot/billing`
    pub async fn billing(&self) -> Result<BillingSnapshot, LoaderError> {
        self.get_json(&self.url("/copilot/billing"), &[], "billing info")
            .await
    }

    /// `GET /orgs/{org}/copilot/metrics` for the last `days` days.
    pub async fn metrics(&self, days: u32) -> Result<Vec<DayMetrics>, LoaderError> {
        let (since, until) = period_bounds(Utc::now(), days);
        self.get_json(
            &self.url("/copilot/metrics"),
            &[
                ("since", since),
                ("until", until),
                ("per_page", METRICS_PER_PAGE.to_string()),
            ],
            "usage metrics",
        )
        .await
    }

    /// Every page of `GET /orgs/{org}/copilot/billing/seats`.
    pub async fn seats(&self) -> Result<Vec<SeatsPage>, LoaderError> {
        let url = self.url("/copilot/billing/seats");
        let mut pages = Vec::new();
        let mut fetched = 0u64;

        for page in 1..=MAX_SEAT_PAGES {
            let current: SeatsPage = self
                .get_json(
                    &url,
                    &[
                        ("page", page.to_string()),
                        ("per_page", SEATS_PER_PAGE.to_string()),
                    ],
                    "seat assignments",
                )
                .await?;
            let count = current.seats.len();
            fetched += count as u64;
            let total = current.total_seats;
            pages.push(current);

            let exhausted = total.is_some_and(|t| fetched >= t);
            if count < SEATS_PER_PAGE || exhausted {
                break;
            }
        }
        debug!(seats = fetched, pages = pages.len(), "fetched seat assignments");
        Ok(pages)
    }

    /// `GET /orgs/{org}`; succeeds when the token can see the organization.
    pub async fn verify(&self) -> Result<(), LoaderError> {
        let url = format!("{}/orgs/{}", self.api_base, self.org);
        let _: serde_json::Value = self.get_json(&url, &[], "organization").await?;
        Ok(())
    }
}
