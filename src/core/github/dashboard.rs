use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::github::client::http_client;
use crate::core::github::fetch::{parse_response, validate_endpoint, LoaderError};
use crate::core::models::roster::Roster;
use crate::core::models::usage::MetricsSnapshot;

/// Client for a dashboard backend that already aggregates the GitHub data
/// and serves it as `{ usage, billing }` plus a `/api/users` roster.
#[derive(Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    org: Option<String>,
    token: Option<String>,
}

impl std::fmt::Debug for DashboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardClient")
            .field("base_url", &self.base_url)
            .field("org", &self.org)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DashboardClient {
    pub fn new(
        base_url: &str,
        org: Option<String>,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, LoaderError> {
        validate_endpoint(base_url, "dashboard_url")?;
        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            org,
            token,
        })
    }

    pub fn organization(&self) -> Option<&str> {
        self.org.as_deref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &'static str,
    ) -> Result<T, LoaderError> {
        let url = self.endpoint(path);
        let mut request = self.http.get(&url);
        if let Some(org) = &self.org {
            request = request.query(&[("org", org)]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        debug!(url = %url, "GET");

        let response = request.send().await.map_err(|source| LoaderError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| LoaderError::Transport {
                url: url.clone(),
                source,
            })?;
        debug!(url = %url, status, "response");
        parse_response(status, &body, what)
    }

    /// `GET {base}/api/metrics?org=<org>`
    pub async fn snapshot(&self) -> Result<MetricsSnapshot, LoaderError> {
        self.get_json("/api/metrics", "dashboard metrics").await
    }

    /// `GET {base}/api/users`
    pub async fn roster(&self) -> Result<Roster, LoaderError> {
        self.get_json("/api/users", "dashboard users").await
    }
}
