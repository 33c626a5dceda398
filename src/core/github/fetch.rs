use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("No GitHub token found. Set GITHUB_TOKEN, `github.token` in the config, or run `gh auth login`")]
    MissingToken,
    #[error("No organization given. Pass --org or run `croi config set org <name>`")]
    MissingOrganization,
    #[error("No dashboard URL configured. Set `github.dashboard_url` or use --source github")]
    MissingDashboardUrl,
    #[error("No snapshot file given. Pass --snapshot <path>")]
    MissingSnapshotPath,
    #[error("No roster available from this source. Pass --roster <path>")]
    MissingRosterPath,
    #[error("{name}: endpoint must use HTTPS, got: {url}")]
    InsecureEndpoint { name: String, url: String },
    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unauthorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Failed to decode {what}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validate that a resolved endpoint URL uses HTTPS.
///
/// Plain HTTP is only accepted for loopback hosts, where a locally running
/// dashboard backend lives. Anything else would send the token in clear text.
pub fn validate_endpoint(url: &str, name: &str) -> Result<(), LoaderError> {
    if url.starts_with("https://") {
        return Ok(());
    }
    let loopback = ["http://localhost", "http://127.0.0.1", "http://[::1]"];
    let is_loopback = loopback.iter().any(|prefix| {
        url.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(':') || rest.starts_with('/'))
    });
    if is_loopback {
        return Ok(());
    }
    Err(LoaderError::InsecureEndpoint {
        name: name.to_string(),
        url: url.to_string(),
    })
}

/// Human-readable message from an error body: its `message` or `error`
/// field when it is JSON, the trimmed body otherwise.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Map a non-success status to an error carrying the upstream message.
pub fn check_status(status: u16, body: &str) -> Result<(), LoaderError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(LoaderError::Unauthorized {
            status,
            message: error_message(body),
        }),
        _ => Err(LoaderError::Http {
            status,
            message: error_message(body),
        }),
    }
}

/// Decode a success body. A JSON object carrying an `error` field is an
/// upstream failure even when the status was 2xx.
pub fn decode_payload<T: DeserializeOwned>(body: &str, what: &'static str) -> Result<T, LoaderError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|source| LoaderError::Decode { what, source })?;
    if let Some(err) = value.get("error") {
        if !err.is_null() {
            let message = err
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(LoaderError::Upstream(message));
        }
    }
    serde_json::from_value(value).map_err(|source| LoaderError::Decode { what, source })
}

/// Status check followed by decoding, for one HTTP exchange.
pub fn parse_response<T: DeserializeOwned>(
    status: u16,
    body: &str,
    what: &'static str,
) -> Result<T, LoaderError> {
    check_status(status, body)?;
    decode_payload(body, what)
}
