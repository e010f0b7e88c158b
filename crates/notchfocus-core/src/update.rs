//! Release-metadata polling.
//!
//! Fetches the latest-release JSON from GitHub and compares dotted
//! version strings. Prompt bookkeeping (which version the user was last
//! asked about, and when) lives in the kv store so the user is not
//! nagged more than once a day about the same release.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{StorageError, UpdateError};
use crate::storage::Database;

const RELEASE_ENDPOINT: &str =
    "https://api.github.com/repos/notchfocus/notchfocus/releases/latest";
const USER_AGENT: &str = "notchfocus";

const KV_LAST_PROMPTED_VERSION: &str = "update.last_prompted_version";
const KV_LAST_PROMPTED_AT: &str = "update.last_prompted_at";

/// Re-prompting about the same release is suppressed for this long.
const PROMPT_SUPPRESS_HOURS: i64 = 24;

/// A newer release the user can be pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub version: String,
    pub url: String,
}

/// Polls the release-metadata endpoint.
pub struct UpdateChecker {
    endpoint: String,
    client: Client,
}

impl Default for UpdateChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateChecker {
    pub fn new() -> Self {
        Self::with_endpoint(RELEASE_ENDPOINT.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Self {
        Self {
            endpoint,
            client: Client::new(),
        }
    }

    /// Fetch the latest release and return it if it is newer than
    /// `current_version`.
    ///
    /// # Errors
    /// Returns an error on transport failure or malformed metadata.
    pub async fn check(&self, current_version: &str) -> Result<Option<ReleaseInfo>, UpdateError> {
        let url = Url::parse(&self.endpoint)?;
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpdateError::BadStatus(response.status().as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let tag = body["tag_name"]
            .as_str()
            .ok_or_else(|| UpdateError::MalformedResponse("missing tag_name".into()))?;
        let version = tag.trim_start_matches('v').to_string();
        let html_url = body["html_url"].as_str().unwrap_or_default().to_string();

        if is_newer(&version, current_version) {
            Ok(Some(ReleaseInfo {
                version,
                url: html_url,
            }))
        } else {
            Ok(None)
        }
    }
}

/// Dotted numeric version comparison. Missing segments count as zero;
/// non-numeric segments count as zero.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };
    let a = parse(candidate);
    let b = parse(current);
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x > y;
        }
    }
    false
}

/// Whether the user should be prompted about `release` now: yes for a
/// version not prompted before, or when the last prompt for it is older
/// than the suppression window.
pub fn should_prompt(
    db: &Database,
    release: &ReleaseInfo,
    now: DateTime<Utc>,
) -> Result<bool, StorageError> {
    let last_version = db.kv_get(KV_LAST_PROMPTED_VERSION)?;
    if last_version.as_deref() != Some(release.version.as_str()) {
        return Ok(true);
    }
    let last_at = db
        .kv_get(KV_LAST_PROMPTED_AT)?
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|t| t.with_timezone(&Utc));
    match last_at {
        Some(at) => Ok(now.signed_duration_since(at).num_hours() >= PROMPT_SUPPRESS_HOURS),
        None => Ok(true),
    }
}

/// Record that the user was prompted about `release` at `now`.
pub fn mark_prompted(
    db: &Database,
    release: &ReleaseInfo,
    now: DateTime<Utc>,
) -> Result<(), StorageError> {
    db.kv_set(KV_LAST_PROMPTED_VERSION, &release.version)?;
    db.kv_set(KV_LAST_PROMPTED_AT, &now.to_rfc3339())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn version_ordering() {
        assert!(is_newer("1.2.0", "1.1.9"));
        assert!(is_newer("2.0", "1.9.9"));
        assert!(is_newer("1.2.1", "1.2"));
        assert!(!is_newer("1.2.0", "1.2.0"));
        assert!(!is_newer("1.1.9", "1.2.0"));
        assert!(!is_newer("garbage", "0.1.0"));
    }

    #[test]
    fn prompt_bookkeeping() {
        let db = Database::open_memory().unwrap();
        let release = ReleaseInfo {
            version: "1.3.0".into(),
            url: "https://example.com/releases/1.3.0".into(),
        };
        let now = Utc::now();

        assert!(should_prompt(&db, &release, now).unwrap());
        mark_prompted(&db, &release, now).unwrap();
        // Same version, same day: suppressed.
        assert!(!should_prompt(&db, &release, now + Duration::hours(1)).unwrap());
        // Suppression expires after a day.
        assert!(should_prompt(&db, &release, now + Duration::hours(25)).unwrap());
        // A different version always prompts.
        let next = ReleaseInfo {
            version: "1.4.0".into(),
            url: String::new(),
        };
        assert!(should_prompt(&db, &next, now).unwrap());
    }

    #[tokio::test]
    async fn check_reports_newer_release() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/releases/latest")
            .expect(2)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"tag_name": "v1.5.0", "html_url": "https://example.com/v1.5.0"}"#,
            )
            .create_async()
            .await;

        let checker = UpdateChecker::with_endpoint(format!("{}/releases/latest", server.url()));
        let release = checker.check("1.4.2").await.unwrap().unwrap();
        assert_eq!(release.version, "1.5.0");
        assert_eq!(release.url, "https://example.com/v1.5.0");

        let none = checker.check("1.5.0").await.unwrap();
        assert!(none.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn check_surfaces_server_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/releases/latest")
            .with_status(500)
            .create_async()
            .await;

        let checker = UpdateChecker::with_endpoint(format!("{}/releases/latest", server.url()));
        match checker.check("1.0.0").await {
            Err(UpdateError::BadStatus(500)) => {}
            other => panic!("expected BadStatus(500), got {other:?}"),
        }
    }
}
