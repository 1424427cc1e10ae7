use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::info;

use super::cookie_store::CookieSnapshot;
use super::project_api_client::truncate_for_error;

const SITE_ID_LENGTH: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Descriptor of a newly created project revision.
pub struct RevisionDescriptor {
    pub revision_id: String,
    pub version: u64,
}

#[derive(Debug, Clone)]
/// Inputs for one revision-creation call.
pub struct RevisionRequest {
    pub project_id: String,
    pub content: String,
    pub model_id: String,
}

#[async_trait]
/// Collaborator that produces a new project revision from triggering content.
pub trait RevisionCreator: Send + Sync {
    async fn create_revision(
        &self,
        request: &RevisionRequest,
        cookies: &CookieSnapshot,
    ) -> Result<RevisionDescriptor>;
}

/// HTTP implementation of [`RevisionCreator`] running the platform's
/// create-and-publish sequence: fetch the parent version, create the
/// revision, create a draft site for it, confirm the draft, and promote the
/// project's current version.
pub struct HttpRevisionCreator {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRevisionCreator {
    pub fn new(base_url: &str, request_timeout_ms: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create revision creator client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(
        &self,
        operation: &str,
        expected_status: u16,
        request: reqwest::RequestBuilder,
        cookies: &CookieSnapshot,
    ) -> Result<Value> {
        let request = if cookies.is_empty() {
            request
        } else {
            request.header(reqwest::header::COOKIE, cookies.header_value())
        };
        let response = request
            .send()
            .await
            .with_context(|| format!("{operation} request failed"))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read {operation} body"))?;
        if status != expected_status {
            bail!(
                "{operation} failed with status {status}: {}",
                truncate_for_error(&body, 800)
            );
        }
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

#[async_trait]
impl RevisionCreator for HttpRevisionCreator {
    async fn create_revision(
        &self,
        request: &RevisionRequest,
        cookies: &CookieSnapshot,
    ) -> Result<RevisionDescriptor> {
        let url_project = format!("{}/api/v1/projects/{}", self.base_url, request.project_id);

        let project = self
            .send(
                "fetch project info",
                200,
                self.http.get(&url_project),
                cookies,
            )
            .await?;
        let parent_version = project
            .pointer("/project_revision/version")
            .and_then(Value::as_u64)
            .context("project info missing project_revision.version")?;
        info!(parent_version, "current project version");

        let created = self
            .send(
                "create revision",
                201,
                self.http
                    .post(format!("{url_project}/revisions"))
                    .json(&json!({ "parent_version": parent_version })),
                cookies,
            )
            .await?;
        let revision_id = created
            .pointer("/project_revision/id")
            .and_then(Value::as_str)
            .context("create revision response missing project_revision.id")?
            .to_string();
        let version = created
            .pointer("/project_revision/version")
            .and_then(Value::as_u64)
            .context("create revision response missing project_revision.version")?;

        let lowered = request.content.to_lowercase();
        let enable_multiplayer = lowered.contains("multiplayer");
        let enable_db = lowered.contains("database") || lowered.contains("db");
        let site_id = derive_site_id(&request.project_id, version, current_unix_timestamp_ms());
        let payload_site = json!({
            "generate": {
                "prompt": {"type": "plaintext", "text": request.content, "data": Value::Null},
                "flags": {"use_worker_generation": false},
                "model": request.model_id,
                "lore": {
                    "version": 1,
                    "attachments": [],
                    "references": [],
                    "enableDatabase": false,
                    "enableApi": true,
                    "enableMultiplayer": enable_multiplayer,
                    "enableMobilePrompt": true,
                    "enableDB": enable_db,
                    "enableLLM": false,
                    "enableLLM2": true,
                    "enableTweaks": false,
                    "features": {
                        "context": true,
                        "errors": true,
                        "htmx": true,
                        "images": true,
                        "navigation": true,
                    },
                },
            },
            "project_id": request.project_id,
            "project_version": version,
            "project_revision_id": revision_id,
            "site_id": site_id,
        });
        self.send(
            "create draft site",
            201,
            self.http
                .post(format!("{}/api/v1/sites", self.base_url))
                .json(&payload_site),
            cookies,
        )
        .await?;

        self.send(
            "confirm draft",
            200,
            self.http
                .patch(format!("{url_project}/revisions/{version}"))
                .json(&json!({ "draft": false })),
            cookies,
        )
        .await?;

        self.send(
            "update current version",
            200,
            self.http
                .patch(&url_project)
                .json(&json!({ "current_version": version })),
            cookies,
        )
        .await?;

        Ok(RevisionDescriptor {
            revision_id,
            version,
        })
    }
}

/// Derive a 17-character alphanumeric site id from the project, revision
/// version, and current time.
fn derive_site_id(project_id: &str, version: u64, now_unix_ms: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_id.as_bytes());
    hasher.update(version.to_be_bytes());
    hasher.update(now_unix_ms.to_be_bytes());
    let digest = hasher.finalize();
    let mut site_id = String::with_capacity(SITE_ID_LENGTH);
    for byte in digest {
        site_id.push_str(&format!("{byte:02x}"));
        if site_id.len() >= SITE_ID_LENGTH {
            break;
        }
    }
    site_id.truncate(SITE_ID_LENGTH);
    site_id
}

fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
