use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use revbot_monitor::auth_expiry::is_jwt_expired;

use super::cookie_store::CookieSnapshot;

const ERROR_BODY_MAX_CHARS: usize = 800;
const LIKES_PAGE_SIZE: u32 = 100;

#[derive(Debug)]
/// Classified outcome of one platform API call.
pub(super) enum ApiBody {
    Ok(Value),
    AuthExpired,
    HttpError { status: u16, body: String },
}

#[derive(Clone)]
pub(super) struct ProjectApiClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl ProjectApiClient {
    pub(super) fn new(base_url: &str, project_id: &str, request_timeout_ms: u64) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create project api client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        })
    }

    pub(super) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(super) async fn fetch_revisions(&self, cookies: &CookieSnapshot) -> Result<ApiBody> {
        let url = format!(
            "{}/api/v1/projects/{}/revisions",
            self.base_url, self.project_id
        );
        self.send_json("fetch revisions", self.http.get(url), cookies)
            .await
    }

    pub(super) async fn fetch_comments(&self, cookies: &CookieSnapshot) -> Result<ApiBody> {
        let url = format!(
            "{}/api/v1/projects/{}/comments",
            self.base_url, self.project_id
        );
        self.send_json("fetch comments", self.http.get(url), cookies)
            .await
    }

    pub(super) async fn fetch_replies(
        &self,
        comment_id: &str,
        cookies: &CookieSnapshot,
    ) -> Result<ApiBody> {
        let url = format!(
            "{}/api/v1/projects/{}/comments/{}/replies",
            self.base_url, self.project_id, comment_id
        );
        self.send_json("fetch replies", self.http.get(url), cookies)
            .await
    }

    /// Single page only; likes beyond the first page are invisible to the
    /// like gate.
    pub(super) async fn fetch_user_likes(
        &self,
        username: &str,
        cookies: &CookieSnapshot,
    ) -> Result<ApiBody> {
        let url = format!("{}/api/v1/users/{}/likes", self.base_url, username);
        let request = self
            .http
            .get(url)
            .query(&[("first", LIKES_PAGE_SIZE.to_string())]);
        self.send_json("fetch user likes", request, cookies).await
    }

    pub(super) async fn post_reply(
        &self,
        parent_comment_id: &str,
        content: &str,
        cookies: &CookieSnapshot,
    ) -> Result<ApiBody> {
        let url = format!(
            "{}/api/v1/projects/{}/comments",
            self.base_url, self.project_id
        );
        let payload = json!({
            "content": content,
            "parent_comment_id": parent_comment_id,
        });
        self.send_json("post comment reply", self.http.post(url).json(&payload), cookies)
            .await
    }

    async fn send_json(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        cookies: &CookieSnapshot,
    ) -> Result<ApiBody> {
        let request = if cookies.is_empty() {
            request
        } else {
            request.header(reqwest::header::COOKIE, cookies.header_value())
        };
        let response = request
            .send()
            .await
            .with_context(|| format!("project api {operation} request failed"))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read project api {operation} body"))?;
        Ok(classify_response(status, &body))
    }
}

/// Auth guard: JWT expiry is detected from the body regardless of status,
/// before any status-code handling.
pub(super) fn classify_response(status: u16, body: &str) -> ApiBody {
    let parsed = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
    if is_jwt_expired(&parsed) {
        return ApiBody::AuthExpired;
    }
    if !(200..300).contains(&status) {
        return ApiBody::HttpError {
            status,
            body: truncate_for_error(body, ERROR_BODY_MAX_CHARS),
        };
    }
    ApiBody::Ok(parsed)
}

pub(super) fn truncate_for_error(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let truncated = body.chars().take(max_chars).collect::<String>();
    format!("{truncated}…")
}
