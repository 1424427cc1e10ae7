//! Auto-response monitor runtime: the per-tick decision engine and the
//! polling loop that drives it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info, warn};

use revbot_monitor::gating::{evaluate_tip_gate, likes_include_project, GateOutcome};
use revbot_monitor::project_feed::{
    tip_amount_of, CommentFeed, LikesFeed, ProjectComment, RevisionFeed, SITE_STATE_READY,
};
use revbot_monitor::response_templates::ResponseTemplates;
use revbot_monitor::target_selection::replies_contain_auto_response;
use revbot_monitor::tick_report::{SkipReason, TickAction, TickOutcome};

pub mod cookie_store;
mod project_api_client;
pub mod revision_creation;

use cookie_store::{fetch_refreshed_cookies, CookieSnapshot, CookieStore};
use project_api_client::{ApiBody, ProjectApiClient};
use revision_creation::{HttpRevisionCreator, RevisionCreator, RevisionRequest};

#[derive(Debug, Clone)]
/// Runtime configuration for the auto-response monitor loop.
pub struct MonitorRuntimeConfig {
    pub project_id: String,
    pub base_url: String,
    pub model_id: String,
    pub additional_note: String,
    pub initial_cookies: Vec<(String, String)>,
    pub require_like_project: bool,
    pub require_tip_credit: bool,
    pub minimum_tip_amount: i64,
    pub templates: ResponseTemplates,
    pub poll_interval: Duration,
    pub poll_once: bool,
    pub request_timeout_ms: u64,
}

/// Runs the auto-response monitor until shutdown (or for one tick in
/// one-shot mode).
pub async fn run_monitor(config: MonitorRuntimeConfig) -> Result<()> {
    let mut runtime = MonitorRuntime::new(config)?;
    runtime.run().await
}

pub struct MonitorRuntime {
    config: MonitorRuntimeConfig,
    client: ProjectApiClient,
    cookie_store: CookieStore,
    revision_creator: Arc<dyn RevisionCreator>,
}

/// Result of one guarded remote call inside a tick.
enum StepValue {
    Body(Value),
    Abort(TickOutcome),
}

enum ReplyCheck {
    Replied,
    NotReplied,
    Abort(TickOutcome),
}

impl MonitorRuntime {
    pub fn new(config: MonitorRuntimeConfig) -> Result<Self> {
        let revision_creator: Arc<dyn RevisionCreator> = Arc::new(HttpRevisionCreator::new(
            &config.base_url,
            config.request_timeout_ms,
        )?);
        Self::with_revision_creator(config, revision_creator)
    }

    /// Build a runtime with an injected revision-creation collaborator.
    pub fn with_revision_creator(
        config: MonitorRuntimeConfig,
        revision_creator: Arc<dyn RevisionCreator>,
    ) -> Result<Self> {
        let client = ProjectApiClient::new(
            &config.base_url,
            &config.project_id,
            config.request_timeout_ms,
        )?;
        let cookie_store = CookieStore::new(config.initial_cookies.clone());
        Ok(Self {
            config,
            client,
            cookie_store,
            revision_creator,
        })
    }

    /// Current session cookie snapshot, as used by the next remote call.
    pub fn cookie_snapshot(&self) -> CookieSnapshot {
        self.cookie_store.snapshot()
    }

    pub async fn run(&mut self) -> Result<()> {
        info!(project_id = %self.config.project_id, "starting auto-response monitor");
        loop {
            match self.poll_once().await {
                Ok(outcome) => {
                    println!(
                        "monitor poll: project={} outcome={}",
                        self.config.project_id,
                        outcome.label()
                    );
                    if self.config.poll_once {
                        return Ok(());
                    }
                }
                Err(poll_error) => {
                    eprintln!("monitor poll error: {poll_error:#}");
                    if self.config.poll_once {
                        return Err(poll_error);
                    }
                }
            }

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    println!("monitor shutdown requested");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Run one complete decision-engine tick.
    pub async fn poll_once(&mut self) -> Result<TickOutcome> {
        info!(project_id = %self.config.project_id, "checking project");
        let cookies = self.cookie_store.snapshot();

        // Step 1: latest revision decides readiness and the owner identity.
        let fetched = self.client.fetch_revisions(&cookies).await?;
        let value = match self.guard("fetch revisions", fetched).await? {
            StepValue::Body(value) => value,
            StepValue::Abort(outcome) => return Ok(outcome),
        };
        let revisions: RevisionFeed =
            serde_json::from_value(value).context("failed to decode revisions feed")?;
        let Some(latest) = revisions.revisions.data.first() else {
            info!("no revisions found");
            return Ok(TickOutcome::Skipped(SkipReason::NoRevisions));
        };
        info!(state = %latest.site.state, "latest revision site state");
        if latest.site.state != SITE_STATE_READY {
            info!("site not yet ready, skipping tick");
            return Ok(TickOutcome::Skipped(SkipReason::SiteNotReady {
                state: latest.site.state.clone(),
            }));
        }
        let owner_id = latest.project_revision.created_by.id.clone();

        // Step 2: scan comments for the oldest unanswered target. Pinned
        // comments are skipped without a reply check; the scan stops at the
        // first comment that already carries an auto-response.
        let fetched = self.client.fetch_comments(&cookies).await?;
        let value = match self.guard("fetch comments", fetched).await? {
            StepValue::Body(value) => value,
            StepValue::Abort(outcome) => return Ok(outcome),
        };
        let comments: CommentFeed =
            serde_json::from_value(value).context("failed to decode comments feed")?;
        if comments.comments.data.is_empty() {
            info!("no comments to process");
            return Ok(TickOutcome::Skipped(SkipReason::NoComments));
        }

        let mut target: Option<ProjectComment> = None;
        for entry in &comments.comments.data {
            if entry.comment.pinned {
                continue;
            }
            match self
                .has_auto_response(&owner_id, &entry.comment.id, &cookies)
                .await?
            {
                ReplyCheck::Replied => break,
                ReplyCheck::NotReplied => target = Some(entry.comment.clone()),
                ReplyCheck::Abort(outcome) => return Ok(outcome),
            }
        }
        let Some(target) = target else {
            info!("no eligible comment to process");
            return Ok(TickOutcome::Skipped(SkipReason::NoEligibleComment));
        };
        let tip_amount = tip_amount_of(target.card_data.as_ref());
        info!(
            author = %target.author.username,
            content = %target.raw_content,
            "selected target comment"
        );

        // Step 3: independent re-check before any write, in case another
        // process replied since the scan.
        match self
            .has_auto_response(&owner_id, &target.id, &cookies)
            .await?
        {
            ReplyCheck::Replied => {
                info!("found existing auto reply, skipping");
                return Ok(TickOutcome::Skipped(SkipReason::AlreadyReplied));
            }
            ReplyCheck::NotReplied => {}
            ReplyCheck::Abort(outcome) => return Ok(outcome),
        }

        // Step 4: tip gate, then like gate. At most one reminder per tick.
        match evaluate_tip_gate(
            self.config.require_tip_credit,
            tip_amount,
            self.config.minimum_tip_amount,
        ) {
            GateOutcome::NotRequired => info!("tip gate not required"),
            GateOutcome::Passed => {}
            GateOutcome::Failed => {
                info!(
                    tip_amount,
                    minimum = self.config.minimum_tip_amount,
                    "did not tip or tipped too little, sending reminder"
                );
                let reminder = self.config.templates.require_tip.clone();
                if let Some(outcome) = self
                    .post_guarded_reply(&target.id, &reminder, &cookies)
                    .await?
                {
                    return Ok(outcome);
                }
                info!("tip reminder posted");
                return Ok(TickOutcome::Completed(TickAction::TipReminderPosted));
            }
        }

        if self.config.require_like_project {
            let fetched = self
                .client
                .fetch_user_likes(&target.author.username, &cookies)
                .await?;
            let value = match self.guard("fetch user likes", fetched).await? {
                StepValue::Body(value) => value,
                StepValue::Abort(outcome) => return Ok(outcome),
            };
            let likes: LikesFeed =
                serde_json::from_value(value).context("failed to decode likes feed")?;
            if !likes_include_project(&likes, &self.config.project_id) {
                info!(
                    author = %target.author.username,
                    "author has not liked the project, sending reminder"
                );
                let reminder = self.config.templates.require_likes.clone();
                if let Some(outcome) = self
                    .post_guarded_reply(&target.id, &reminder, &cookies)
                    .await?
                {
                    return Ok(outcome);
                }
                info!("like reminder posted");
                return Ok(TickOutcome::Completed(TickAction::LikeReminderPosted));
            }
        } else {
            info!("like gate not required");
        }

        // Step 5: create the new revision from the triggering content.
        info!("creating new revision");
        let request = RevisionRequest {
            project_id: self.config.project_id.clone(),
            content: format!("{}{}", target.raw_content, self.config.additional_note),
            model_id: self.config.model_id.clone(),
        };
        let revision = self
            .revision_creator
            .create_revision(&request, &cookies)
            .await
            .context("revision creation failed")?;
        info!(
            revision_id = %revision.revision_id,
            version = revision.version,
            "revision created"
        );

        // Step 6: confirmation reply. Idempotence is re-verified only by the
        // next tick's reply check.
        let confirmation = self.config.templates.create_revision.clone();
        if let Some(outcome) = self
            .post_guarded_reply(&target.id, &confirmation, &cookies)
            .await?
        {
            return Ok(outcome);
        }
        info!("confirmation comment posted");
        Ok(TickOutcome::Completed(TickAction::RevisionCreated {
            revision_id: revision.revision_id,
            version: revision.version,
        }))
    }

    async fn has_auto_response(
        &mut self,
        owner_id: &str,
        comment_id: &str,
        cookies: &CookieSnapshot,
    ) -> Result<ReplyCheck> {
        let fetched = self.client.fetch_replies(comment_id, cookies).await?;
        let value = match self.guard("fetch replies", fetched).await? {
            StepValue::Body(value) => value,
            StepValue::Abort(outcome) => return Ok(ReplyCheck::Abort(outcome)),
        };
        let replies: CommentFeed =
            serde_json::from_value(value).context("failed to decode replies feed")?;
        if replies_contain_auto_response(
            &replies.comments.data,
            owner_id,
            &self.config.templates.prefix,
        ) {
            Ok(ReplyCheck::Replied)
        } else {
            Ok(ReplyCheck::NotReplied)
        }
    }

    async fn post_guarded_reply(
        &mut self,
        parent_comment_id: &str,
        content: &str,
        cookies: &CookieSnapshot,
    ) -> Result<Option<TickOutcome>> {
        let posted = self
            .client
            .post_reply(parent_comment_id, content, cookies)
            .await?;
        match self.guard("post comment reply", posted).await? {
            StepValue::Body(_) => Ok(None),
            StepValue::Abort(outcome) => Ok(Some(outcome)),
        }
    }

    /// Auth guard applied to every remote call: an expired session refreshes
    /// the cookie store and aborts the tick; a non-success status logs and
    /// aborts the tick without retry.
    async fn guard(&mut self, operation: &str, outcome: ApiBody) -> Result<StepValue> {
        match outcome {
            ApiBody::Ok(value) => Ok(StepValue::Body(value)),
            ApiBody::AuthExpired => {
                info!(operation, "authentication expired, refreshing session cookies");
                self.refresh_cookies().await;
                Ok(StepValue::Abort(TickOutcome::AbortedAuthExpired))
            }
            ApiBody::HttpError { status, body } => {
                error!(operation, status, body = %body, "project api call failed");
                Ok(StepValue::Abort(TickOutcome::AbortedHttpError { status }))
            }
        }
    }

    /// Best-effort cookie refresh. A refresher that yields nothing leaves
    /// the store untouched; the tick aborts either way and the next tick
    /// retries with whatever cookies exist.
    async fn refresh_cookies(&mut self) {
        let current = self.cookie_store.snapshot();
        match fetch_refreshed_cookies(self.client.http(), &self.config.base_url, &current).await {
            Ok(refreshed) if !refreshed.is_empty() => {
                let snapshot = self.cookie_store.merge(refreshed);
                info!(version = snapshot.version(), "session cookies refreshed");
            }
            Ok(_) => warn!("cookie refresh returned no cookies"),
            Err(refresh_error) => warn!(error = %refresh_error, "cookie refresh failed"),
        }
    }
}
