#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effecting action a completed tick performed.
pub enum TickAction {
    RevisionCreated { revision_id: String, version: u64 },
    TipReminderPosted,
    LikeReminderPosted,
}

impl TickAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RevisionCreated { .. } => "revision_created",
            Self::TipReminderPosted => "tip_reminder_posted",
            Self::LikeReminderPosted => "like_reminder_posted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Normal "nothing to do" reasons that end a tick without any write.
pub enum SkipReason {
    NoRevisions,
    SiteNotReady { state: String },
    NoComments,
    NoEligibleComment,
    AlreadyReplied,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRevisions => "no_revisions",
            Self::SiteNotReady { .. } => "site_not_ready",
            Self::NoComments => "no_comments",
            Self::NoEligibleComment => "no_eligible_comment",
            Self::AlreadyReplied => "already_replied",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of one complete engine tick, asserted on by the scheduler and
/// tests instead of being inferred from logs.
pub enum TickOutcome {
    Completed(TickAction),
    AbortedAuthExpired,
    AbortedHttpError { status: u16 },
    Skipped(SkipReason),
}

impl TickOutcome {
    /// Compact label for the per-tick poll report line.
    pub fn label(&self) -> String {
        match self {
            Self::Completed(action) => format!("completed:{}", action.as_str()),
            Self::AbortedAuthExpired => "aborted:auth_expired".to_string(),
            Self::AbortedHttpError { status } => format!("aborted:http_error:{status}"),
            Self::Skipped(reason) => format!("skipped:{}", reason.as_str()),
        }
    }

    /// Return true when the tick performed no remote write.
    pub fn is_read_only(&self) -> bool {
        !matches!(self, Self::Completed(_))
    }
}
