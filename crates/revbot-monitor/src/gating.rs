use crate::project_feed::LikesFeed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of evaluating one eligibility gate.
pub enum GateOutcome {
    /// The gate's flag is disabled; it vacuously passes.
    NotRequired,
    Passed,
    Failed,
}

impl GateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequired => "not_required",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Evaluate the tip gate. The `-1` no-tip sentinel fails every gate with a
/// non-negative minimum.
pub fn evaluate_tip_gate(require_tip_credit: bool, tip_amount: i64, minimum_tip_amount: i64) -> GateOutcome {
    if !require_tip_credit {
        return GateOutcome::NotRequired;
    }
    if tip_amount >= minimum_tip_amount {
        GateOutcome::Passed
    } else {
        GateOutcome::Failed
    }
}

/// Return true when any like entry references the given project. Entries
/// with missing or broken project data never match.
pub fn likes_include_project(feed: &LikesFeed, project_id: &str) -> bool {
    feed.likes.data.iter().any(|entry| {
        entry
            .project
            .as_ref()
            .and_then(|project| project.id.as_deref())
            == Some(project_id)
    })
}
