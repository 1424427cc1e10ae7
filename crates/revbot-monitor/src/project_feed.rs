use serde::{Deserialize, Serialize};

/// Site state a revision must report before the monitor acts on comments.
pub const SITE_STATE_READY: &str = "done";

/// Card type tag marking a comment that carries a tip.
pub const TIP_CARD_TYPE: &str = "tip_comment";

/// Tip amount reported for comments without tip-card metadata.
pub const NO_TIP_SENTINEL: i64 = -1;

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `CommentAuthor` shared across revbot components.
pub struct CommentAuthor {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Tip-card metadata attached to a comment by the platform.
pub struct CommentCardData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub credits_spent: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Public struct `ProjectComment` shared across revbot components.
pub struct ProjectComment {
    pub id: String,
    pub raw_content: String,
    #[serde(default)]
    pub pinned: bool,
    pub author: CommentAuthor,
    #[serde(default)]
    pub card_data: Option<CommentCardData>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentEnvelope {
    pub comment: ProjectComment,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentPage {
    #[serde(default)]
    pub data: Vec<CommentEnvelope>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Wrapped comment listing as returned by the comments and replies endpoints.
pub struct CommentFeed {
    pub comments: CommentPage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevisionSite {
    pub state: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevisionAuthor {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevisionRecord {
    pub created_by: RevisionAuthor,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevisionEnvelope {
    pub site: RevisionSite,
    pub project_revision: RevisionRecord,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevisionPage {
    #[serde(default)]
    pub data: Vec<RevisionEnvelope>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Wrapped revision listing, newest entry first.
pub struct RevisionFeed {
    pub revisions: RevisionPage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LikedProject {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
/// One entry of a user's like listing. Some entries reference broken
/// projects, so every field is optional.
pub struct LikeEnvelope {
    #[serde(default)]
    pub project: Option<LikedProject>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LikePage {
    #[serde(default)]
    pub data: Vec<LikeEnvelope>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LikesFeed {
    pub likes: LikePage,
}

/// Extract the tip amount from a comment's card metadata.
///
/// Comments without a recognized tip card report [`NO_TIP_SENTINEL`], which
/// fails every tip gate with a non-negative minimum.
pub fn tip_amount_of(card_data: Option<&CommentCardData>) -> i64 {
    match card_data {
        Some(card) if card.kind == TIP_CARD_TYPE => card.credits_spent,
        _ => NO_TIP_SENTINEL,
    }
}
