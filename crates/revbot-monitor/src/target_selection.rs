use crate::project_feed::{CommentEnvelope, ProjectComment};

/// Return true when a reply was posted by the revision owner and carries the
/// auto-response prefix marker.
pub fn is_auto_response_reply(reply: &ProjectComment, owner_id: &str, prefix: &str) -> bool {
    reply.author.id == owner_id && reply.raw_content.contains(prefix)
}

/// Return true when any reply in a comment's reply set is a previous
/// auto-response. This check is the sole de-duplication signal and must be
/// evaluated against live remote state every tick, never cached.
pub fn replies_contain_auto_response(
    replies: &[CommentEnvelope],
    owner_id: &str,
    prefix: &str,
) -> bool {
    replies
        .iter()
        .any(|entry| is_auto_response_reply(&entry.comment, owner_id, prefix))
}
