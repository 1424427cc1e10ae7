//! Polling, selection, auth-refresh, and idempotence coverage.

use super::*;

#[tokio::test]
async fn functional_tick_skips_when_site_not_ready() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(revisions_body("processing"));
    });
    let comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(200).json_body(comments_body(Vec::new()));
    });

    let (mut runtime, creator) = test_runtime(&server, |_config| {});
    let outcome = runtime.poll_once().await.expect("poll");
    assert_eq!(
        outcome,
        TickOutcome::Skipped(SkipReason::SiteNotReady {
            state: "processing".to_string(),
        })
    );
    comments.assert_calls(0);
    assert_eq!(creator.calls(), 0);
}

#[tokio::test]
async fn unit_tick_skips_when_feed_is_empty() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(json!({"revisions": {"data": []}}));
    });

    let (mut runtime, _creator) = test_runtime(&server, |_config| {});
    let outcome = runtime.poll_once().await.expect("poll");
    assert_eq!(outcome, TickOutcome::Skipped(SkipReason::NoRevisions));
}

#[tokio::test]
async fn unit_tick_skips_when_no_comments_exist() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(revisions_body("done"));
    });
    let _comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(200).json_body(comments_body(Vec::new()));
    });

    let (mut runtime, _creator) = test_runtime(&server, |_config| {});
    let outcome = runtime.poll_once().await.expect("poll");
    assert_eq!(outcome, TickOutcome::Skipped(SkipReason::NoComments));
}

#[tokio::test]
async fn integration_selects_target_and_posts_confirmation_with_parent_id() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(revisions_body("done"));
    });
    let _comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(200).json_body(comments_body(vec![
            comment_entry("c-9", "rules of the thread", "owner", true, None),
            comment_entry("c-5", "hi", "alice", false, None),
        ]));
    });
    let pinned_replies = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/projects/proj-1/comments/c-9/replies");
        then.status(200).json_body(empty_replies_body());
    });
    let target_replies = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/projects/proj-1/comments/c-5/replies");
        then.status(200).json_body(empty_replies_body());
    });
    let confirmation_post = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/projects/proj-1/comments")
            .body_includes("[autorev] Created a new revision from your comment.")
            .body_includes("c-5");
        then.status(201).json_body(json!({"comment": {"id": "c-95"}}));
    });

    let (mut runtime, creator) = test_runtime(&server, |_config| {});
    let outcome = runtime.poll_once().await.expect("poll");
    assert_eq!(
        outcome,
        TickOutcome::Completed(TickAction::RevisionCreated {
            revision_id: "rev-1".to_string(),
            version: 7,
        })
    );
    // Pinned comments never trigger a reply check; the target is checked
    // once during the scan and once again before any write.
    pinned_replies.assert_calls(0);
    target_replies.assert_calls(2);
    confirmation_post.assert_calls(1);
    assert_eq!(creator.calls(), 1);
}

#[tokio::test]
async fn functional_scan_stops_at_first_replied_and_picks_last_candidate() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(revisions_body("done"));
    });
    // Platform order is newest first; c-3 already has an auto reply, so the
    // oldest unanswered comment is c-5.
    let _comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(200).json_body(comments_body(vec![
            comment_entry("c-7", "newest request", "bob", false, None),
            comment_entry("c-5", "older request", "alice", false, None),
            comment_entry("c-3", "handled request", "carol", false, None),
        ]));
    });
    let _replies_c7 = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/projects/proj-1/comments/c-7/replies");
        then.status(200).json_body(empty_replies_body());
    });
    let _replies_c5 = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/projects/proj-1/comments/c-5/replies");
        then.status(200).json_body(empty_replies_body());
    });
    let _replies_c3 = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/projects/proj-1/comments/c-3/replies");
        then.status(200).json_body(auto_replied_body());
    });
    let confirmation_post = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/projects/proj-1/comments")
            .body_includes("c-5");
        then.status(201).json_body(json!({"comment": {"id": "c-96"}}));
    });

    let (mut runtime, _creator) = test_runtime(&server, |_config| {});
    let outcome = runtime.poll_once().await.expect("poll");
    assert!(matches!(
        outcome,
        TickOutcome::Completed(TickAction::RevisionCreated { .. })
    ));
    confirmation_post.assert_calls(1);
}

#[tokio::test]
async fn regression_auth_expiry_aborts_before_writes_and_refreshes_cookies() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(401).json_body(jwt_expired_body());
    });
    let _refresh = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("set-cookie", "session=fresh-token; Path=/; HttpOnly");
    });
    let comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(200).json_body(comments_body(Vec::new()));
    });
    let reply_post = server.mock(|when, then| {
        when.method(POST).path("/api/v1/projects/proj-1/comments");
        then.status(201).json_body(json!({"comment": {"id": "c-97"}}));
    });

    let (mut runtime, _creator) = test_runtime(&server, |_config| {});
    let outcome = runtime.poll_once().await.expect("poll");
    assert_eq!(outcome, TickOutcome::AbortedAuthExpired);
    comments.assert_calls(0);
    reply_post.assert_calls(0);

    let snapshot = runtime.cookie_snapshot();
    assert_eq!(snapshot.version(), 1);
    assert!(snapshot.header_value().contains("session=fresh-token"));
}

#[tokio::test]
async fn regression_http_error_aborts_tick_without_retry() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(revisions_body("done"));
    });
    let comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(500).body("upstream exploded");
    });
    let reply_post = server.mock(|when, then| {
        when.method(POST).path("/api/v1/projects/proj-1/comments");
        then.status(201).json_body(json!({"comment": {"id": "c-98"}}));
    });

    let (mut runtime, _creator) = test_runtime(&server, |_config| {});
    let outcome = runtime.poll_once().await.expect("poll");
    assert_eq!(outcome, TickOutcome::AbortedHttpError { status: 500 });
    comments.assert_calls(1);
    reply_post.assert_calls(0);
}

#[tokio::test]
async fn integration_consecutive_ticks_are_idempotent() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(revisions_body("done"));
    });
    let _comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(200).json_body(comments_body(vec![comment_entry(
            "c-5", "hi", "alice", false, None,
        )]));
    });
    let mut unanswered_replies = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/projects/proj-1/comments/c-5/replies");
        then.status(200).json_body(empty_replies_body());
    });
    let confirmation_post = server.mock(|when, then| {
        when.method(POST).path("/api/v1/projects/proj-1/comments");
        then.status(201).json_body(json!({"comment": {"id": "c-99"}}));
    });

    let (mut runtime, creator) = test_runtime(&server, |_config| {});
    let first = runtime.poll_once().await.expect("first poll");
    assert!(matches!(
        first,
        TickOutcome::Completed(TickAction::RevisionCreated { .. })
    ));
    confirmation_post.assert_calls(1);

    // The confirmation is now part of the remote reply set.
    unanswered_replies.delete();
    let _answered_replies = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/projects/proj-1/comments/c-5/replies");
        then.status(200).json_body(auto_replied_body());
    });

    let second = runtime.poll_once().await.expect("second poll");
    assert_eq!(second, TickOutcome::Skipped(SkipReason::NoEligibleComment));
    confirmation_post.assert_calls(1);
    assert_eq!(creator.calls(), 1);
}

#[tokio::test]
async fn functional_one_shot_run_completes_after_single_tick() {
    let server = MockServer::start();
    let _revisions = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/revisions");
        then.status(200).json_body(revisions_body("done"));
    });
    let comments = server.mock(|when, then| {
        when.method(GET).path("/api/v1/projects/proj-1/comments");
        then.status(200).json_body(comments_body(Vec::new()));
    });

    let (mut runtime, _creator) = test_runtime(&server, |config| {
        config.poll_once = true;
    });
    runtime.run().await.expect("one-shot run");
    comments.assert_calls(1);
}
