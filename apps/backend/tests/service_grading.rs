//! Quiz grading service tests.

mod common;

use pretty_assertions::assert_eq;

use common::fixtures;
use common::TestContext;
use vocab_backend::config::ServiceConfig;
use vocab_backend::models::{NewItem, UpdateSetRequest};
use vocab_backend::services::{grading, sets};
use vocab_core::GradingPolicy;

/// One correct pinyin answer and one wrong meaning answer on a fresh set.
#[tokio::test]
async fn test_first_submission() {
    let ctx = TestContext::new().await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;

    let request = fixtures::submission(
        set.id,
        vec![
            fixtures::pinyin("cat", "mao1", "māo"),
            fixtures::meaning("dog", "Dog", "dog"),
        ],
    );
    let response = grading::submit_quiz(&ctx.state, learner.id, request, ctx.now)
        .await
        .unwrap();

    assert_eq!(response.summary.score, 1);
    assert_eq!(response.summary.total, 2);
    assert_eq!(response.progress.experience_points, 10);
    assert_eq!(response.progress.current_streak, 1);
    assert_eq!(response.progress.last_studied_date, Some(ctx.today()));
    assert!(response.outcomes[0].is_correct);
    assert!(!response.outcomes[1].is_correct);

    let stored = ctx.set(set.id).await;
    let cat = stored.set.item("cat").unwrap();
    assert_eq!(cat.srs.srs_level, 1);
    assert_eq!(cat.srs.interval_days, 1);
    assert_eq!(cat.srs.next_review_date, ctx.today().succ_opt().unwrap());
    let dog = stored.set.item("dog").unwrap();
    assert_eq!(dog.srs.srs_level, 0);
    assert_eq!(dog.srs.interval_days, 0);
    assert_eq!(stored.version, 2);
    assert_eq!(response.set_version, 2);

    let learner = ctx.learner(learner.id).await;
    assert_eq!(learner.progress, response.progress);
    assert_eq!(learner.version, 2);
}

/// Studying on consecutive days builds a streak; a gap resets it.
#[tokio::test]
async fn test_streak_across_days() {
    let mut ctx = TestContext::new().await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;
    let questions = vec![fixtures::meaning("horse", "horse", "horse")];

    for _ in 0..3 {
        grading::submit_quiz(
            &ctx.state,
            learner.id,
            fixtures::submission(set.id, questions.clone()),
            ctx.now,
        )
        .await
        .unwrap();
        ctx.advance_days(1);
    }

    let progress = ctx.learner(learner.id).await.progress;
    assert_eq!(progress.current_streak, 3);
    assert_eq!(progress.longest_streak, 3);
    assert_eq!(progress.experience_points, 30);

    ctx.advance_days(2);
    let response = grading::submit_quiz(
        &ctx.state,
        learner.id,
        fixtures::submission(set.id, vec![fixtures::meaning("horse", "pony", "horse")]),
        ctx.now,
    )
    .await
    .unwrap();
    assert_eq!(response.progress.current_streak, 1);
    assert_eq!(response.progress.longest_streak, 3);
    assert_eq!(response.progress.experience_points, 30);
}

/// Questions about items no longer in the set still score but schedule nothing.
#[tokio::test]
async fn test_unknown_item_is_skipped() {
    let ctx = TestContext::new().await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;

    let response = grading::submit_quiz(
        &ctx.state,
        learner.id,
        fixtures::submission(set.id, vec![fixtures::meaning("bird", "bird", "bird")]),
        ctx.now,
    )
    .await
    .unwrap();

    assert!(response.outcomes[0].is_correct);
    assert_eq!(response.progress.experience_points, 10);
    assert_eq!(response.set_version, 1);
    assert_eq!(ctx.set(set.id).await.set, set.set);
}

/// Grading invalidates the cached set listing when items changed.
#[tokio::test]
async fn test_grading_invalidates_listing() {
    let ctx = TestContext::new().await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;

    let before = sets::list_sets(&ctx.state, learner.id, ctx.today()).await.unwrap();
    assert_eq!(before[0].due_count, 3);
    assert!(ctx.state.cache.get(learner.id).is_some());

    grading::submit_quiz(
        &ctx.state,
        learner.id,
        fixtures::submission(set.id, vec![fixtures::pinyin("cat", "mao1", "māo")]),
        ctx.now,
    )
    .await
    .unwrap();
    assert!(ctx.state.cache.get(learner.id).is_none());

    let after = sets::list_sets(&ctx.state, learner.id, ctx.today()).await.unwrap();
    assert_eq!(after[0].due_count, 2);
    assert_eq!(after[0].version, 2);
}

/// A quiz built from an old set version is refused.
#[tokio::test]
async fn test_stale_set_version_conflicts() {
    let ctx = TestContext::new().await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;

    let questions = vec![fixtures::pinyin("cat", "mao1", "māo")];
    let mut request = fixtures::submission(set.id, questions.clone());
    request.set_version = Some(1);
    grading::submit_quiz(&ctx.state, learner.id, request, ctx.now)
        .await
        .unwrap();

    let mut stale = fixtures::submission(set.id, questions);
    stale.set_version = Some(1);
    let error = grading::submit_quiz(&ctx.state, learner.id, stale, ctx.now)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), "conflict");

    let progress = ctx.learner(learner.id).await.progress;
    assert_eq!(progress.experience_points, 10);
}

/// Missing set id or empty question list is rejected before grading.
#[tokio::test]
async fn test_missing_fields() {
    let ctx = TestContext::new().await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;

    let mut request = fixtures::submission(set.id, vec![fixtures::meaning("cat", "cat", "cat")]);
    request.set_id = None;
    let error = grading::submit_quiz(&ctx.state, learner.id, request, ctx.now)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), "bad_request");

    let error = grading::submit_quiz(
        &ctx.state,
        learner.id,
        fixtures::submission(set.id, vec![]),
        ctx.now,
    )
    .await
    .unwrap_err();
    assert_eq!(error.kind(), "bad_request");
}

/// Learners cannot grade against someone else's set.
#[tokio::test]
async fn test_foreign_set_unauthorized() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_learner("mei").await;
    let other = ctx.create_learner("li").await;
    let set = ctx.create_animal_set(owner.id, false).await;

    let error = grading::submit_quiz(
        &ctx.state,
        other.id,
        fixtures::submission(set.id, vec![fixtures::meaning("cat", "cat", "cat")]),
        ctx.now,
    )
    .await
    .unwrap_err();
    assert_eq!(error.kind(), "unauthorized");
}

/// Configured XP and interval table flow through to grading.
#[tokio::test]
async fn test_custom_policy() {
    let config = ServiceConfig {
        policy: GradingPolicy::new(25, vec![0, 2, 5]).unwrap(),
        ..ServiceConfig::default()
    };
    let ctx = TestContext::with_config(config).await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;

    let response = grading::submit_quiz(
        &ctx.state,
        learner.id,
        fixtures::submission(
            set.id,
            vec![
                fixtures::meaning("cat", "cat", "cat"),
                fixtures::meaning("cat", "cat", "cat"),
            ],
        ),
        ctx.now,
    )
    .await
    .unwrap();

    assert_eq!(response.summary.xp_earned, 50);
    let cat = ctx.set(set.id).await.set.item("cat").unwrap().clone();
    assert_eq!(cat.srs.srs_level, 2);
    assert_eq!(cat.srs.interval_days, 5);
}

/// A set edited after the quiz was generated: removed items are skipped,
/// and pinning the old version refuses the submission instead.
#[tokio::test]
async fn test_set_edited_during_quiz() {
    let ctx = TestContext::new().await;
    let learner = ctx.create_learner("mei").await;
    let set = ctx.create_animal_set(learner.id, false).await;
    let questions = vec![
        fixtures::pinyin("cat", "mao1", "māo"),
        fixtures::pinyin("dog", "gou3", "gǒu"),
    ];

    let only_cat = UpdateSetRequest {
        items: Some(vec![NewItem {
            item_id: "cat".to_string(),
            script: "猫".to_string(),
            romanization: "māo".to_string(),
            meaning: "cat".to_string(),
            example: None,
        }]),
        ..UpdateSetRequest::default()
    };
    sets::update_set(&ctx.state, learner.id, set.id, only_cat, ctx.now)
        .await
        .unwrap();

    let mut pinned = fixtures::submission(set.id, questions.clone());
    pinned.set_version = Some(set.version);
    let error = grading::submit_quiz(&ctx.state, learner.id, pinned, ctx.now)
        .await
        .unwrap_err();
    assert_eq!(error.kind(), "conflict");
    assert_eq!(ctx.learner(learner.id).await.progress.experience_points, 0);

    let response = grading::submit_quiz(
        &ctx.state,
        learner.id,
        fixtures::submission(set.id, questions),
        ctx.now,
    )
    .await
    .unwrap();
    assert_eq!(response.summary.score, 2);
    assert_eq!(response.progress.experience_points, 20);

    let stored = ctx.set(set.id).await;
    assert_eq!(stored.set.items.len(), 1);
    assert_eq!(stored.set.item("cat").unwrap().srs.srs_level, 1);
    assert!(stored.set.item("dog").is_none());
}
