mod common;

use std::collections::BTreeMap;

use engine::{Axis, AxisScores, EngineError, Progress, Quality, TaskStatus, Wallet};

use common::{ALICE, BOB, add_task, complete, engine};

#[tokio::test]
async fn tier_three_mid_completion_grants_table_reward() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 3, Axis::Focus).await;

    let outcome = engine
        .complete_task(complete(ALICE, &task, Quality::Mid))
        .await
        .unwrap();

    let reward = &outcome.reward;
    assert_eq!(reward.gold_delta, 50);
    assert_eq!(reward.diamond_delta, 0);
    assert_eq!(reward.exp_delta, 30);
    assert_eq!(reward.axis_delta, BTreeMap::from([(Axis::Focus, 4)]));
    assert!(!reward.levelup);
    assert_eq!(
        reward.new_progress,
        Progress {
            level: 1,
            experience: 30,
            experience_to_next: 100,
        }
    );
    assert_eq!(
        reward.new_wallet,
        Wallet {
            gold: 50,
            diamond: 0,
        }
    );
    assert_eq!(
        reward.new_axis_scores,
        AxisScores {
            focus: 4,
            ..AxisScores::default()
        }
    );

    let state = engine.user_state(ALICE).await.unwrap();
    assert_eq!(state.progress, reward.new_progress);
    assert_eq!(state.wallet, reward.new_wallet);
    assert_eq!(state.axis_scores, reward.new_axis_scores);
}

#[tokio::test]
async fn large_reward_levels_up() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 5, Axis::Body).await;

    let outcome = engine
        .complete_task(complete(ALICE, &task, Quality::High))
        .await
        .unwrap();

    // 180 experience: 100 to leave level 1, 80 carried over.
    assert!(outcome.reward.levelup);
    assert_eq!(outcome.reward.new_progress.level, 2);
    assert_eq!(outcome.reward.new_progress.experience, 80);
    assert_eq!(outcome.reward.new_progress.experience_to_next, 120);
    assert_eq!(outcome.reward.new_wallet.gold, 300);
}

#[tokio::test]
async fn repeated_key_returns_stored_outcome() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 2, Axis::Knowledge).await;
    let cmd = complete(ALICE, &task, Quality::High).idempotency_key("tap-1");

    let first = engine.complete_task(cmd.clone()).await.unwrap();
    let entries_after_first = engine.ledger_entries(ALICE).await.unwrap();
    let second = engine.complete_task(cmd).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        engine.ledger_entries(ALICE).await.unwrap(),
        entries_after_first
    );
    assert_eq!(
        engine.user_state(ALICE).await.unwrap().wallet,
        first.reward.new_wallet
    );
}

#[tokio::test]
async fn second_completion_without_key_is_rejected() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 1, Axis::Social).await;

    engine
        .complete_task(complete(ALICE, &task, Quality::Mid))
        .await
        .unwrap();
    let err = engine
        .complete_task(complete(ALICE, &task, Quality::Mid))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ALREADY_COMPLETED");
    assert_eq!(engine.user_state(ALICE).await.unwrap().wallet.gold, 10);
}

#[tokio::test]
async fn key_reused_for_another_task_is_rejected() {
    let engine = engine().await;
    let first = add_task(&engine, ALICE, 1, Axis::Focus).await;
    let second = add_task(&engine, ALICE, 1, Axis::Focus).await;

    engine
        .complete_task(complete(ALICE, &first, Quality::Mid).idempotency_key("same"))
        .await
        .unwrap();
    let err = engine
        .complete_task(complete(ALICE, &second, Quality::Mid).idempotency_key("same"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "IDEMPOTENCY_KEY_REUSED");
    let tasks = engine
        .materialize_plan(ALICE, common::monday())
        .await
        .unwrap()
        .items;
    let untouched = tasks.iter().find(|t| t.id == second.id).unwrap();
    assert_eq!(untouched.status, TaskStatus::Todo);
}

#[tokio::test]
async fn keys_are_scoped_per_user() {
    let engine = engine().await;
    let alice_task = add_task(&engine, ALICE, 1, Axis::Focus).await;
    let bob_task = add_task(&engine, BOB, 2, Axis::Focus).await;

    engine
        .complete_task(complete(ALICE, &alice_task, Quality::Mid).idempotency_key("k"))
        .await
        .unwrap();
    let bob = engine
        .complete_task(complete(BOB, &bob_task, Quality::Mid).idempotency_key("k"))
        .await
        .unwrap();

    assert_eq!(bob.reward.new_wallet.gold, 25);
}

#[tokio::test]
async fn concurrent_completions_reward_once() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 3, Axis::Organization).await;
    let cmd = complete(ALICE, &task, Quality::Mid);

    let (left, right) = tokio::join!(
        engine.complete_task(cmd.clone()),
        engine.complete_task(cmd)
    );

    let results = [left, right];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let err = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(err.code(), "ALREADY_COMPLETED");

    let state = engine.user_state(ALICE).await.unwrap();
    assert_eq!(state.wallet.gold, 50);
    assert_eq!(state.axis_scores.organization, 4);
}

#[tokio::test]
async fn terminal_items_reject_completion() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 1, Axis::Body).await;
    engine.skip_task(ALICE, task.id).await.unwrap();

    let err = engine
        .complete_task(complete(ALICE, &task, Quality::Mid))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "CONFLICT");
    assert_eq!(
        engine.user_state(ALICE).await.unwrap(),
        engine::UserState::default()
    );
}

#[tokio::test]
async fn completion_checks_ownership() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 1, Axis::Body).await;

    let err = engine
        .complete_task(complete(BOB, &task, Quality::Mid))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");

    let mut missing = complete(ALICE, &task, Quality::Mid);
    missing.task_id = uuid::Uuid::new_v4();
    let err = engine.complete_task(missing).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn negative_duration_is_invalid() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 1, Axis::Body).await;

    let err = engine
        .complete_task(complete(ALICE, &task, Quality::Mid).duration_minutes(-5))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidValue("duration_minutes must be >= 0".to_string())
    );
}
