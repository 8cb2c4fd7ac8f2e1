mod common;

use engine::{
    Axis, NewSeriesCmd, NewTaskCmd, Quality, RuleParams, RuleType, TaskOrigin, TaskStatus,
    UpdateSeriesCmd, UpdateTaskCmd,
};

use common::{ALICE, BOB, add_task, at, complete, date, engine, monday};

fn weekly(days: &[&str]) -> NewSeriesCmd {
    NewSeriesCmd::new(ALICE, "Gym", Axis::Body, RuleType::Weekly, monday())
        .tier(2)
        .estimated_minutes(45)
        .selected_days(days.iter().copied())
}

#[tokio::test]
async fn weekly_series_materializes_on_selected_days_only() {
    let engine = engine().await;
    let series = engine.create_series(weekly(&["MON", "WED"])).await.unwrap();

    let wednesday = engine
        .materialize_plan(ALICE, date(2024, 1, 3))
        .await
        .unwrap();
    assert_eq!(wednesday.items.len(), 1);
    let item = &wednesday.items[0];
    assert_eq!(item.series_id, Some(series.id));
    assert_eq!(item.origin, TaskOrigin::Template);
    assert_eq!(item.title, "Gym");
    assert_eq!(item.tier, 2);
    assert_eq!(item.estimated_minutes, 45);
    assert_eq!(item.status, TaskStatus::Todo);

    let tuesday = engine
        .materialize_plan(ALICE, date(2024, 1, 2))
        .await
        .unwrap();
    assert!(tuesday.items.is_empty());
}

#[tokio::test]
async fn materialization_is_idempotent() {
    let engine = engine().await;
    engine
        .create_series(NewSeriesCmd::new(
            ALICE,
            "Read",
            Axis::Knowledge,
            RuleType::Daily,
            monday(),
        ))
        .await
        .unwrap();
    engine
        .create_series(NewSeriesCmd::new(
            ALICE,
            "Plan week",
            Axis::Organization,
            RuleType::Weekdays,
            monday(),
        ))
        .await
        .unwrap();

    let first = engine.materialize_plan(ALICE, monday()).await.unwrap();
    let second = engine.materialize_plan(ALICE, monday()).await.unwrap();

    assert_eq!(first.items.len(), 2);
    assert_eq!(first, second);
    let orders: Vec<_> = first.items.iter().map(|i| i.sort_order).collect();
    assert_eq!(orders, vec![0, 1]);
}

#[tokio::test]
async fn materialization_skips_inactive_and_future_series() {
    let engine = engine().await;
    engine
        .create_series(
            NewSeriesCmd::new(ALICE, "Paused", Axis::Focus, RuleType::Daily, monday()).inactive(),
        )
        .await
        .unwrap();
    engine
        .create_series(NewSeriesCmd::new(
            ALICE,
            "Later",
            Axis::Focus,
            RuleType::Daily,
            date(2024, 2, 1),
        ))
        .await
        .unwrap();
    engine
        .create_series(NewSeriesCmd::new(
            ALICE,
            "Weekdays",
            Axis::Focus,
            RuleType::Weekdays,
            monday(),
        ))
        .await
        .unwrap();

    let saturday = engine
        .materialize_plan(ALICE, date(2024, 1, 6))
        .await
        .unwrap();
    assert!(saturday.items.is_empty());

    let friday = engine
        .materialize_plan(ALICE, date(2024, 1, 5))
        .await
        .unwrap();
    let titles: Vec<_> = friday.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Weekdays"]);
}

#[tokio::test]
async fn plans_are_per_user() {
    let engine = engine().await;
    engine.create_series(weekly(&["MON"])).await.unwrap();

    let bob = engine.materialize_plan(BOB, monday()).await.unwrap();
    let alice = engine.materialize_plan(ALICE, monday()).await.unwrap();

    assert!(bob.items.is_empty());
    assert_eq!(alice.items.len(), 1);
    assert_ne!(alice.plan_id, bob.plan_id);
}

#[tokio::test]
async fn manual_items_append_to_plan() {
    let engine = engine().await;
    engine.create_series(weekly(&["MON"])).await.unwrap();
    engine.materialize_plan(ALICE, monday()).await.unwrap();

    let manual = engine
        .add_task(
            NewTaskCmd::new(ALICE, monday(), "  Call mom ", Axis::Social)
                .description("weekly call")
                .estimated_minutes(30),
        )
        .await
        .unwrap();

    assert_eq!(manual.title, "Call mom");
    assert_eq!(manual.origin, TaskOrigin::Manual);
    assert_eq!(manual.tier, 1);
    assert_eq!(manual.sort_order, 1);
    assert_eq!(manual.description.as_deref(), Some("weekly call"));

    let plan = engine.materialize_plan(ALICE, monday()).await.unwrap();
    assert_eq!(plan.items.len(), 2);
    assert_eq!(plan.items[1].id, manual.id);
}

#[tokio::test]
async fn invalid_manual_items_are_rejected() {
    let engine = engine().await;

    let err = engine
        .add_task(NewTaskCmd::new(ALICE, monday(), "   ", Axis::Body))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = engine
        .add_task(NewTaskCmd::new(ALICE, monday(), "Lift", Axis::Body).tier(6))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_changes_presentation_fields() {
    let engine = engine().await;
    let task = engine
        .add_task(
            NewTaskCmd::new(ALICE, monday(), "Run", Axis::Body).scheduled_at(at(2024, 1, 1, 7)),
        )
        .await
        .unwrap();

    let updated = engine
        .update_task(UpdateTaskCmd {
            title: Some("Run 5k".to_string()),
            tier: Some(3),
            scheduled_at: Some(None),
            ..UpdateTaskCmd::new(ALICE, task.id)
        })
        .await
        .unwrap();

    assert_eq!(updated.title, "Run 5k");
    assert_eq!(updated.tier, 3);
    assert_eq!(updated.scheduled_at, None);
    assert_eq!(updated.axis, Axis::Body);

    let err = engine
        .update_task(UpdateTaskCmd::new(BOB, task.id))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = engine
        .update_task(UpdateTaskCmd {
            tier: Some(2),
            ..UpdateTaskCmd::new(BOB, task.id)
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");
}

#[tokio::test]
async fn editing_a_template_item_leaves_its_series_alone() {
    let engine = engine().await;
    engine
        .create_series(NewSeriesCmd::new(
            ALICE,
            "Read",
            Axis::Knowledge,
            RuleType::Daily,
            monday(),
        ))
        .await
        .unwrap();
    let today = engine.materialize_plan(ALICE, monday()).await.unwrap();

    engine
        .update_task(UpdateTaskCmd {
            title: Some("Read two chapters".to_string()),
            tier: Some(4),
            ..UpdateTaskCmd::new(ALICE, today.items[0].id)
        })
        .await
        .unwrap();

    let tomorrow = engine
        .materialize_plan(ALICE, date(2024, 1, 2))
        .await
        .unwrap();
    assert_eq!(tomorrow.items[0].title, "Read");
    assert_eq!(tomorrow.items[0].tier, 1);
    let series = engine.list_series(ALICE).await.unwrap();
    assert_eq!(series[0].title, "Read");
}

#[tokio::test]
async fn skip_and_delete_follow_lifecycle() {
    let engine = engine().await;
    let skipped = add_task(&engine, ALICE, 1, Axis::Focus).await;
    let done = add_task(&engine, ALICE, 1, Axis::Focus).await;
    let removed = add_task(&engine, ALICE, 1, Axis::Focus).await;

    let item = engine.skip_task(ALICE, skipped.id).await.unwrap();
    assert_eq!(item.status, TaskStatus::Skipped);
    assert_eq!(
        engine.skip_task(ALICE, skipped.id).await.unwrap_err().code(),
        "CONFLICT"
    );
    assert_eq!(
        engine
            .delete_task(ALICE, skipped.id)
            .await
            .unwrap_err()
            .code(),
        "CONFLICT"
    );

    engine
        .complete_task(complete(ALICE, &done, Quality::Low))
        .await
        .unwrap();
    assert_eq!(
        engine.skip_task(ALICE, done.id).await.unwrap_err().code(),
        "CANNOT_SKIP_COMPLETED"
    );
    assert_eq!(
        engine.delete_task(ALICE, done.id).await.unwrap_err().code(),
        "CANNOT_DELETE_COMPLETED"
    );

    engine.delete_task(ALICE, removed.id).await.unwrap();
    assert_eq!(
        engine
            .delete_task(ALICE, removed.id)
            .await
            .unwrap_err()
            .code(),
        "NOT_FOUND"
    );

    let plan = engine.materialize_plan(ALICE, monday()).await.unwrap();
    let statuses: Vec<_> = plan.items.iter().map(|i| i.status).collect();
    assert_eq!(statuses, vec![TaskStatus::Skipped, TaskStatus::Done]);
}

#[tokio::test]
async fn today_combines_plan_and_snapshots() {
    let engine = engine().await;
    engine.create_series(weekly(&["MON"])).await.unwrap();

    let view = engine.today(ALICE, monday()).await.unwrap();
    assert_eq!(view.plan.items.len(), 1);
    assert_eq!(view.state, engine::UserState::default());

    let task = view.plan.items[0].clone();
    engine
        .complete_task(complete(ALICE, &task, Quality::Mid))
        .await
        .unwrap();

    let view = engine.today(ALICE, monday()).await.unwrap();
    assert_eq!(view.plan.items[0].status, TaskStatus::Done);
    assert_eq!(view.state.wallet.gold, 25);
    assert_eq!(view.state.axis_scores.body, 2);
}

#[tokio::test]
async fn series_crud_is_scoped_to_owner() {
    let engine = engine().await;
    let gym = engine.create_series(weekly(&["mon", "Friday"])).await.unwrap();
    assert_eq!(gym.rule_params.selected_days, vec!["MON", "FRI"]);

    let read = engine
        .create_series(NewSeriesCmd::new(
            ALICE,
            "Read",
            Axis::Knowledge,
            RuleType::Daily,
            monday(),
        ))
        .await
        .unwrap();

    let listed: Vec<_> = engine
        .list_series(ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(listed, vec![read.id, gym.id]);
    assert!(engine.list_series(BOB).await.unwrap().is_empty());

    let updated = engine
        .update_series(UpdateSeriesCmd {
            title: Some("Gym (heavy)".to_string()),
            rule_type: Some(RuleType::NPerWeek),
            rule_params: Some(RuleParams {
                selected_days: Vec::new(),
                n_per_week: Some(3),
            }),
            ..UpdateSeriesCmd::new(ALICE, gym.id)
        })
        .await
        .unwrap();
    assert_eq!(updated.title, "Gym (heavy)");
    assert_eq!(updated.rule_type, RuleType::NPerWeek);
    assert_eq!(updated.tier_default, 2);

    let err = engine
        .update_series(UpdateSeriesCmd {
            active: Some(false),
            ..UpdateSeriesCmd::new(BOB, gym.id)
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(
        engine.delete_series(BOB, gym.id).await.unwrap_err().code(),
        "NOT_FOUND"
    );

    engine.delete_series(ALICE, gym.id).await.unwrap();
    let remaining: Vec<_> = engine
        .list_series(ALICE)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(remaining, vec![read.id]);
}

#[tokio::test]
async fn deleting_series_keeps_materialized_items() {
    let engine = engine().await;
    let series = engine.create_series(weekly(&["MON"])).await.unwrap();
    let plan = engine.materialize_plan(ALICE, monday()).await.unwrap();

    engine.delete_series(ALICE, series.id).await.unwrap();

    let after = engine.materialize_plan(ALICE, monday()).await.unwrap();
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.items[0].id, plan.items[0].id);
}

#[tokio::test]
async fn series_batch_is_all_or_nothing() {
    let engine = engine().await;
    let valid = weekly(&["TUE"]);
    let invalid = weekly(&["NOPE"]);

    let err = engine
        .create_series_batch(vec![valid.clone(), invalid])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(engine.list_series(ALICE).await.unwrap().is_empty());

    let created = engine
        .create_series_batch(vec![valid, weekly(&["THU"])])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(engine.list_series(ALICE).await.unwrap().len(), 2);
}
