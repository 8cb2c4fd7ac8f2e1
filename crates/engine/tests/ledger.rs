mod common;

use engine::{
    Axis, CosmeticSlot, Currency, LedgerRefKind, LedgerResource, NewShopItemCmd, PurchaseCmd,
    Quality,
};

use common::{ALICE, BOB, add_task, at, complete, engine};

#[tokio::test]
async fn completion_writes_one_entry_per_changed_resource() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 3, Axis::Focus).await;
    let outcome = engine
        .complete_task(complete(ALICE, &task, Quality::Mid))
        .await
        .unwrap();

    let entries = engine.ledger_entries(ALICE).await.unwrap();
    let resources: Vec<_> = entries.iter().map(|e| e.resource).collect();
    assert_eq!(
        resources,
        vec![
            LedgerResource::Currency {
                currency: Currency::Gold
            },
            LedgerResource::Experience,
            LedgerResource::Axis { axis: Axis::Focus },
        ]
    );
    assert!(entries.iter().all(|e| e.cause.kind == LedgerRefKind::Completion
        && e.cause.id == outcome.completion_id));
    assert!(entries.windows(2).all(|w| w[0].seq < w[1].seq));

    let experience = &entries[1];
    assert_eq!(experience.delta, 30);
    assert_eq!(experience.balance_after, 30);
    assert_eq!(experience.level_after, Some(1));
    assert_eq!(entries[0].balance_after, 50);
    assert_eq!(entries[2].balance_after, 4);
}

#[tokio::test]
async fn replaying_ledger_rebuilds_snapshots() {
    let engine = engine().await;
    for (tier, quality, axis) in [
        (5, Quality::High, Axis::Body),
        (3, Quality::Low, Axis::Focus),
        (4, Quality::Mid, Axis::Focus),
        (2, Quality::High, Axis::Social),
        (1, Quality::Mid, Axis::Discipline),
    ] {
        let task = add_task(&engine, ALICE, tier, axis).await;
        engine
            .complete_task(complete(ALICE, &task, quality))
            .await
            .unwrap();
    }
    let robe = engine
        .new_shop_item(NewShopItemCmd::new(
            "Robe",
            CosmeticSlot::Body,
            Currency::Gold,
            120,
        ))
        .await
        .unwrap();
    engine
        .purchase_item(PurchaseCmd::new(ALICE, robe.id, at(2024, 1, 1, 20)))
        .await
        .unwrap();

    let state = engine.user_state(ALICE).await.unwrap();
    assert_eq!(engine.replay_ledger(ALICE).await.unwrap(), state);
    assert!(state.progress.level > 1);
    // 300 + 25 + 100 + 37 + 10 - 120
    assert_eq!(state.wallet.gold, 352);

    let last = engine.ledger_entries(ALICE).await.unwrap().pop().unwrap();
    assert_eq!(last.cause.kind, LedgerRefKind::Purchase);
    assert_eq!(last.delta, -120);
    assert_eq!(last.balance_after, 352);
}

#[tokio::test]
async fn ledgers_are_per_user() {
    let engine = engine().await;
    let task = add_task(&engine, ALICE, 2, Axis::Knowledge).await;
    engine
        .complete_task(complete(ALICE, &task, Quality::Mid))
        .await
        .unwrap();

    assert!(engine.ledger_entries(BOB).await.unwrap().is_empty());
    assert_eq!(
        engine.replay_ledger(BOB).await.unwrap(),
        engine.user_state(BOB).await.unwrap()
    );
}
