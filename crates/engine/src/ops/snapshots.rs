//! Snapshot and ledger writer.
//!
//! Every balance-changing operation funnels through [`commit_deltas`]: it
//! reads the user's snapshots, applies the deltas, upserts the snapshots it
//! touched and appends one ledger entry per changed resource. It only takes a
//! [`DatabaseTransaction`], so it can never run outside the caller's unit of
//! work.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr, sea_query::OnConflict,
};

use crate::{
    Axis, AxisScores, Currency, EngineError, LedgerEntry, LedgerRef, LedgerResource, Progress,
    ResultEngine, RewardDeltas, TaskInstance, TaskStatus, TaskTransition, UserState, Wallet, axis,
    ledger, plan_items, progress, wallets,
};

/// Signed changes to a user's aggregates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct SnapshotDeltas {
    pub currency: BTreeMap<Currency, i64>,
    pub experience: i64,
    pub axis: BTreeMap<Axis, i64>,
}

impl SnapshotDeltas {
    pub(super) fn debit(currency: Currency, amount: i64) -> Self {
        Self {
            currency: BTreeMap::from([(currency, -amount)]),
            ..Self::default()
        }
    }
}

impl From<&RewardDeltas> for SnapshotDeltas {
    fn from(reward: &RewardDeltas) -> Self {
        Self {
            currency: BTreeMap::from([
                (Currency::Gold, reward.gold),
                (Currency::Diamond, reward.diamond),
            ]),
            experience: reward.experience,
            axis: reward.axis.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Committed {
    pub state: UserState,
    pub leveled_up: bool,
}

pub(super) async fn load_snapshots(
    db: &DatabaseTransaction,
    user_id: &str,
) -> ResultEngine<UserState> {
    let axis_scores = axis::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .map(AxisScores::from)
        .unwrap_or_default();
    let progress = progress::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .map(Progress::from)
        .unwrap_or_default();
    let wallet = wallets::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .map(Wallet::from)
        .unwrap_or_default();
    Ok(UserState {
        axis_scores,
        progress,
        wallet,
    })
}

/// Apply `deltas` to the user's snapshots and append the matching ledger
/// entries. Fails with `INSUFFICIENT_FUNDS` before writing anything when a
/// balance would go negative.
pub(super) async fn commit_deltas(
    db: &DatabaseTransaction,
    user_id: &str,
    cause: LedgerRef,
    deltas: &SnapshotDeltas,
    at: DateTime<Utc>,
) -> ResultEngine<Committed> {
    let mut state = load_snapshots(db, user_id).await?;
    let mut entries = Vec::new();

    let mut wallet_touched = false;
    for (&currency, &delta) in deltas.currency.iter().filter(|(_, delta)| **delta != 0) {
        state.wallet = state.wallet.apply(currency, delta)?;
        wallet_touched = true;
        entries.push(LedgerEntry::new(
            user_id,
            cause,
            LedgerResource::Currency { currency },
            delta,
            state.wallet.balance(currency),
            at,
        ));
    }

    let mut leveled_up = false;
    if deltas.experience != 0 {
        let outcome = state.progress.gain(deltas.experience);
        leveled_up = outcome.leveled_up;
        state.progress = Progress::from(outcome);
        entries.push(
            LedgerEntry::new(
                user_id,
                cause,
                LedgerResource::Experience,
                deltas.experience,
                state.progress.experience,
                at,
            )
            .level_after(state.progress.level),
        );
    }

    let mut axis_touched = false;
    for (&axis, &delta) in deltas.axis.iter().filter(|(_, delta)| **delta != 0) {
        state.axis_scores.add(axis, delta);
        axis_touched = true;
        entries.push(LedgerEntry::new(
            user_id,
            cause,
            LedgerResource::Axis { axis },
            delta,
            state.axis_scores.get(axis),
            at,
        ));
    }

    if wallet_touched {
        wallets::Entity::insert(wallets::active_model(user_id, &state.wallet, at))
            .on_conflict(
                OnConflict::column(wallets::Column::UserId)
                    .update_columns([
                        wallets::Column::Gold,
                        wallets::Column::Diamond,
                        wallets::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }
    if deltas.experience != 0 {
        progress::Entity::insert(progress::active_model(user_id, &state.progress, at))
            .on_conflict(
                OnConflict::column(progress::Column::UserId)
                    .update_columns([
                        progress::Column::Level,
                        progress::Column::Experience,
                        progress::Column::ExperienceToNext,
                        progress::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }
    if axis_touched {
        axis::Entity::insert(axis::active_model(user_id, &state.axis_scores, at))
            .on_conflict(
                OnConflict::column(axis::Column::UserId)
                    .update_columns([
                        axis::Column::Body,
                        axis::Column::Focus,
                        axis::Column::Knowledge,
                        axis::Column::Discipline,
                        axis::Column::Organization,
                        axis::Column::Social,
                        axis::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    for entry in &entries {
        ledger::Entity::insert(ledger::ActiveModel::from(entry))
            .exec(db)
            .await?;
    }

    Ok(Committed { state, leveled_up })
}

/// Move a plan item out of `todo`.
///
/// The write is conditional on the stored status still being `todo`, so of two
/// concurrent callers only one succeeds; the other gets the error for the
/// status it lost to. Returns the new status, or `None` when the item was
/// deleted.
pub(super) async fn transition_task(
    db: &DatabaseTransaction,
    item: &TaskInstance,
    transition: TaskTransition,
) -> ResultEngine<Option<TaskStatus>> {
    let target = item.status.transition(transition)?;
    let id = item.id.to_string();

    let rows_affected = match target {
        Some(status) => {
            plan_items::Entity::update_many()
                .col_expr(plan_items::Column::Status, Expr::value(status.as_str()))
                .col_expr(plan_items::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(plan_items::Column::Id.eq(id.clone()))
                .filter(plan_items::Column::Status.eq(TaskStatus::Todo.as_str()))
                .exec(db)
                .await?
                .rows_affected
        }
        None => {
            plan_items::Entity::delete_many()
                .filter(plan_items::Column::Id.eq(id.clone()))
                .filter(plan_items::Column::Status.eq(TaskStatus::Todo.as_str()))
                .exec(db)
                .await?
                .rows_affected
        }
    };
    if rows_affected == 1 {
        return Ok(target);
    }

    let current = plan_items::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("plan item not exists".to_string()))?;
    TaskStatus::try_from(current.status.as_str())?.transition(transition)?;
    Err(EngineError::Conflict(
        "plan item changed concurrently".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Quality, calculate_rewards};

    #[test]
    fn reward_deltas_become_snapshot_deltas() {
        let reward = calculate_rewards(3, Quality::Mid, Axis::Focus);
        let deltas = SnapshotDeltas::from(&reward);
        assert_eq!(deltas.currency[&Currency::Gold], 50);
        assert_eq!(deltas.currency[&Currency::Diamond], 0);
        assert_eq!(deltas.experience, 30);
        assert_eq!(deltas.axis, BTreeMap::from([(Axis::Focus, 4)]));
    }

    #[test]
    fn debit_is_negative() {
        let deltas = SnapshotDeltas::debit(Currency::Diamond, 5);
        assert_eq!(deltas.currency, BTreeMap::from([(Currency::Diamond, -5)]));
        assert_eq!(deltas.experience, 0);
        assert!(deltas.axis.is_empty());
    }
}
