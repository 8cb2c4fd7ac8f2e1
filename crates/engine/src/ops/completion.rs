use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    CompleteTaskCmd, CompletionOutcome, EngineError, LedgerRef, ResultEngine, RewardView,
    TaskTransition, calculate_rewards, completion_events, idempotency::IdempotentOperation,
    reward_events,
};

use super::{
    Engine,
    idempotency::{normalize_key, record_outcome, replay_outcome},
    snapshots::{SnapshotDeltas, commit_deltas, transition_task},
    with_tx,
};

impl Engine {
    /// Complete a `todo` quest and grant its reward.
    ///
    /// In one transaction: the item moves to `done`, a completion event and
    /// its reward event are written, snapshots are updated and ledger entries
    /// appended. With an idempotency key, a repeated call returns the stored
    /// outcome of the first one and writes nothing.
    pub async fn complete_task(&self, cmd: CompleteTaskCmd) -> ResultEngine<CompletionOutcome> {
        if cmd.duration_minutes < 0 {
            return Err(EngineError::InvalidValue(
                "duration_minutes must be >= 0".to_string(),
            ));
        }
        let key = normalize_key(cmd.idempotency_key.as_deref())?;
        with_tx!(self, |db_tx| {
            self.complete_in_tx(&db_tx, &cmd, key.as_deref()).await
        })
    }

    async fn complete_in_tx(
        &self,
        db: &DatabaseTransaction,
        cmd: &CompleteTaskCmd,
        key: Option<&str>,
    ) -> ResultEngine<CompletionOutcome> {
        if let Some(outcome) = replay_outcome(
            db,
            &cmd.user_id,
            key,
            IdempotentOperation::CompleteTask,
            cmd.task_id,
        )
        .await?
        {
            return Ok(outcome);
        }

        let (item, plan) = self.require_task(db, &cmd.user_id, cmd.task_id).await?;
        transition_task(db, &item, TaskTransition::Complete).await?;

        let reward = calculate_rewards(item.tier, cmd.quality, item.axis);
        let completion_id = Uuid::new_v4();
        let committed = commit_deltas(
            db,
            &cmd.user_id,
            LedgerRef::completion(completion_id),
            &SnapshotDeltas::from(&reward),
            cmd.completed_at,
        )
        .await?;

        completion_events::ActiveModel {
            id: ActiveValue::Set(completion_id.to_string()),
            user_id: ActiveValue::Set(cmd.user_id.clone()),
            plan_item_id: ActiveValue::Set(item.id.to_string()),
            plan_date: ActiveValue::Set(plan.date),
            completed_at: ActiveValue::Set(cmd.completed_at),
            duration_minutes: ActiveValue::Set(cmd.duration_minutes),
            quality: ActiveValue::Set(cmd.quality.as_str().to_string()),
            client_source: ActiveValue::Set(cmd.client_source.as_str().to_string()),
        }
        .insert(db)
        .await?;

        reward_events::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            user_id: ActiveValue::Set(cmd.user_id.clone()),
            completion_event_id: ActiveValue::Set(completion_id.to_string()),
            gold_delta: ActiveValue::Set(reward.gold),
            diamond_delta: ActiveValue::Set(reward.diamond),
            experience_delta: ActiveValue::Set(reward.experience),
            axis_delta: ActiveValue::Set(serde_json::to_string(&reward.axis)?),
            leveled_up: ActiveValue::Set(committed.leveled_up),
            created_at: ActiveValue::Set(cmd.completed_at),
        }
        .insert(db)
        .await?;

        let outcome = CompletionOutcome {
            completion_id,
            completed_at: cmd.completed_at,
            reward: RewardView {
                gold_delta: reward.gold,
                diamond_delta: reward.diamond,
                exp_delta: reward.experience,
                axis_delta: reward.axis,
                levelup: committed.leveled_up,
                new_progress: committed.state.progress,
                new_wallet: committed.state.wallet,
                new_axis_scores: committed.state.axis_scores,
            },
        };
        record_outcome(
            db,
            &cmd.user_id,
            key,
            IdempotentOperation::CompleteTask,
            cmd.task_id,
            completion_id,
            &outcome,
            cmd.completed_at,
        )
        .await?;

        info!(
            user_id = %cmd.user_id,
            task_id = %cmd.task_id,
            %completion_id,
            gold = outcome.reward.gold_delta,
            exp = outcome.reward.exp_delta,
            levelup = outcome.reward.levelup,
            "quest completed"
        );
        Ok(outcome)
    }
}
