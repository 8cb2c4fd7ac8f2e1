use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    EngineError, NewTaskCmd, PlanView, ResultEngine, Series, TaskInstance, TaskOrigin, TaskStatus,
    TaskTransition, TodayView, UpdateTaskCmd, plan_items, plans, series,
    util::{normalize_optional_text, normalize_title, validate_minutes, validate_tier},
};

use super::{
    Engine,
    snapshots::{load_snapshots, transition_task},
    with_tx,
};

const DEFAULT_TIER: i32 = 1;
const DEFAULT_MINUTES: i32 = 15;

impl Engine {
    /// Return the plan for `date`, creating it and expanding the user's
    /// series into it on first access.
    pub async fn materialize_plan(&self, user_id: &str, date: NaiveDate) -> ResultEngine<PlanView> {
        with_tx!(self, |db_tx| {
            self.materialize_in_tx(&db_tx, user_id, date).await
        })
    }

    /// The materialized plan of `date` plus the user's current snapshots.
    pub async fn today(&self, user_id: &str, date: NaiveDate) -> ResultEngine<TodayView> {
        with_tx!(self, |db_tx| {
            let plan = self.materialize_in_tx(&db_tx, user_id, date).await?;
            let state = load_snapshots(&db_tx, user_id).await?;
            Ok::<_, EngineError>(TodayView { plan, state })
        })
    }

    async fn materialize_in_tx(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        date: NaiveDate,
    ) -> ResultEngine<PlanView> {
        let plan = get_or_create_plan(db, user_id, date).await?;

        let has_items = plan_items::Entity::find()
            .filter(plan_items::Column::PlanId.eq(plan.id.clone()))
            .one(db)
            .await?
            .is_some();
        if !has_items {
            let candidates = series::Entity::find()
                .filter(series::Column::UserId.eq(user_id.to_string()))
                .filter(series::Column::Active.eq(true))
                .filter(series::Column::StartDate.lte(date))
                .order_by_asc(series::Column::CreatedAt)
                .order_by_asc(series::Column::Id)
                .all(db)
                .await?;

            let plan_id = Uuid::parse_str(&plan.id)
                .map_err(|_| EngineError::InvalidValue("invalid plan id".to_string()))?;
            let mut sort_order = 0;
            for model in candidates {
                let series = Series::try_from(model)?;
                if !series.offers_on(date)? {
                    continue;
                }
                let item = TaskInstance {
                    id: Uuid::new_v4(),
                    plan_id,
                    series_id: Some(series.id),
                    origin: TaskOrigin::Template,
                    axis: series.axis,
                    title: series.title,
                    description: None,
                    tier: series.tier_default,
                    scheduled_at: None,
                    estimated_minutes: series.estimated_minutes_default,
                    status: TaskStatus::Todo,
                    sort_order,
                };
                let inserted = plan_items::Entity::insert(plan_items::ActiveModel::from(&item))
                    .on_conflict(
                        OnConflict::columns([
                            plan_items::Column::PlanId,
                            plan_items::Column::SeriesId,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await?;
                sort_order += i32::try_from(inserted).unwrap_or(0);
            }
            debug!(user_id, %date, items = sort_order, "plan materialized");
        }

        let items = plan_items::Entity::find()
            .filter(plan_items::Column::PlanId.eq(plan.id.clone()))
            .order_by_asc(plan_items::Column::SortOrder)
            .order_by_asc(plan_items::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(TaskInstance::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(PlanView {
            plan_id: Uuid::parse_str(&plan.id)
                .map_err(|_| EngineError::InvalidValue("invalid plan id".to_string()))?,
            date: plan.date,
            items,
        })
    }

    /// Append a manual quest to the plan of `cmd.date`.
    pub async fn add_task(&self, cmd: NewTaskCmd) -> ResultEngine<TaskInstance> {
        let title = normalize_title(&cmd.title, "plan item")?;
        let tier = validate_tier(cmd.tier.unwrap_or(DEFAULT_TIER))?;
        let estimated_minutes = validate_minutes(
            cmd.estimated_minutes.unwrap_or(DEFAULT_MINUTES),
            "estimated_minutes",
        )?;
        with_tx!(self, |db_tx| {
            let plan = get_or_create_plan(&db_tx, &cmd.user_id, cmd.date).await?;
            let last = plan_items::Entity::find()
                .filter(plan_items::Column::PlanId.eq(plan.id.clone()))
                .order_by_desc(plan_items::Column::SortOrder)
                .one(&db_tx)
                .await?;

            let item = TaskInstance {
                id: Uuid::new_v4(),
                plan_id: Uuid::parse_str(&plan.id)
                    .map_err(|_| EngineError::InvalidValue("invalid plan id".to_string()))?,
                series_id: None,
                origin: TaskOrigin::Manual,
                axis: cmd.axis,
                title: title.clone(),
                description: normalize_optional_text(cmd.description.as_deref()),
                tier,
                scheduled_at: cmd.scheduled_at,
                estimated_minutes,
                status: TaskStatus::Todo,
                sort_order: last.map_or(0, |model| model.sort_order + 1),
            };
            plan_items::ActiveModel::from(&item).insert(&db_tx).await?;

            info!(user_id = %cmd.user_id, task_id = %item.id, date = %cmd.date, "quest added");
            Ok::<_, EngineError>(item)
        })
    }

    /// Edit the presentation fields of a quest. Status is not touched.
    pub async fn update_task(&self, cmd: UpdateTaskCmd) -> ResultEngine<TaskInstance> {
        if cmd.is_empty() {
            return Err(EngineError::InvalidValue(
                "no fields to update".to_string(),
            ));
        }
        let title = cmd
            .title
            .as_deref()
            .map(|title| normalize_title(title, "plan item"))
            .transpose()?;
        let tier = cmd.tier.map(validate_tier).transpose()?;
        let estimated_minutes = cmd
            .estimated_minutes
            .map(|minutes| validate_minutes(minutes, "estimated_minutes"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let (item, _) = self.require_task(&db_tx, &cmd.user_id, cmd.task_id).await?;

            let mut active = plan_items::ActiveModel {
                id: ActiveValue::Unchanged(item.id.to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(title) = &title {
                active.title = ActiveValue::Set(title.clone());
            }
            if let Some(axis) = cmd.axis {
                active.axis = ActiveValue::Set(axis.as_str().to_string());
            }
            if let Some(tier) = tier {
                active.tier = ActiveValue::Set(tier);
            }
            if let Some(scheduled_at) = cmd.scheduled_at {
                active.scheduled_at = ActiveValue::Set(scheduled_at);
            }
            if let Some(minutes) = estimated_minutes {
                active.estimated_minutes = ActiveValue::Set(minutes);
            }
            let model = active.update(&db_tx).await?;

            debug!(user_id = %cmd.user_id, task_id = %cmd.task_id, "quest updated");
            TaskInstance::try_from(model)
        })
    }

    /// Mark a `todo` quest as skipped. No reward is granted.
    pub async fn skip_task(&self, user_id: &str, task_id: Uuid) -> ResultEngine<TaskInstance> {
        with_tx!(self, |db_tx| {
            let (mut item, _) = self.require_task(&db_tx, user_id, task_id).await?;
            if let Some(status) = transition_task(&db_tx, &item, TaskTransition::Skip).await? {
                item.status = status;
            }
            info!(user_id, %task_id, "quest skipped");
            Ok::<_, EngineError>(item)
        })
    }

    /// Remove a `todo` quest from its plan.
    pub async fn delete_task(&self, user_id: &str, task_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (item, _) = self.require_task(&db_tx, user_id, task_id).await?;
            transition_task(&db_tx, &item, TaskTransition::Delete).await?;
            info!(user_id, %task_id, "quest deleted");
            Ok::<_, EngineError>(())
        })
    }
}

/// Return the plan row of (user, date), inserting it if missing.
async fn get_or_create_plan(
    db: &DatabaseTransaction,
    user_id: &str,
    date: NaiveDate,
) -> ResultEngine<plans::Model> {
    let plan = plans::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        date: ActiveValue::Set(date),
        created_at: ActiveValue::Set(Utc::now()),
    };
    plans::Entity::insert(plan)
        .on_conflict(
            OnConflict::columns([plans::Column::UserId, plans::Column::Date])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    plans::Entity::find()
        .filter(plans::Column::UserId.eq(user_id.to_string()))
        .filter(plans::Column::Date.eq(date))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("plan not exists".to_string()))
}
