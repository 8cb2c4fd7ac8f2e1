use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, NewSeriesCmd, RecurrenceRule, ResultEngine, Series, UpdateSeriesCmd, series,
    util::{normalize_title, validate_minutes, validate_tier},
};

use super::{Engine, with_tx};

/// Validate a new series and normalize its rule parameters.
fn build_series(cmd: NewSeriesCmd) -> ResultEngine<Series> {
    let rule = RecurrenceRule::new(cmd.rule_type, &cmd.rule_params)?;
    Ok(Series {
        id: Uuid::new_v4(),
        title: normalize_title(&cmd.title, "series")?,
        tier_default: validate_tier(cmd.tier_default)?,
        estimated_minutes_default: validate_minutes(
            cmd.estimated_minutes_default,
            "estimated_minutes_default",
        )?,
        user_id: cmd.user_id,
        axis: cmd.axis,
        active: cmd.active,
        rule_type: rule.rule_type,
        rule_params: rule.params(),
        start_date: cmd.start_date,
        created_at: Utc::now(),
    })
}

async fn insert_series(db: &DatabaseTransaction, series: &Series) -> ResultEngine<()> {
    series::ActiveModel::try_from(series)?.insert(db).await?;
    Ok(())
}

impl Engine {
    /// Create a recurring quest template.
    pub async fn create_series(&self, cmd: NewSeriesCmd) -> ResultEngine<Series> {
        let series = build_series(cmd)?;
        with_tx!(self, |db_tx| {
            insert_series(&db_tx, &series).await?;
            info!(user_id = %series.user_id, series_id = %series.id, "series created");
            Ok::<_, EngineError>(series.clone())
        })
    }

    /// Create several series atomically: either all are stored or none.
    pub async fn create_series_batch(&self, cmds: Vec<NewSeriesCmd>) -> ResultEngine<Vec<Series>> {
        let created = cmds
            .into_iter()
            .map(build_series)
            .collect::<ResultEngine<Vec<_>>>()?;
        with_tx!(self, |db_tx| {
            for series in &created {
                insert_series(&db_tx, series).await?;
            }
            info!(count = created.len(), "series batch created");
            Ok::<_, EngineError>(created.clone())
        })
    }

    /// The user's series, newest first.
    pub async fn list_series(&self, user_id: &str) -> ResultEngine<Vec<Series>> {
        with_tx!(self, |db_tx| {
            series::Entity::find()
                .filter(series::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(series::Column::CreatedAt)
                .order_by_desc(series::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Series::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Patch a series. Plan items already materialized keep their values.
    pub async fn update_series(&self, cmd: UpdateSeriesCmd) -> ResultEngine<Series> {
        with_tx!(self, |db_tx| {
            let mut series = self
                .require_series(&db_tx, &cmd.user_id, cmd.series_id)
                .await?;

            if let Some(title) = cmd.title.as_deref() {
                series.title = normalize_title(title, "series")?;
            }
            if let Some(axis) = cmd.axis {
                series.axis = axis;
            }
            if let Some(tier) = cmd.tier_default {
                series.tier_default = validate_tier(tier)?;
            }
            if let Some(minutes) = cmd.estimated_minutes_default {
                series.estimated_minutes_default =
                    validate_minutes(minutes, "estimated_minutes_default")?;
            }
            if let Some(active) = cmd.active {
                series.active = active;
            }
            if let Some(rule_type) = cmd.rule_type {
                series.rule_type = rule_type;
            }
            if let Some(params) = cmd.rule_params.clone() {
                series.rule_params = params;
            }
            series.rule_params = series.rule()?.params();

            let mut active = series::ActiveModel::try_from(&series)?;
            active.id = ActiveValue::Unchanged(series.id.to_string());
            active.update(&db_tx).await?;

            info!(user_id = %cmd.user_id, series_id = %cmd.series_id, "series updated");
            Ok::<_, EngineError>(series)
        })
    }

    /// Delete a series. Items it already produced stay in their plans,
    /// detached from the series.
    pub async fn delete_series(&self, user_id: &str, series_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let series = self.require_series(&db_tx, user_id, series_id).await?;
            series::Entity::delete_by_id(series.id.to_string())
                .exec(&db_tx)
                .await?;
            info!(user_id, %series_id, "series deleted");
            Ok::<_, EngineError>(())
        })
    }
}
