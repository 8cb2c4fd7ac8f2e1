//! Plan items: one quest scheduled for one user on one date.
//!
//! The lifecycle is closed: `todo → done` (completion) and `todo → skipped`
//! (skip). Both targets are terminal, and an item can only be deleted while it
//! is still `todo`. [`TaskStatus::transition`] is the single place where that
//! table lives.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Axis, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Done,
    Skipped,
}

/// A requested change of [`TaskStatus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskTransition {
    Complete,
    Skip,
    Delete,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Done => "done",
            Self::Skipped => "skipped",
        }
    }

    /// Validate `transition` from this status.
    ///
    /// Returns the resulting status, or `None` when the item is removed.
    pub fn transition(self, transition: TaskTransition) -> ResultEngine<Option<TaskStatus>> {
        match (self, transition) {
            (Self::Todo, TaskTransition::Complete) => Ok(Some(Self::Done)),
            (Self::Todo, TaskTransition::Skip) => Ok(Some(Self::Skipped)),
            (Self::Todo, TaskTransition::Delete) => Ok(None),
            (Self::Done, TaskTransition::Complete) => Err(EngineError::AlreadyCompleted(
                "quest already completed".to_string(),
            )),
            (Self::Done, TaskTransition::Skip) => Err(EngineError::CannotSkipCompleted(
                "cannot skip completed item".to_string(),
            )),
            (Self::Done, TaskTransition::Delete) => Err(EngineError::CannotDeleteCompleted(
                "cannot delete completed item".to_string(),
            )),
            (Self::Skipped, TaskTransition::Complete) => {
                Err(EngineError::Conflict("quest was skipped".to_string()))
            }
            (Self::Skipped, TaskTransition::Skip) => {
                Err(EngineError::Conflict("quest already skipped".to_string()))
            }
            (Self::Skipped, TaskTransition::Delete) => Err(EngineError::Conflict(
                "cannot delete skipped item".to_string(),
            )),
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "todo" => Ok(Self::Todo),
            "done" => Ok(Self::Done),
            "skipped" => Ok(Self::Skipped),
            other => Err(EngineError::InvalidValue(format!(
                "invalid item status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOrigin {
    /// Materialized from a series.
    Template,
    /// Added directly by the user.
    Manual,
}

impl TaskOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Manual => "manual",
        }
    }
}

impl TryFrom<&str> for TaskOrigin {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "template" => Ok(Self::Template),
            "manual" => Ok(Self::Manual),
            other => Err(EngineError::InvalidValue(format!(
                "invalid item origin: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub series_id: Option<Uuid>,
    pub origin: TaskOrigin,
    pub axis: Axis,
    pub title: String,
    pub description: Option<String>,
    pub tier: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub estimated_minutes: i32,
    pub status: TaskStatus,
    pub sort_order: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "plan_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub plan_id: String,
    pub series_id: Option<String>,
    pub origin: String,
    pub axis: String,
    pub title: String,
    pub description: Option<String>,
    pub tier: i32,
    pub scheduled_at: Option<DateTimeUtc>,
    pub estimated_minutes: i32,
    pub status: String,
    pub sort_order: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plans::Entity",
        from = "Column::PlanId",
        to = "super::plans::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Plans,
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TaskInstance> for ActiveModel {
    fn from(item: &TaskInstance) -> Self {
        let now = Utc::now();
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            plan_id: ActiveValue::Set(item.plan_id.to_string()),
            series_id: ActiveValue::Set(item.series_id.map(|id| id.to_string())),
            origin: ActiveValue::Set(item.origin.as_str().to_string()),
            axis: ActiveValue::Set(item.axis.as_str().to_string()),
            title: ActiveValue::Set(item.title.clone()),
            description: ActiveValue::Set(item.description.clone()),
            tier: ActiveValue::Set(item.tier),
            scheduled_at: ActiveValue::Set(item.scheduled_at),
            estimated_minutes: ActiveValue::Set(item.estimated_minutes),
            status: ActiveValue::Set(item.status.as_str().to_string()),
            sort_order: ActiveValue::Set(item.sort_order),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for TaskInstance {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "plan item")?,
            plan_id: parse_uuid(&model.plan_id, "plan")?,
            series_id: model
                .series_id
                .as_deref()
                .map(|id| parse_uuid(id, "series"))
                .transpose()?,
            origin: TaskOrigin::try_from(model.origin.as_str())?,
            axis: Axis::try_from(model.axis.as_str())?,
            title: model.title,
            description: model.description,
            tier: model.tier,
            scheduled_at: model.scheduled_at,
            estimated_minutes: model.estimated_minutes,
            status: TaskStatus::try_from(model.status.as_str())?,
            sort_order: model.sort_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_accepts_every_transition() {
        assert_eq!(
            TaskStatus::Todo.transition(TaskTransition::Complete).unwrap(),
            Some(TaskStatus::Done)
        );
        assert_eq!(
            TaskStatus::Todo.transition(TaskTransition::Skip).unwrap(),
            Some(TaskStatus::Skipped)
        );
        assert_eq!(TaskStatus::Todo.transition(TaskTransition::Delete).unwrap(), None);
    }

    #[test]
    fn done_is_terminal() {
        let codes: Vec<_> = [
            TaskTransition::Complete,
            TaskTransition::Skip,
            TaskTransition::Delete,
        ]
        .into_iter()
        .map(|t| TaskStatus::Done.transition(t).unwrap_err().code())
        .collect();

        assert_eq!(
            codes,
            vec![
                "ALREADY_COMPLETED",
                "CANNOT_SKIP_COMPLETED",
                "CANNOT_DELETE_COMPLETED"
            ]
        );
    }

    #[test]
    fn skipped_is_terminal() {
        for transition in [
            TaskTransition::Complete,
            TaskTransition::Skip,
            TaskTransition::Delete,
        ] {
            let err = TaskStatus::Skipped.transition(transition).unwrap_err();
            assert_eq!(err.code(), "CONFLICT");
        }
    }
}
