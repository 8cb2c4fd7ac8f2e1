//! Level/experience snapshot.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::leveling::{self, LevelOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub level: i32,
    pub experience: i64,
    pub experience_to_next: i64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next: leveling::experience_to_next(1),
        }
    }
}

impl Progress {
    /// Apply an experience gain through the level curve.
    #[must_use]
    pub fn gain(self, delta: i64) -> LevelOutcome {
        leveling::apply_experience(self.level, self.experience, delta)
    }
}

impl From<LevelOutcome> for Progress {
    fn from(outcome: LevelOutcome) -> Self {
        Self {
            level: outcome.level,
            experience: outcome.experience,
            experience_to_next: outcome.experience_to_next,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "progress_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub level: i32,
    pub experience: i64,
    pub experience_to_next: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Progress {
    fn from(model: Model) -> Self {
        Self {
            level: model.level,
            experience: model.experience,
            experience_to_next: model.experience_to_next,
        }
    }
}

pub(crate) fn active_model(user_id: &str, progress: &Progress, at: DateTime<Utc>) -> ActiveModel {
    ActiveModel {
        user_id: ActiveValue::Set(user_id.to_string()),
        level: ActiveValue::Set(progress.level),
        experience: ActiveValue::Set(progress.experience),
        experience_to_next: ActiveValue::Set(progress.experience_to_next),
        updated_at: ActiveValue::Set(at),
    }
}
