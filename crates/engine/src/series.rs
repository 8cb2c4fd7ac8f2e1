//! Series: user-defined recurring quest templates.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Axis, EngineError, RecurrenceRule, ResultEngine, RuleParams, RuleType, util::parse_uuid,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub axis: Axis,
    pub tier_default: i32,
    pub estimated_minutes_default: i32,
    pub active: bool,
    pub rule_type: RuleType,
    pub rule_params: RuleParams,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Series {
    pub fn rule(&self) -> ResultEngine<RecurrenceRule> {
        RecurrenceRule::new(self.rule_type, &self.rule_params)
    }

    /// Whether this series offers a quest on `date`.
    pub fn offers_on(&self, date: NaiveDate) -> ResultEngine<bool> {
        if !self.active || date < self.start_date {
            return Ok(false);
        }
        Ok(self.rule()?.applies_on(date))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "series")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub axis: String,
    pub tier_default: i32,
    pub estimated_minutes_default: i32,
    pub active: bool,
    pub rule_type: String,
    pub rule_json: String,
    pub start_date: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Series> for ActiveModel {
    type Error = EngineError;

    fn try_from(series: &Series) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(series.id.to_string()),
            user_id: ActiveValue::Set(series.user_id.clone()),
            title: ActiveValue::Set(series.title.clone()),
            axis: ActiveValue::Set(series.axis.as_str().to_string()),
            tier_default: ActiveValue::Set(series.tier_default),
            estimated_minutes_default: ActiveValue::Set(series.estimated_minutes_default),
            active: ActiveValue::Set(series.active),
            rule_type: ActiveValue::Set(series.rule_type.as_str().to_string()),
            rule_json: ActiveValue::Set(serde_json::to_string(&series.rule_params)?),
            start_date: ActiveValue::Set(series.start_date),
            created_at: ActiveValue::Set(series.created_at),
        })
    }
}

impl TryFrom<Model> for Series {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "series")?,
            user_id: model.user_id,
            title: model.title,
            axis: Axis::try_from(model.axis.as_str())?,
            tier_default: model.tier_default,
            estimated_minutes_default: model.estimated_minutes_default,
            active: model.active,
            rule_type: RuleType::try_from(model.rule_type.as_str())?,
            rule_params: serde_json::from_str(&model.rule_json)?,
            start_date: model.start_date,
            created_at: model.created_at,
        })
    }
}
