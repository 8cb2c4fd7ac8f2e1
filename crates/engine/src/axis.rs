//! Skill axes and the per-user axis score snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// One of the six skill categories a quest trains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Body,
    Focus,
    Knowledge,
    Discipline,
    Organization,
    Social,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Body,
        Axis::Focus,
        Axis::Knowledge,
        Axis::Discipline,
        Axis::Organization,
        Axis::Social,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Focus => "focus",
            Self::Knowledge => "knowledge",
            Self::Discipline => "discipline",
            Self::Organization => "organization",
            Self::Social => "social",
        }
    }
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Axis {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Axis::ALL
            .into_iter()
            .find(|axis| axis.as_str() == value)
            .ok_or_else(|| EngineError::InvalidValue(format!("invalid axis: {value}")))
    }
}

/// Running score per axis. Scores only ever move by deltas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisScores {
    pub body: i64,
    pub focus: i64,
    pub knowledge: i64,
    pub discipline: i64,
    pub organization: i64,
    pub social: i64,
}

impl AxisScores {
    #[must_use]
    pub fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::Body => self.body,
            Axis::Focus => self.focus,
            Axis::Knowledge => self.knowledge,
            Axis::Discipline => self.discipline,
            Axis::Organization => self.organization,
            Axis::Social => self.social,
        }
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut i64 {
        match axis {
            Axis::Body => &mut self.body,
            Axis::Focus => &mut self.focus,
            Axis::Knowledge => &mut self.knowledge,
            Axis::Discipline => &mut self.discipline,
            Axis::Organization => &mut self.organization,
            Axis::Social => &mut self.social,
        }
    }

    pub fn add(&mut self, axis: Axis, delta: i64) {
        *self.slot_mut(axis) += delta;
    }

    /// Elementwise add of a sparse delta map.
    #[must_use]
    pub fn apply(mut self, delta: &BTreeMap<Axis, i64>) -> Self {
        for (axis, value) in delta {
            self.add(*axis, *value);
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "axis_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub body: i64,
    pub focus: i64,
    pub knowledge: i64,
    pub discipline: i64,
    pub organization: i64,
    pub social: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AxisScores {
    fn from(model: Model) -> Self {
        Self {
            body: model.body,
            focus: model.focus,
            knowledge: model.knowledge,
            discipline: model.discipline,
            organization: model.organization,
            social: model.social,
        }
    }
}

pub(crate) fn active_model(user_id: &str, scores: &AxisScores, at: DateTime<Utc>) -> ActiveModel {
    use sea_orm::ActiveValue::Set;

    ActiveModel {
        user_id: Set(user_id.to_string()),
        body: Set(scores.body),
        focus: Set(scores.focus),
        knowledge: Set(scores.knowledge),
        discipline: Set(scores.discipline),
        organization: Set(scores.organization),
        social: Set(scores.social),
        updated_at: Set(at),
    }
}
