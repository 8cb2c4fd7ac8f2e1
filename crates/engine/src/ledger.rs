//! Ledger entries.
//!
//! A [`LedgerEntry`] is a single resource delta (a currency balance, the
//! experience bar or one axis score) caused by an event, together with the
//! resulting value of that resource.
//!
//! Entries are append-only and ordered by `seq`, which follows commit order.
//! Replaying every entry of a user in `seq` order rebuilds their snapshots.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Axis, Currency, EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LedgerKind {
    Currency,
    Experience,
    Axis,
}

impl LedgerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Experience => "experience",
            Self::Axis => "axis",
        }
    }
}

/// The resource an entry moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerResource {
    Currency { currency: Currency },
    Experience,
    Axis { axis: Axis },
}

impl LedgerResource {
    pub(crate) fn kind(self) -> LedgerKind {
        match self {
            Self::Currency { .. } => LedgerKind::Currency,
            Self::Experience => LedgerKind::Experience,
            Self::Axis { .. } => LedgerKind::Axis,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Currency { currency } => currency.code(),
            Self::Experience => "experience",
            Self::Axis { axis } => axis.as_str(),
        }
    }

    fn from_parts(kind: &str, key: &str) -> Result<Self, EngineError> {
        match kind {
            "currency" => Ok(Self::Currency {
                currency: Currency::try_from(key)?,
            }),
            "experience" => Ok(Self::Experience),
            "axis" => Ok(Self::Axis {
                axis: Axis::try_from(key)?,
            }),
            other => Err(EngineError::InvalidValue(format!(
                "invalid ledger kind: {other}"
            ))),
        }
    }
}

/// What caused a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerRefKind {
    Completion,
    Purchase,
}

impl LedgerRefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Purchase => "purchase",
        }
    }
}

impl TryFrom<&str> for LedgerRefKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completion" => Ok(Self::Completion),
            "purchase" => Ok(Self::Purchase),
            other => Err(EngineError::InvalidValue(format!(
                "invalid ledger ref: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRef {
    pub kind: LedgerRefKind,
    pub id: Uuid,
}

impl LedgerRef {
    pub fn completion(id: Uuid) -> Self {
        Self {
            kind: LedgerRefKind::Completion,
            id,
        }
    }

    pub fn purchase(id: Uuid) -> Self {
        Self {
            kind: LedgerRefKind::Purchase,
            id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Commit-ordered sequence number; `0` until persisted.
    pub seq: i64,
    pub id: Uuid,
    pub user_id: String,
    pub cause: LedgerRef,
    pub resource: LedgerResource,
    pub delta: i64,
    /// Resource value after this entry. For experience, the progress within
    /// `level_after`.
    pub balance_after: i64,
    pub level_after: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        user_id: &str,
        cause: LedgerRef,
        resource: LedgerResource,
        delta: i64,
        balance_after: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            seq: 0,
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            cause,
            resource,
            delta,
            balance_after,
            level_after: None,
            created_at,
        }
    }

    #[must_use]
    pub fn level_after(mut self, level: i32) -> Self {
        self.level_after = Some(level);
        self
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub seq: i64,
    #[sea_orm(unique)]
    pub id: String,
    pub user_id: String,
    pub ref_kind: String,
    pub ref_id: String,
    pub kind: String,
    pub resource: String,
    pub delta: i64,
    pub balance_after: i64,
    pub level_after: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            seq: ActiveValue::NotSet,
            id: ActiveValue::Set(entry.id.to_string()),
            user_id: ActiveValue::Set(entry.user_id.clone()),
            ref_kind: ActiveValue::Set(entry.cause.kind.as_str().to_string()),
            ref_id: ActiveValue::Set(entry.cause.id.to_string()),
            kind: ActiveValue::Set(entry.resource.kind().as_str().to_string()),
            resource: ActiveValue::Set(entry.resource.key().to_string()),
            delta: ActiveValue::Set(entry.delta),
            balance_after: ActiveValue::Set(entry.balance_after),
            level_after: ActiveValue::Set(entry.level_after),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            seq: model.seq,
            id: parse_uuid(&model.id, "ledger entry")?,
            user_id: model.user_id,
            cause: LedgerRef {
                kind: LedgerRefKind::try_from(model.ref_kind.as_str())?,
                id: parse_uuid(&model.ref_id, "ledger ref")?,
            },
            resource: LedgerResource::from_parts(&model.kind, &model.resource)?,
            delta: model.delta,
            balance_after: model.balance_after,
            level_after: model.level_after,
            created_at: model.created_at,
        })
    }
}
