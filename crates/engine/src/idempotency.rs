//! Idempotency keys.
//!
//! A key is scoped to a user and bound to exactly one operation on one target.
//! The row stores the serialized outcome of the original call, so a replay
//! returns the same content without touching any other table.

use sea_orm::entity::prelude::*;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IdempotentOperation {
    CompleteTask,
    PurchaseItem,
}

impl IdempotentOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompleteTask => "complete_task",
            Self::PurchaseItem => "purchase_item",
        }
    }
}

impl TryFrom<&str> for IdempotentOperation {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "complete_task" => Ok(Self::CompleteTask),
            "purchase_item" => Ok(Self::PurchaseItem),
            other => Err(EngineError::InvalidValue(format!(
                "invalid idempotent operation: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "idempotency_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub operation: String,
    pub target_id: String,
    pub event_id: String,
    pub response: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
