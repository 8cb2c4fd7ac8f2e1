//! Completion events.
//!
//! One immutable row per successful quest completion, created in the same
//! transaction that moves the item to `done`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "completion_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    #[sea_orm(unique)]
    pub plan_item_id: String,
    pub plan_date: Date,
    pub completed_at: DateTimeUtc,
    pub duration_minutes: i32,
    pub quality: String,
    pub client_source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plan_items::Entity",
        from = "Column::PlanItemId",
        to = "super::plan_items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    PlanItems,
    #[sea_orm(has_one = "super::reward_events::Entity")]
    RewardEvents,
}

impl Related<super::plan_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanItems.def()
    }
}

impl Related<super::reward_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RewardEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
