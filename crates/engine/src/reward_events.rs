//! Reward events: the deltas granted by one completion event (1:1).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reward_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    #[sea_orm(unique)]
    pub completion_event_id: String,
    pub gold_delta: i64,
    pub diamond_delta: i64,
    pub experience_delta: i64,
    /// JSON object keyed by axis name.
    pub axis_delta: String,
    pub leveled_up: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::completion_events::Entity",
        from = "Column::CompletionEventId",
        to = "super::completion_events::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    CompletionEvents,
}

impl Related<super::completion_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompletionEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
