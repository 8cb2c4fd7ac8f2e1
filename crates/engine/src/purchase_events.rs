//! Purchase events: one row per successful shop purchase.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchase_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub shop_item_id: String,
    pub inventory_id: String,
    pub currency: String,
    pub amount: i64,
    pub status: String,
    pub purchased_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop_items::Entity",
        from = "Column::ShopItemId",
        to = "super::shop_items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ShopItems,
}

impl Related<super::shop_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
