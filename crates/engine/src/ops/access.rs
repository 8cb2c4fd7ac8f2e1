use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Series, ShopItem, TaskInstance, inventory, plan_items, plans,
    series, shop_items,
};

use super::Engine;

impl Engine {
    /// Load a plan item together with its plan.
    ///
    /// Items of other users are reported as `FORBIDDEN`, not hidden.
    pub(super) async fn require_task(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        task_id: Uuid,
    ) -> ResultEngine<(TaskInstance, plans::Model)> {
        let (item, plan) = plan_items::Entity::find_by_id(task_id.to_string())
            .find_also_related(plans::Entity)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("plan item not exists".to_string()))?;
        let plan =
            plan.ok_or_else(|| EngineError::KeyNotFound("plan not exists".to_string()))?;
        if plan.user_id != user_id {
            return Err(EngineError::Forbidden(
                "plan item belongs to another user".to_string(),
            ));
        }
        Ok((TaskInstance::try_from(item)?, plan))
    }

    pub(super) async fn require_series(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        series_id: Uuid,
    ) -> ResultEngine<Series> {
        let model = series::Entity::find_by_id(series_id.to_string())
            .filter(series::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("series not exists".to_string()))?;
        Series::try_from(model)
    }

    /// Load a shop item that is still on sale.
    pub(super) async fn require_active_shop_item(
        &self,
        db: &DatabaseTransaction,
        item_id: Uuid,
    ) -> ResultEngine<ShopItem> {
        let model = shop_items::Entity::find_by_id(item_id.to_string())
            .filter(shop_items::Column::Active.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("shop item not exists".to_string()))?;
        ShopItem::try_from(model)
    }

    pub(super) async fn owns_item(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        item_id: Uuid,
    ) -> ResultEngine<bool> {
        inventory::Entity::find()
            .filter(inventory::Column::UserId.eq(user_id.to_string()))
            .filter(inventory::Column::ShopItemId.eq(item_id.to_string()))
            .one(db)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }
}
