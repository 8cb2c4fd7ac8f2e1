use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    Axis, CosmeticSlot, EngineError, EquipOutcome, EquippedItem, LedgerRef, NewShopItemCmd,
    PurchaseCmd, PurchaseOutcome, ResultEngine, ShopItem, ShopListing, equipped_items,
    idempotency::IdempotentOperation, inventory, purchase_events, shop_items,
    util::{is_unique_violation, normalize_title, parse_uuid},
};

use super::{
    Engine,
    idempotency::{normalize_key, record_outcome, replay_outcome},
    snapshots::{SnapshotDeltas, commit_deltas},
    with_tx,
};

const PURCHASE_COMPLETED: &str = "completed";

impl Engine {
    /// Add an item to the catalog.
    pub async fn new_shop_item(&self, cmd: NewShopItemCmd) -> ResultEngine<ShopItem> {
        let name = normalize_title(&cmd.name, "shop item")?;
        if cmd.price_amount < 0 {
            return Err(EngineError::InvalidValue(
                "price_amount must be >= 0".to_string(),
            ));
        }
        let item = ShopItem {
            id: Uuid::new_v4(),
            axis: cmd.axis,
            slot: cmd.slot,
            rarity: cmd.rarity,
            name,
            description: cmd.description.trim().to_string(),
            price_currency: cmd.price_currency,
            price_amount: cmd.price_amount,
            active: true,
        };
        with_tx!(self, |db_tx| {
            shop_items::ActiveModel::from(&item).insert(&db_tx).await?;
            info!(item_id = %item.id, name = %item.name, "shop item added");
            Ok::<_, EngineError>(item.clone())
        })
    }

    /// Items on sale, optionally filtered, with the user's ownership flags.
    ///
    /// Ordered by rarity (rarest first), then price, then name.
    pub async fn shop_items(
        &self,
        user_id: &str,
        axis: Option<Axis>,
        slot: Option<CosmeticSlot>,
    ) -> ResultEngine<Vec<ShopListing>> {
        with_tx!(self, |db_tx| {
            let mut query =
                shop_items::Entity::find().filter(shop_items::Column::Active.eq(true));
            if let Some(axis) = axis {
                query = query.filter(shop_items::Column::Axis.eq(axis.as_str()));
            }
            if let Some(slot) = slot {
                query = query.filter(shop_items::Column::Slot.eq(slot.as_str()));
            }
            let items = query
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ShopItem::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let owned: HashSet<String> = inventory::Entity::find()
                .filter(inventory::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| model.shop_item_id)
                .collect();
            let equipped: HashSet<String> = equipped_items::Entity::find()
                .filter(equipped_items::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| model.shop_item_id)
                .collect();

            let mut listings: Vec<ShopListing> = items
                .into_iter()
                .map(|item| {
                    let id = item.id.to_string();
                    ShopListing {
                        owned: owned.contains(&id),
                        equipped: equipped.contains(&id),
                        item,
                    }
                })
                .collect();
            listings.sort_by(|a, b| {
                b.item
                    .rarity
                    .cmp(&a.item.rarity)
                    .then(a.item.price_amount.cmp(&b.item.price_amount))
                    .then_with(|| a.item.name.cmp(&b.item.name))
            });
            Ok::<_, EngineError>(listings)
        })
    }

    /// Buy a shop item with wallet currency.
    ///
    /// With an idempotency key, a repeated call returns the first outcome and
    /// does not debit again.
    pub async fn purchase_item(&self, cmd: PurchaseCmd) -> ResultEngine<PurchaseOutcome> {
        let key = normalize_key(cmd.idempotency_key.as_deref())?;
        with_tx!(self, |db_tx| {
            self.purchase_in_tx(&db_tx, &cmd, key.as_deref()).await
        })
    }

    async fn purchase_in_tx(
        &self,
        db: &DatabaseTransaction,
        cmd: &PurchaseCmd,
        key: Option<&str>,
    ) -> ResultEngine<PurchaseOutcome> {
        if let Some(outcome) = replay_outcome(
            db,
            &cmd.user_id,
            key,
            IdempotentOperation::PurchaseItem,
            cmd.item_id,
        )
        .await?
        {
            return Ok(outcome);
        }

        let item = self.require_active_shop_item(db, cmd.item_id).await?;
        if self.owns_item(db, &cmd.user_id, item.id).await? {
            debug!(user_id = %cmd.user_id, item_id = %item.id, "purchase rejected: owned");
            return Err(EngineError::AlreadyOwned(item.name));
        }

        let inventory_id = Uuid::new_v4();
        inventory::Entity::insert(inventory::ActiveModel {
            id: ActiveValue::Set(inventory_id.to_string()),
            user_id: ActiveValue::Set(cmd.user_id.clone()),
            shop_item_id: ActiveValue::Set(item.id.to_string()),
            acquired_at: ActiveValue::Set(cmd.purchased_at),
        })
        .exec_without_returning(db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                EngineError::AlreadyOwned(item.name.clone())
            } else {
                err.into()
            }
        })?;

        let purchase_id = Uuid::new_v4();
        let committed = commit_deltas(
            db,
            &cmd.user_id,
            LedgerRef::purchase(purchase_id),
            &SnapshotDeltas::debit(item.price_currency, item.price_amount),
            cmd.purchased_at,
        )
        .await?;

        purchase_events::ActiveModel {
            id: ActiveValue::Set(purchase_id.to_string()),
            user_id: ActiveValue::Set(cmd.user_id.clone()),
            shop_item_id: ActiveValue::Set(item.id.to_string()),
            inventory_id: ActiveValue::Set(inventory_id.to_string()),
            currency: ActiveValue::Set(item.price_currency.code().to_string()),
            amount: ActiveValue::Set(item.price_amount),
            status: ActiveValue::Set(PURCHASE_COMPLETED.to_string()),
            purchased_at: ActiveValue::Set(cmd.purchased_at),
        }
        .insert(db)
        .await?;

        let outcome = PurchaseOutcome {
            inventory_id,
            new_wallet: committed.state.wallet,
        };
        record_outcome(
            db,
            &cmd.user_id,
            key,
            IdempotentOperation::PurchaseItem,
            cmd.item_id,
            purchase_id,
            &outcome,
            cmd.purchased_at,
        )
        .await?;

        info!(
            user_id = %cmd.user_id,
            item_id = %item.id,
            %purchase_id,
            currency = %item.price_currency,
            amount = item.price_amount,
            "item purchased"
        );
        Ok(outcome)
    }

    /// Equip an owned item into `slot`, replacing whatever the slot held.
    pub async fn equip_item(
        &self,
        user_id: &str,
        item_id: Uuid,
        slot: CosmeticSlot,
    ) -> ResultEngine<EquipOutcome> {
        let equipped_at = Utc::now();
        with_tx!(self, |db_tx| {
            if !self.owns_item(&db_tx, user_id, item_id).await? {
                return Err(EngineError::NotOwned(item_id.to_string()));
            }
            let item = shop_items::Entity::find_by_id(item_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("shop item not exists".to_string()))
                .and_then(ShopItem::try_from)?;
            if item.slot != slot {
                return Err(EngineError::SlotMismatch(format!(
                    "{} goes in {}, not {slot}",
                    item.name, item.slot
                )));
            }

            let previous_item_id = equipped_items::Entity::find_by_id((
                user_id.to_string(),
                slot.as_str().to_string(),
            ))
            .one(&db_tx)
            .await?
            .map(|model| parse_uuid(&model.shop_item_id, "shop item"))
            .transpose()?;

            equipped_items::Entity::insert(equipped_items::ActiveModel {
                user_id: ActiveValue::Set(user_id.to_string()),
                slot: ActiveValue::Set(slot.as_str().to_string()),
                shop_item_id: ActiveValue::Set(item_id.to_string()),
                equipped_at: ActiveValue::Set(equipped_at),
            })
            .on_conflict(
                OnConflict::columns([
                    equipped_items::Column::UserId,
                    equipped_items::Column::Slot,
                ])
                .update_columns([
                    equipped_items::Column::ShopItemId,
                    equipped_items::Column::EquippedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&db_tx)
            .await?;

            info!(user_id, %item_id, %slot, "item equipped");
            Ok::<_, EngineError>(EquipOutcome {
                equipped_at,
                previous_item_id,
            })
        })
    }

    /// What the user currently wears, one entry per occupied slot.
    pub async fn equipped_items(&self, user_id: &str) -> ResultEngine<Vec<EquippedItem>> {
        with_tx!(self, |db_tx| {
            let rows = equipped_items::Entity::find()
                .filter(equipped_items::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(equipped_items::Column::Slot)
                .all(&db_tx)
                .await?;
            let mut equipped = rows
                .into_iter()
                .map(|model| {
                    Ok(EquippedItem {
                        slot: CosmeticSlot::try_from(model.slot.as_str())?,
                        item_id: parse_uuid(&model.shop_item_id, "shop item")?,
                        equipped_at: model.equipped_at,
                    })
                })
                .collect::<ResultEngine<Vec<_>>>()?;
            equipped.sort_by_key(|item| item.slot);
            Ok::<_, EngineError>(equipped)
        })
    }
}

