//! Cosmetic shop catalog.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Axis, Currency, EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
        }
    }
}

impl TryFrom<&str> for Rarity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            other => Err(EngineError::InvalidValue(format!("invalid rarity: {other}"))),
        }
    }
}

/// Where a cosmetic is worn. A user has at most one item equipped per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmeticSlot {
    Head,
    Face,
    Body,
    Legs,
    Back,
    Accessory,
}

impl CosmeticSlot {
    pub const ALL: [CosmeticSlot; 6] = [
        CosmeticSlot::Head,
        CosmeticSlot::Face,
        CosmeticSlot::Body,
        CosmeticSlot::Legs,
        CosmeticSlot::Back,
        CosmeticSlot::Accessory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Face => "face",
            Self::Body => "body",
            Self::Legs => "legs",
            Self::Back => "back",
            Self::Accessory => "accessory",
        }
    }
}

impl core::fmt::Display for CosmeticSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CosmeticSlot {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        CosmeticSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == value)
            .ok_or_else(|| EngineError::InvalidValue(format!("invalid slot: {value}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: Uuid,
    pub axis: Option<Axis>,
    pub slot: CosmeticSlot,
    pub rarity: Rarity,
    pub name: String,
    pub description: String,
    pub price_currency: Currency,
    pub price_amount: i64,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shop_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub axis: Option<String>,
    pub slot: String,
    pub rarity: String,
    pub name: String,
    pub description: String,
    pub price_currency: String,
    pub price_amount: i64,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ShopItem> for ActiveModel {
    fn from(item: &ShopItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            axis: ActiveValue::Set(item.axis.map(|axis| axis.as_str().to_string())),
            slot: ActiveValue::Set(item.slot.as_str().to_string()),
            rarity: ActiveValue::Set(item.rarity.as_str().to_string()),
            name: ActiveValue::Set(item.name.clone()),
            description: ActiveValue::Set(item.description.clone()),
            price_currency: ActiveValue::Set(item.price_currency.code().to_string()),
            price_amount: ActiveValue::Set(item.price_amount),
            active: ActiveValue::Set(item.active),
        }
    }
}

impl TryFrom<Model> for ShopItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "shop item")?,
            axis: model.axis.as_deref().map(Axis::try_from).transpose()?,
            slot: CosmeticSlot::try_from(model.slot.as_str())?,
            rarity: Rarity::try_from(model.rarity.as_str())?,
            name: model.name,
            description: model.description,
            price_currency: Currency::try_from(model.price_currency.as_str())?,
            price_amount: model.price_amount,
            active: model.active,
        })
    }
}
