//! Command structs for engine operations.
//!
//! These types group parameters for write operations (completion, purchase,
//! plan and series edits), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Axis, ClientSource, CosmeticSlot, Currency, Quality, Rarity, RuleParams, RuleType};

/// Complete a quest.
#[derive(Clone, Debug)]
pub struct CompleteTaskCmd {
    pub user_id: String,
    pub task_id: Uuid,
    pub quality: Quality,
    pub duration_minutes: i32,
    pub client_source: ClientSource,
    pub idempotency_key: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl CompleteTaskCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, task_id: Uuid, completed_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            task_id,
            quality: Quality::default(),
            duration_minutes: 0,
            client_source: ClientSource::default(),
            idempotency_key: None,
            completed_at,
        }
    }

    #[must_use]
    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn duration_minutes(mut self, minutes: i32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn client_source(mut self, source: ClientSource) -> Self {
        self.client_source = source;
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Buy a shop item.
#[derive(Clone, Debug)]
pub struct PurchaseCmd {
    pub user_id: String,
    pub item_id: Uuid,
    pub idempotency_key: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, item_id: Uuid, purchased_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            item_id,
            idempotency_key: None,
            purchased_at,
        }
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Add a manual item to the plan of a date.
#[derive(Clone, Debug)]
pub struct NewTaskCmd {
    pub user_id: String,
    pub date: NaiveDate,
    pub title: String,
    pub axis: Axis,
    pub tier: Option<i32>,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub estimated_minutes: Option<i32>,
}

impl NewTaskCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        title: impl Into<String>,
        axis: Axis,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            title: title.into(),
            axis,
            tier: None,
            description: None,
            scheduled_at: None,
            estimated_minutes: None,
        }
    }

    #[must_use]
    pub fn tier(mut self, tier: i32) -> Self {
        self.tier = Some(tier);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    #[must_use]
    pub fn estimated_minutes(mut self, minutes: i32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }
}

/// Patch a plan item. `None` leaves a field untouched; `scheduled_at:
/// Some(None)` clears the schedule.
#[derive(Clone, Debug, Default)]
pub struct UpdateTaskCmd {
    pub user_id: String,
    pub task_id: Uuid,
    pub title: Option<String>,
    pub axis: Option<Axis>,
    pub tier: Option<i32>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub estimated_minutes: Option<i32>,
}

impl UpdateTaskCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, task_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            task_id,
            ..Default::default()
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.axis.is_none()
            && self.tier.is_none()
            && self.scheduled_at.is_none()
            && self.estimated_minutes.is_none()
    }
}

/// Create a series.
#[derive(Clone, Debug)]
pub struct NewSeriesCmd {
    pub user_id: String,
    pub title: String,
    pub axis: Axis,
    pub tier_default: i32,
    pub estimated_minutes_default: i32,
    pub active: bool,
    pub rule_type: RuleType,
    pub rule_params: RuleParams,
    pub start_date: NaiveDate,
}

impl NewSeriesCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        axis: Axis,
        rule_type: RuleType,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            axis,
            tier_default: 1,
            estimated_minutes_default: 15,
            active: true,
            rule_type,
            rule_params: RuleParams::default(),
            start_date,
        }
    }

    #[must_use]
    pub fn tier(mut self, tier: i32) -> Self {
        self.tier_default = tier;
        self
    }

    #[must_use]
    pub fn estimated_minutes(mut self, minutes: i32) -> Self {
        self.estimated_minutes_default = minutes;
        self
    }

    #[must_use]
    pub fn selected_days<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_params.selected_days = days.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn n_per_week(mut self, n: u8) -> Self {
        self.rule_params.n_per_week = Some(n);
        self
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Patch a series. `None` leaves a field untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateSeriesCmd {
    pub user_id: String,
    pub series_id: Uuid,
    pub title: Option<String>,
    pub axis: Option<Axis>,
    pub tier_default: Option<i32>,
    pub estimated_minutes_default: Option<i32>,
    pub active: Option<bool>,
    pub rule_type: Option<RuleType>,
    pub rule_params: Option<RuleParams>,
}

impl UpdateSeriesCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, series_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            series_id,
            ..Default::default()
        }
    }
}

/// Add an item to the shop catalog.
#[derive(Clone, Debug)]
pub struct NewShopItemCmd {
    pub name: String,
    pub description: String,
    pub axis: Option<Axis>,
    pub slot: CosmeticSlot,
    pub rarity: Rarity,
    pub price_currency: Currency,
    pub price_amount: i64,
}

impl NewShopItemCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        slot: CosmeticSlot,
        price_currency: Currency,
        price_amount: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            axis: None,
            slot,
            rarity: Rarity::Common,
            price_currency,
            price_amount,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    #[must_use]
    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }
}
