//! Results returned by engine operations.
//!
//! Outcomes of idempotent operations are stored verbatim (as JSON) next to
//! their idempotency key, so they must round-trip through serde unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Axis, AxisScores, CosmeticSlot, Progress, ShopItem, TaskInstance, Wallet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardView {
    pub gold_delta: i64,
    pub diamond_delta: i64,
    pub exp_delta: i64,
    pub axis_delta: BTreeMap<Axis, i64>,
    pub levelup: bool,
    pub new_progress: Progress,
    pub new_wallet: Wallet,
    pub new_axis_scores: AxisScores,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub completion_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub reward: RewardView,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub inventory_id: Uuid,
    pub new_wallet: Wallet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipOutcome {
    pub equipped_at: DateTime<Utc>,
    pub previous_item_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub slot: CosmeticSlot,
    pub item_id: Uuid,
    pub equipped_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopListing {
    #[serde(flatten)]
    pub item: ShopItem,
    pub owned: bool,
    pub equipped: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanView {
    pub plan_id: Uuid,
    pub date: NaiveDate,
    pub items: Vec<TaskInstance>,
}

/// Current value of every snapshot of a user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub axis_scores: AxisScores,
    pub progress: Progress,
    pub wallet: Wallet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayView {
    #[serde(flatten)]
    pub plan: PlanView,
    #[serde(flatten)]
    pub state: UserState,
}
