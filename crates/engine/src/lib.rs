pub use axis::{Axis, AxisScores};
pub use commands::{
    CompleteTaskCmd, NewSeriesCmd, NewShopItemCmd, NewTaskCmd, PurchaseCmd, UpdateSeriesCmd,
    UpdateTaskCmd,
};
pub use currency::Currency;
pub use error::EngineError;
pub use ledger::{LedgerEntry, LedgerRef, LedgerRefKind, LedgerResource};
pub use leveling::{LevelOutcome, apply_experience, experience_to_next, total_experience};
pub use ops::{Engine, EngineBuilder};
pub use outcomes::{
    CompletionOutcome, EquipOutcome, EquippedItem, PlanView, PurchaseOutcome, RewardView,
    ShopListing, TodayView, UserState,
};
pub use plan_items::{TaskInstance, TaskOrigin, TaskStatus, TaskTransition};
pub use progress::Progress;
pub use recurrence::{RecurrenceRule, RuleParams, RuleType};
pub use rewards::{ClientSource, Quality, RewardDeltas, calculate_rewards};
pub use series::Series;
pub use shop_items::{CosmeticSlot, Rarity, ShopItem};
pub use wallets::Wallet;

mod axis;
mod commands;
mod completion_events;
mod currency;
mod equipped_items;
mod error;
mod idempotency;
mod inventory;
mod ledger;
mod leveling;
mod ops;
mod outcomes;
mod plan_items;
mod plans;
mod progress;
mod purchase_events;
mod recurrence;
mod reward_events;
mod rewards;
mod series;
mod shop_items;
mod util;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
