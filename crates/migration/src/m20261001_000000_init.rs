//! Initial schema migration.
//!
//! Creates the complete quest ledger schema:
//!
//! - `series`: recurring quest templates
//! - `plans` / `plan_items`: the daily quest list of a user
//! - `completion_events` / `reward_events`: one pair per completed quest
//! - `axis_snapshots`, `progress_snapshots`, `wallet_snapshots`: current
//!   aggregates per user
//! - `ledger_entries`: append-only resource deltas, ordered by `seq`
//! - `idempotency_keys`: stored outcomes of keyed requests
//! - `shop_items`, `inventory`, `equipped_items`, `purchase_events`: cosmetics

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Series {
    Table,
    Id,
    UserId,
    Title,
    Axis,
    TierDefault,
    EstimatedMinutesDefault,
    Active,
    RuleType,
    RuleJson,
    StartDate,
    CreatedAt,
}

#[derive(Iden)]
enum Plans {
    Table,
    Id,
    UserId,
    Date,
    CreatedAt,
}

#[derive(Iden)]
enum PlanItems {
    Table,
    Id,
    PlanId,
    SeriesId,
    Origin,
    Axis,
    Title,
    Description,
    Tier,
    ScheduledAt,
    EstimatedMinutes,
    Status,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CompletionEvents {
    Table,
    Id,
    UserId,
    PlanItemId,
    PlanDate,
    CompletedAt,
    DurationMinutes,
    Quality,
    ClientSource,
}

#[derive(Iden)]
enum RewardEvents {
    Table,
    Id,
    UserId,
    CompletionEventId,
    GoldDelta,
    DiamondDelta,
    ExperienceDelta,
    AxisDelta,
    LeveledUp,
    CreatedAt,
}

#[derive(Iden)]
enum AxisSnapshots {
    Table,
    UserId,
    Body,
    Focus,
    Knowledge,
    Discipline,
    Organization,
    Social,
    UpdatedAt,
}

#[derive(Iden)]
enum ProgressSnapshots {
    Table,
    UserId,
    Level,
    Experience,
    ExperienceToNext,
    UpdatedAt,
}

#[derive(Iden)]
enum WalletSnapshots {
    Table,
    UserId,
    Gold,
    Diamond,
    UpdatedAt,
}

#[derive(Iden)]
enum LedgerEntries {
    Table,
    Seq,
    Id,
    UserId,
    RefKind,
    RefId,
    Kind,
    Resource,
    Delta,
    BalanceAfter,
    LevelAfter,
    CreatedAt,
}

#[derive(Iden)]
enum IdempotencyKeys {
    Table,
    UserId,
    Key,
    Operation,
    TargetId,
    EventId,
    Response,
    CreatedAt,
}

#[derive(Iden)]
enum ShopItems {
    Table,
    Id,
    Axis,
    Slot,
    Rarity,
    Name,
    Description,
    PriceCurrency,
    PriceAmount,
    Active,
}

#[derive(Iden)]
enum Inventory {
    Table,
    Id,
    UserId,
    ShopItemId,
    AcquiredAt,
}

#[derive(Iden)]
enum EquippedItems {
    Table,
    UserId,
    Slot,
    ShopItemId,
    EquippedAt,
}

#[derive(Iden)]
enum PurchaseEvents {
    Table,
    Id,
    UserId,
    ShopItemId,
    InventoryId,
    Currency,
    Amount,
    Status,
    PurchasedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Series
        manager
            .create_table(
                Table::create()
                    .table(Series::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Series::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Series::UserId).string().not_null())
                    .col(ColumnDef::new(Series::Title).string().not_null())
                    .col(ColumnDef::new(Series::Axis).string().not_null())
                    .col(ColumnDef::new(Series::TierDefault).integer().not_null())
                    .col(
                        ColumnDef::new(Series::EstimatedMinutesDefault)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Series::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Series::RuleType).string().not_null())
                    .col(
                        ColumnDef::new(Series::RuleJson)
                            .string()
                            .not_null()
                            .default("{}"),
                    )
                    .col(ColumnDef::new(Series::StartDate).date().not_null())
                    .col(ColumnDef::new(Series::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-series-user_id-active")
                    .table(Series::Table)
                    .col(Series::UserId)
                    .col(Series::Active)
                    .to_owned(),
            )
            .await?;

        // Plans
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plans::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Plans::UserId).string().not_null())
                    .col(ColumnDef::new(Plans::Date).date().not_null())
                    .col(ColumnDef::new(Plans::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-plans-user_id-date-unique")
                    .table(Plans::Table)
                    .col(Plans::UserId)
                    .col(Plans::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Plan items
        manager
            .create_table(
                Table::create()
                    .table(PlanItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlanItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlanItems::PlanId).string().not_null())
                    .col(ColumnDef::new(PlanItems::SeriesId).string())
                    .col(ColumnDef::new(PlanItems::Origin).string().not_null())
                    .col(ColumnDef::new(PlanItems::Axis).string().not_null())
                    .col(ColumnDef::new(PlanItems::Title).string().not_null())
                    .col(ColumnDef::new(PlanItems::Description).string())
                    .col(ColumnDef::new(PlanItems::Tier).integer().not_null())
                    .col(ColumnDef::new(PlanItems::ScheduledAt).timestamp())
                    .col(
                        ColumnDef::new(PlanItems::EstimatedMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlanItems::Status)
                            .string()
                            .not_null()
                            .default("todo"),
                    )
                    .col(
                        ColumnDef::new(PlanItems::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PlanItems::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(PlanItems::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-plan_items-plan_id")
                            .from(PlanItems::Table, PlanItems::PlanId)
                            .to(Plans::Table, Plans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-plan_items-series_id")
                            .from(PlanItems::Table, PlanItems::SeriesId)
                            .to(Series::Table, Series::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-plan_items-plan_id-series_id-unique")
                    .table(PlanItems::Table)
                    .col(PlanItems::PlanId)
                    .col(PlanItems::SeriesId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-plan_items-plan_id-sort_order")
                    .table(PlanItems::Table)
                    .col(PlanItems::PlanId)
                    .col(PlanItems::SortOrder)
                    .to_owned(),
            )
            .await?;

        // Completion and reward events
        manager
            .create_table(
                Table::create()
                    .table(CompletionEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompletionEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompletionEvents::UserId).string().not_null())
                    .col(
                        ColumnDef::new(CompletionEvents::PlanItemId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CompletionEvents::PlanDate).date().not_null())
                    .col(
                        ColumnDef::new(CompletionEvents::CompletedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompletionEvents::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CompletionEvents::Quality).string().not_null())
                    .col(
                        ColumnDef::new(CompletionEvents::ClientSource)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-completion_events-plan_item_id")
                            .from(CompletionEvents::Table, CompletionEvents::PlanItemId)
                            .to(PlanItems::Table, PlanItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-completion_events-user_id-completed_at")
                    .table(CompletionEvents::Table)
                    .col(CompletionEvents::UserId)
                    .col(CompletionEvents::CompletedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RewardEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RewardEvents::UserId).string().not_null())
                    .col(
                        ColumnDef::new(RewardEvents::CompletionEventId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(RewardEvents::GoldDelta)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardEvents::DiamondDelta)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardEvents::ExperienceDelta)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RewardEvents::AxisDelta).string().not_null())
                    .col(ColumnDef::new(RewardEvents::LeveledUp).boolean().not_null())
                    .col(ColumnDef::new(RewardEvents::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reward_events-completion_event_id")
                            .from(RewardEvents::Table, RewardEvents::CompletionEventId)
                            .to(CompletionEvents::Table, CompletionEvents::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Snapshots
        manager
            .create_table(
                Table::create()
                    .table(AxisSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AxisSnapshots::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(counter(AxisSnapshots::Body))
                    .col(counter(AxisSnapshots::Focus))
                    .col(counter(AxisSnapshots::Knowledge))
                    .col(counter(AxisSnapshots::Discipline))
                    .col(counter(AxisSnapshots::Organization))
                    .col(counter(AxisSnapshots::Social))
                    .col(
                        ColumnDef::new(AxisSnapshots::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProgressSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProgressSnapshots::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProgressSnapshots::Level)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(counter(ProgressSnapshots::Experience))
                    .col(
                        ColumnDef::new(ProgressSnapshots::ExperienceToNext)
                            .big_integer()
                            .not_null()
                            .default(100),
                    )
                    .col(
                        ColumnDef::new(ProgressSnapshots::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalletSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletSnapshots::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(counter(WalletSnapshots::Gold))
                    .col(counter(WalletSnapshots::Diamond))
                    .col(
                        ColumnDef::new(WalletSnapshots::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .check(Expr::col(WalletSnapshots::Gold).gte(0))
                    .check(Expr::col(WalletSnapshots::Diamond).gte(0))
                    .to_owned(),
            )
            .await?;

        // Ledger
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Seq)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::UserId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::RefKind).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::RefId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Resource).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Delta).big_integer().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::LevelAfter).integer())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-user_id-seq")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::UserId)
                    .col(LedgerEntries::Seq)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-ref")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::RefKind)
                    .col(LedgerEntries::RefId)
                    .to_owned(),
            )
            .await?;

        // Idempotency keys
        manager
            .create_table(
                Table::create()
                    .table(IdempotencyKeys::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IdempotencyKeys::UserId).string().not_null())
                    .col(ColumnDef::new(IdempotencyKeys::Key).string().not_null())
                    .col(
                        ColumnDef::new(IdempotencyKeys::Operation)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IdempotencyKeys::TargetId).string().not_null())
                    .col(ColumnDef::new(IdempotencyKeys::EventId).string().not_null())
                    .col(ColumnDef::new(IdempotencyKeys::Response).text().not_null())
                    .col(
                        ColumnDef::new(IdempotencyKeys::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(IdempotencyKeys::UserId)
                            .col(IdempotencyKeys::Key),
                    )
                    .to_owned(),
            )
            .await?;

        // Shop
        manager
            .create_table(
                Table::create()
                    .table(ShopItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShopItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShopItems::Axis).string())
                    .col(ColumnDef::new(ShopItems::Slot).string().not_null())
                    .col(ColumnDef::new(ShopItems::Rarity).string().not_null())
                    .col(ColumnDef::new(ShopItems::Name).string().not_null())
                    .col(
                        ColumnDef::new(ShopItems::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ShopItems::PriceCurrency).string().not_null())
                    .col(
                        ColumnDef::new(ShopItems::PriceAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShopItems::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Inventory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inventory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inventory::UserId).string().not_null())
                    .col(ColumnDef::new(Inventory::ShopItemId).string().not_null())
                    .col(ColumnDef::new(Inventory::AcquiredAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory-shop_item_id")
                            .from(Inventory::Table, Inventory::ShopItemId)
                            .to(ShopItems::Table, ShopItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory-user_id-shop_item_id-unique")
                    .table(Inventory::Table)
                    .col(Inventory::UserId)
                    .col(Inventory::ShopItemId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EquippedItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EquippedItems::UserId).string().not_null())
                    .col(ColumnDef::new(EquippedItems::Slot).string().not_null())
                    .col(
                        ColumnDef::new(EquippedItems::ShopItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EquippedItems::EquippedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EquippedItems::UserId)
                            .col(EquippedItems::Slot),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-equipped_items-shop_item_id")
                            .from(EquippedItems::Table, EquippedItems::ShopItemId)
                            .to(ShopItems::Table, ShopItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchaseEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchaseEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PurchaseEvents::UserId).string().not_null())
                    .col(
                        ColumnDef::new(PurchaseEvents::ShopItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseEvents::InventoryId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PurchaseEvents::Currency).string().not_null())
                    .col(ColumnDef::new(PurchaseEvents::Amount).big_integer().not_null())
                    .col(ColumnDef::new(PurchaseEvents::Status).string().not_null())
                    .col(
                        ColumnDef::new(PurchaseEvents::PurchasedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchase_events-shop_item_id")
                            .from(PurchaseEvents::Table, PurchaseEvents::ShopItemId)
                            .to(ShopItems::Table, ShopItems::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchase_events-inventory_id")
                            .from(PurchaseEvents::Table, PurchaseEvents::InventoryId)
                            .to(Inventory::Table, Inventory::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchase_events-user_id")
                    .table(PurchaseEvents::Table)
                    .col(PurchaseEvents::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order, children before parents.
        manager
            .drop_table(Table::drop().table(PurchaseEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EquippedItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inventory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShopItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdempotencyKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProgressSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AxisSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RewardEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompletionEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlanItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Series::Table).to_owned())
            .await?;
        Ok(())
    }
}

/// Non-null integer counter starting at zero.
fn counter<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}
