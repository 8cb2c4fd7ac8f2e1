use std::error::Error;

use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    Axis, ClientSource, CompleteTaskCmd, CosmeticSlot, Currency, Engine, EngineError,
    NewSeriesCmd, NewShopItemCmd, NewTaskCmd, PurchaseCmd, Quality, Rarity, RuleType,
};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;
use settings::Database;
use uuid::Uuid;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "questlog")]
#[command(about = "Quest ledger: daily plans, rewards, progression and cosmetics")]
struct Cli {
    /// Settings file, without extension.
    #[arg(long, default_value = "settings")]
    config: String,

    /// Acting user.
    #[arg(long, env = "QUESTLOG_USER", default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Materialize and show the plan of a day with the current snapshots.
    Today(DateArgs),
    /// Complete a quest and collect its reward.
    Complete(CompleteArgs),
    /// Skip a quest.
    Skip { task_id: Uuid },
    /// Delete a quest that has not been completed.
    Delete { task_id: Uuid },
    /// Add a manual quest to a day's plan.
    AddTask(AddTaskArgs),
    Series(SeriesArgs),
    Shop(ShopArgs),
    /// Buy a shop item.
    Purchase {
        item_id: Uuid,
        #[arg(long)]
        key: Option<String>,
    },
    /// Equip an owned item into a slot.
    Equip {
        item_id: Uuid,
        #[arg(long, value_parser = parse_engine::<CosmeticSlot>)]
        slot: CosmeticSlot,
    },
    /// Show progress, wallet and axis scores.
    State,
    /// Show every ledger entry in commit order.
    Ledger,
    /// Rebuild the snapshots from the ledger and compare with the stored ones.
    Replay,
}

#[derive(Args, Debug)]
struct DateArgs {
    /// Plan date (YYYY-MM-DD), defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct CompleteArgs {
    task_id: Uuid,
    #[arg(long, default_value = "mid", value_parser = parse_engine::<Quality>)]
    quality: Quality,
    #[arg(long, default_value_t = 0)]
    duration: i32,
    #[arg(long, default_value = "app", value_parser = parse_engine::<ClientSource>)]
    source: ClientSource,
    #[arg(long)]
    key: Option<String>,
}

#[derive(Args, Debug)]
struct AddTaskArgs {
    title: String,
    #[arg(long, value_parser = parse_engine::<Axis>)]
    axis: Axis,
    #[arg(long, default_value_t = 1)]
    tier: i32,
    #[arg(long)]
    minutes: Option<i32>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    #[command(subcommand)]
    command: SeriesCommand,
}

#[derive(Subcommand, Debug)]
enum SeriesCommand {
    Add(SeriesAddArgs),
    List,
    Remove { series_id: Uuid },
}

#[derive(Args, Debug)]
struct SeriesAddArgs {
    title: String,
    #[arg(long, value_parser = parse_engine::<Axis>)]
    axis: Axis,
    /// DAILY, WEEKDAYS, WEEKLY, N_PER_WEEK or ONCE.
    #[arg(long, value_parser = parse_engine::<RuleType>)]
    rule: RuleType,
    /// Weekdays for WEEKLY rules, e.g. `--day mon --day thu`.
    #[arg(long = "day")]
    days: Vec<String>,
    #[arg(long)]
    per_week: Option<u8>,
    #[arg(long, default_value_t = 1)]
    tier: i32,
    #[arg(long, default_value_t = 15)]
    minutes: i32,
    #[arg(long)]
    start: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct ShopArgs {
    #[command(subcommand)]
    command: ShopCommand,
}

#[derive(Subcommand, Debug)]
enum ShopCommand {
    List {
        #[arg(long, value_parser = parse_engine::<Axis>)]
        axis: Option<Axis>,
        #[arg(long, value_parser = parse_engine::<CosmeticSlot>)]
        slot: Option<CosmeticSlot>,
    },
    Add(ShopAddArgs),
}

#[derive(Args, Debug)]
struct ShopAddArgs {
    name: String,
    #[arg(long, value_parser = parse_engine::<CosmeticSlot>)]
    slot: CosmeticSlot,
    #[arg(long)]
    price: i64,
    #[arg(long, default_value = "gold", value_parser = parse_engine::<Currency>)]
    currency: Currency,
    #[arg(long, default_value = "common", value_parser = parse_engine::<Rarity>)]
    rarity: Rarity,
    #[arg(long, value_parser = parse_engine::<Axis>)]
    axis: Option<Axis>,
    #[arg(long, default_value = "")]
    description: String,
}

fn parse_engine<T>(raw: &str) -> Result<T, String>
where
    T: for<'a> TryFrom<&'a str, Error = EngineError>,
{
    T::try_from(raw).map_err(|err| err.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "questlog={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = parse_database(&settings.database).await?;
    let engine = Engine::builder().database(db).build().await?;
    let user = cli.user.as_str();

    match cli.command {
        Command::Today(args) => {
            print_json(&engine.today(user, args.date.unwrap_or_else(today)).await?)?;
        }
        Command::Complete(args) => {
            let mut cmd = CompleteTaskCmd::new(user, args.task_id, Utc::now())
                .quality(args.quality)
                .duration_minutes(args.duration)
                .client_source(args.source);
            if let Some(key) = args.key {
                cmd = cmd.idempotency_key(key);
            }
            print_json(&engine.complete_task(cmd).await?)?;
        }
        Command::Skip { task_id } => print_json(&engine.skip_task(user, task_id).await?)?,
        Command::Delete { task_id } => {
            engine.delete_task(user, task_id).await?;
            tracing::info!(%task_id, "quest deleted");
        }
        Command::AddTask(args) => {
            let date = args.date.unwrap_or_else(today);
            let mut cmd = NewTaskCmd::new(user, date, args.title, args.axis).tier(args.tier);
            if let Some(minutes) = args.minutes {
                cmd = cmd.estimated_minutes(minutes);
            }
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            print_json(&engine.add_task(cmd).await?)?;
        }
        Command::Series(SeriesArgs { command }) => match command {
            SeriesCommand::Add(args) => {
                let start = args.start.unwrap_or_else(today);
                let mut cmd = NewSeriesCmd::new(user, args.title, args.axis, args.rule, start)
                    .tier(args.tier)
                    .estimated_minutes(args.minutes)
                    .selected_days(args.days);
                if let Some(n) = args.per_week {
                    cmd = cmd.n_per_week(n);
                }
                print_json(&engine.create_series(cmd).await?)?;
            }
            SeriesCommand::List => print_json(&engine.list_series(user).await?)?,
            SeriesCommand::Remove { series_id } => {
                engine.delete_series(user, series_id).await?;
                tracing::info!(%series_id, "series removed");
            }
        },
        Command::Shop(ShopArgs { command }) => match command {
            ShopCommand::List { axis, slot } => {
                print_json(&engine.shop_items(user, axis, slot).await?)?;
            }
            ShopCommand::Add(args) => {
                let mut cmd = NewShopItemCmd::new(args.name, args.slot, args.currency, args.price)
                    .rarity(args.rarity)
                    .description(args.description);
                if let Some(axis) = args.axis {
                    cmd = cmd.axis(axis);
                }
                print_json(&engine.new_shop_item(cmd).await?)?;
            }
        },
        Command::Purchase { item_id, key } => {
            let mut cmd = PurchaseCmd::new(user, item_id, Utc::now());
            if let Some(key) = key {
                cmd = cmd.idempotency_key(key);
            }
            print_json(&engine.purchase_item(cmd).await?)?;
        }
        Command::Equip { item_id, slot } => {
            print_json(&engine.equip_item(user, item_id, slot).await?)?;
        }
        Command::State => print_json(&engine.user_state(user).await?)?,
        Command::Ledger => print_json(&engine.ledger_entries(user).await?)?,
        Command::Replay => {
            let replayed = engine.replay_ledger(user).await?;
            let stored = engine.user_state(user).await?;
            if replayed != stored {
                tracing::error!("ledger replay disagrees with stored snapshots");
                print_json(&serde_json::json!({ "stored": stored, "replayed": replayed }))?;
                std::process::exit(1);
            }
            print_json(&replayed)?;
        }
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
