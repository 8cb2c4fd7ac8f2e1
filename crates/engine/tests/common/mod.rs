#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database};
use tempfile::TempDir;

use engine::{Axis, CompleteTaskCmd, Engine, NewTaskCmd, Quality, TaskInstance};
use migration::MigratorTrait;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

/// Engine over a fresh in-memory database. A single pooled connection keeps
/// every transaction on the same database.
pub async fn engine() -> Engine {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

/// Engine over a SQLite file in `dir` with a pool of several connections,
/// the way the binary runs.
pub async fn file_engine(dir: &TempDir) -> Engine {
    let path = dir.path().join("questlog.db");
    let mut options = ConnectOptions::new(format!("sqlite:{}?mode=rwc", path.display()));
    options.max_connections(8).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

/// 2024-01-01 is a Monday.
pub fn monday() -> NaiveDate {
    date(2024, 1, 1)
}

pub async fn add_task(engine: &Engine, user: &str, tier: i32, axis: Axis) -> TaskInstance {
    engine
        .add_task(NewTaskCmd::new(user, monday(), format!("tier {tier} quest"), axis).tier(tier))
        .await
        .unwrap()
}

pub fn complete(user: &str, task: &TaskInstance, quality: Quality) -> CompleteTaskCmd {
    CompleteTaskCmd::new(user, task.id, at(2024, 1, 1, 9))
        .quality(quality)
        .duration_minutes(20)
}

/// Earn exactly `10 * n` gold with tier-1 mid completions.
pub async fn earn_tens_of_gold(engine: &Engine, user: &str, n: usize) {
    for _ in 0..n {
        let task = add_task(engine, user, 1, Axis::Discipline).await;
        engine
            .complete_task(complete(user, &task, Quality::Mid))
            .await
            .unwrap();
    }
}
