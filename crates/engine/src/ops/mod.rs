use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod audit;
mod completion;
mod idempotency;
mod plans;
mod series;
mod shop;
mod snapshots;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// SQLite starts transactions deferred: a transaction that has read and then
/// meets another connection's write lock fails with `SQLITE_BUSY`. Such a
/// block is rolled back and run again in a fresh transaction, which then
/// observes what the other writer committed.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let mut attempt: u32 = 0;
        loop {
            let $tx = $self.database.begin().await?;
            let result = $body;
            let result = match result {
                Ok(value) => $tx
                    .commit()
                    .await
                    .map(|()| value)
                    .map_err($crate::EngineError::from),
                Err(err) => {
                    $tx.rollback().await?;
                    Err(err)
                }
            };
            match result {
                Err(err) if err.is_busy() && attempt < $crate::ops::BUSY_RETRIES => {
                    attempt += 1;
                    ::tracing::debug!(attempt, "database locked, retrying transaction");
                    ::tokio::time::sleep($crate::ops::busy_backoff(attempt)).await;
                }
                result => break result,
            }
        }
    }};
}

pub(crate) use with_tx;

/// Attempts after the first before a locked database is reported.
pub(crate) const BUSY_RETRIES: u32 = 8;

/// Wait before retry `attempt`: 10ms doubling, capped at 640ms.
pub(crate) fn busy_backoff(attempt: u32) -> Duration {
    Duration::from_millis(5 << attempt.clamp(1, 7))
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
