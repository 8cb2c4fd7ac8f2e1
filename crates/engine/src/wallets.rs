//! The module contains `Wallet` struct and its snapshot entity.

use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// A user's currency balances.
///
/// Balances are never negative: every change goes through [`Wallet::apply`],
/// which rejects a delta that would overdraw a currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub gold: i64,
    pub diamond: i64,
}

impl Wallet {
    #[must_use]
    pub fn balance(&self, currency: Currency) -> i64 {
        match currency {
            Currency::Gold => self.gold,
            Currency::Diamond => self.diamond,
        }
    }

    /// Return the wallet after adding `delta` to `currency`.
    pub fn apply(self, currency: Currency, delta: i64) -> ResultEngine<Self> {
        let balance = self.balance(currency);
        let new_balance = balance.checked_add(delta).ok_or_else(|| {
            EngineError::InvalidValue(format!("{currency} balance overflow"))
        })?;
        if new_balance < 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "{currency} balance is {balance}, required {}",
                -delta
            )));
        }
        let mut wallet = self;
        match currency {
            Currency::Gold => wallet.gold = new_balance,
            Currency::Diamond => wallet.diamond = new_balance,
        }
        Ok(wallet)
    }

    /// Credit a delta without the overdraft check, used when rebuilding
    /// balances from ledger history.
    pub(crate) fn credit(&mut self, currency: Currency, delta: i64) {
        match currency {
            Currency::Gold => self.gold += delta,
            Currency::Diamond => self.diamond += delta,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub gold: i64,
    pub diamond: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Wallet {
    fn from(model: Model) -> Self {
        Self {
            gold: model.gold,
            diamond: model.diamond,
        }
    }
}

pub(crate) fn active_model(user_id: &str, wallet: &Wallet, at: DateTime<Utc>) -> ActiveModel {
    ActiveModel {
        user_id: ActiveValue::Set(user_id.to_string()),
        gold: ActiveValue::Set(wallet.gold),
        diamond: ActiveValue::Set(wallet.diamond),
        updated_at: ActiveValue::Set(at),
    }
}
