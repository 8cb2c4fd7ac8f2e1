use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, LedgerEntry, LedgerResource, Progress, ResultEngine, UserState, ledger,
    total_experience,
};

use super::{Engine, snapshots::load_snapshots, with_tx};

impl Engine {
    /// Current snapshots of a user. Users with no history get the defaults.
    pub async fn user_state(&self, user_id: &str) -> ResultEngine<UserState> {
        with_tx!(self, |db_tx| load_snapshots(&db_tx, user_id).await)
    }

    /// Every ledger entry of a user, in commit order.
    pub async fn ledger_entries(&self, user_id: &str) -> ResultEngine<Vec<LedgerEntry>> {
        with_tx!(self, |db_tx| {
            ledger::Entity::find()
                .filter(ledger::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(ledger::Column::Seq)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(LedgerEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Rebuild a user's snapshots from the ledger alone.
    ///
    /// The result equals [`Engine::user_state`] as long as every snapshot
    /// change went through the ledger.
    pub async fn replay_ledger(&self, user_id: &str) -> ResultEngine<UserState> {
        let entries = self.ledger_entries(user_id).await?;
        replay(&entries)
    }
}

fn replay(entries: &[LedgerEntry]) -> ResultEngine<UserState> {
    let mut state = UserState::default();
    let mut earned = 0;
    for entry in entries {
        match entry.resource {
            LedgerResource::Currency { currency } => state.wallet.credit(currency, entry.delta),
            LedgerResource::Experience => {
                earned += entry.delta;
                state.progress = Progress::from(state.progress.gain(entry.delta));
                if entry.level_after.is_some_and(|level| level != state.progress.level) {
                    return Err(EngineError::Conflict(format!(
                        "ledger entry {} disagrees with the level curve",
                        entry.seq
                    )));
                }
            }
            LedgerResource::Axis { axis } => state.axis_scores.add(axis, entry.delta),
        }
    }
    // Experience is never spent, so the curve position must account for
    // every earned point.
    let on_curve = total_experience(state.progress.level, state.progress.experience);
    if on_curve != earned {
        return Err(EngineError::Conflict(format!(
            "ledger earned {earned} experience but replay reached {on_curve}"
        )));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{Axis, Currency, LedgerRef};

    fn entry(resource: LedgerResource, delta: i64, balance_after: i64) -> LedgerEntry {
        LedgerEntry::new(
            "alice",
            LedgerRef::completion(Uuid::new_v4()),
            resource,
            delta,
            balance_after,
            Utc::now(),
        )
    }

    #[test]
    fn replay_folds_every_resource() {
        let entries = vec![
            entry(
                LedgerResource::Currency {
                    currency: Currency::Gold,
                },
                50,
                50,
            ),
            entry(LedgerResource::Experience, 90, 90).level_after(1),
            entry(LedgerResource::Axis { axis: Axis::Focus }, 4, 4),
            entry(
                LedgerResource::Currency {
                    currency: Currency::Gold,
                },
                -30,
                20,
            ),
            entry(LedgerResource::Experience, 30, 20).level_after(2),
        ];
        let state = replay(&entries).unwrap();
        assert_eq!(state.wallet.gold, 20);
        assert_eq!(state.progress.level, 2);
        assert_eq!(state.progress.experience, 20);
        assert_eq!(state.progress.experience_to_next, 120);
        assert_eq!(state.axis_scores.focus, 4);
    }

    #[test]
    fn replay_accounts_for_every_experience_point() {
        // 100 + 120 to reach level 3, then 44 into it.
        let entries = vec![
            entry(LedgerResource::Experience, 180, 80).level_after(2),
            entry(LedgerResource::Experience, 84, 44).level_after(3),
        ];
        let state = replay(&entries).unwrap();
        assert_eq!(state.progress.level, 3);
        assert_eq!(state.progress.experience, 44);
        assert_eq!(
            total_experience(state.progress.level, state.progress.experience),
            264
        );
    }

    #[test]
    fn negative_experience_is_drift() {
        let entries = vec![entry(LedgerResource::Experience, -10, 0)];
        assert_eq!(replay(&entries).unwrap_err().code(), "CONFLICT");
    }

    #[test]
    fn replay_detects_level_drift() {
        let entries = vec![entry(LedgerResource::Experience, 10, 10).level_after(3)];
        assert_eq!(replay(&entries).unwrap_err().code(), "CONFLICT");
    }
}
