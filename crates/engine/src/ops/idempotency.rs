use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, prelude::*};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    idempotency::{self, IdempotentOperation},
    util::is_unique_violation,
};

const MAX_KEY_LEN: usize = 128;

/// Trim a caller-supplied key. Blank keys are rejected rather than ignored.
pub(super) fn normalize_key(key: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(key) = key else {
        return Ok(None);
    };
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidValue(
            "idempotency key must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_KEY_LEN {
        return Err(EngineError::InvalidValue(format!(
            "idempotency key must be at most {MAX_KEY_LEN} bytes"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Return the stored outcome of an earlier call made with `key`.
///
/// A key bound to a different operation or target is an error: the caller
/// reused it for a request it was never issued for.
pub(super) async fn replay_outcome<T: DeserializeOwned>(
    db: &DatabaseTransaction,
    user_id: &str,
    key: Option<&str>,
    operation: IdempotentOperation,
    target_id: Uuid,
) -> ResultEngine<Option<T>> {
    let Some(key) = key else {
        return Ok(None);
    };
    let Some(record) = idempotency::Entity::find_by_id((user_id.to_string(), key.to_string()))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let stored_operation = IdempotentOperation::try_from(record.operation.as_str())?;
    if stored_operation != operation || record.target_id != target_id.to_string() {
        return Err(EngineError::IdempotencyKeyReused(format!(
            "key \"{key}\" was used for {} on {}",
            stored_operation.as_str(),
            record.target_id
        )));
    }

    debug!(
        user_id,
        key,
        operation = operation.as_str(),
        event_id = %record.event_id,
        "replaying idempotent outcome"
    );
    Ok(Some(serde_json::from_str(&record.response)?))
}

/// Store `outcome` under `key` in the same transaction as the side effect.
#[allow(clippy::too_many_arguments)]
pub(super) async fn record_outcome<T: Serialize>(
    db: &DatabaseTransaction,
    user_id: &str,
    key: Option<&str>,
    operation: IdempotentOperation,
    target_id: Uuid,
    event_id: Uuid,
    outcome: &T,
    created_at: DateTime<Utc>,
) -> ResultEngine<()> {
    let Some(key) = key else {
        return Ok(());
    };
    let model = idempotency::ActiveModel {
        user_id: ActiveValue::Set(user_id.to_string()),
        key: ActiveValue::Set(key.to_string()),
        operation: ActiveValue::Set(operation.as_str().to_string()),
        target_id: ActiveValue::Set(target_id.to_string()),
        event_id: ActiveValue::Set(event_id.to_string()),
        response: ActiveValue::Set(serde_json::to_string(outcome)?),
        created_at: ActiveValue::Set(created_at),
    };
    idempotency::Entity::insert(model)
        .exec_without_returning(db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                EngineError::Conflict(format!("idempotency key \"{key}\" is already in use"))
            } else {
                err.into()
            }
        })?;
    Ok(())
}
