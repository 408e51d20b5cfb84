//! Ledger of transfer idempotency keys.
//!
//! A key is claimed with a `pending` row before the payment network is
//! called. The row is completed with the transfer location on success and
//! released on failure, so the same key can be retried. A pending row left
//! behind by a crashed request can be reclaimed after [`PENDING_TTL_MINUTES`], and
//! completed rows are pruned once the payment network stops deduplicating.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The key was unused; the caller owns it now.
    New,
    /// The key already produced a transfer at this location.
    Replay(String),
}

/// Stable digest of the request fields a key is bound to.
pub fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// A pending claim older than this is treated as abandoned.
pub const PENDING_TTL_MINUTES: i64 = 10;

/// Completed keys are kept as long as the payment network deduplicates them.
pub const COMPLETED_RETENTION_HOURS: i64 = 24;

/// Key forwarded to the payment network. Every user shares one platform
/// credential upstream, so the caller's key is bound to the user first.
pub fn upstream_key(user_id: &str, key: &str) -> String {
    fingerprint(&[user_id, key])
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn claim(pool: &DbPool, user_id: &str, key: &str, fingerprint: &str) -> AppResult<Claim> {
    claim_at(pool, user_id, key, fingerprint, Utc::now())
}

fn claim_at(
    pool: &DbPool,
    user_id: &str,
    key: &str,
    fingerprint: &str,
    at: DateTime<Utc>,
) -> AppResult<Claim> {
    let conn = pool.get()?;
    let now = timestamp(at);

    let pruned = conn.execute(
        "DELETE FROM idempotency_keys WHERE status = 'completed' AND updated_at < ?1",
        rusqlite::params![timestamp(at - Duration::hours(COMPLETED_RETENTION_HOURS))],
    )?;
    if pruned > 0 {
        tracing::debug!("Pruned {pruned} expired idempotency keys");
    }

    let result = conn.execute(
        "INSERT INTO idempotency_keys (user_id, key, fingerprint, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, 'pending', ?4, ?4)",
        rusqlite::params![user_id, key, fingerprint, now],
    );

    match result {
        Ok(_) => return Ok(Claim::New),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation => {}
        Err(e) => return Err(AppError::Database(e)),
    }

    let (stored_fingerprint, status, location): (String, String, Option<String>) = conn
        .query_row(
            "SELECT fingerprint, status, location FROM idempotency_keys WHERE user_id = ?1 AND key = ?2",
            rusqlite::params![user_id, key],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

    if stored_fingerprint != fingerprint {
        return Err(AppError::Conflict(
            "Idempotency key was already used for a different transfer".to_string(),
        ));
    }

    if let ("completed", Some(location)) = (status.as_str(), location) {
        return Ok(Claim::Replay(location));
    }

    let reclaimed = conn.execute(
        "UPDATE idempotency_keys SET updated_at = ?1
         WHERE user_id = ?2 AND key = ?3 AND status = 'pending' AND updated_at < ?4",
        rusqlite::params![now, user_id, key, timestamp(at - Duration::minutes(PENDING_TTL_MINUTES))],
    )?;
    if reclaimed == 1 {
        tracing::warn!("Reclaimed abandoned idempotency key {key} for user {user_id}");
        return Ok(Claim::New);
    }

    Err(AppError::Conflict(
        "A transfer with this idempotency key is already in progress".to_string(),
    ))
}

pub fn complete(pool: &DbPool, user_id: &str, key: &str, location: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE idempotency_keys SET status = 'completed', location = ?1, updated_at = ?2
         WHERE user_id = ?3 AND key = ?4",
        rusqlite::params![location, timestamp(Utc::now()), user_id, key],
    )?;
    Ok(())
}

pub fn release(pool: &DbPool, user_id: &str, key: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "DELETE FROM idempotency_keys WHERE user_id = ?1 AND key = ?2 AND status = 'pending'",
        rusqlite::params![user_id, key],
    )?;
    Ok(())
}
