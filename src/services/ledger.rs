// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points ledger: one integer balance per user.

use crate::db::{KeySpace, KvStore, StoreError};
use crate::error::{AppError, Result};
use std::sync::Arc;

/// Per-user points balance backed by the store's atomic counter.
#[derive(Clone)]
pub struct PointsLedger {
    store: Arc<dyn KvStore>,
    keys: KeySpace,
}

impl PointsLedger {
    pub fn new(store: Arc<dyn KvStore>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    /// Current balance; 0 when the user has never earned anything.
    pub async fn get_points(&self, fid: &str) -> Result<i64> {
        let raw = self.store.get(&self.keys.points(fid)).await?;
        Ok(parse_balance(raw.as_deref()))
    }

    /// Add `delta` and return the new total.
    pub async fn increment_points(&self, fid: &str, delta: i64) -> Result<i64> {
        if delta < 0 {
            return Err(AppError::InvalidPayload(
                "increment must not be negative".to_string(),
            ));
        }

        let key = self.keys.points(fid);
        match self.store.incr_by(&key, delta).await {
            Ok(total) => Ok(total),
            Err(StoreError::Unsupported(op)) => {
                tracing::warn!(
                    fid,
                    delta,
                    op,
                    "Store has no atomic increment; falling back to read-then-write (concurrent updates may be lost)"
                );
                self.increment_by_read_write(&key, delta).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Degraded path: two concurrent callers can both read the same balance
    /// and one increment is lost.
    async fn increment_by_read_write(&self, key: &str, delta: i64) -> Result<i64> {
        let current = parse_balance(self.store.get(key).await?.as_deref());
        let next = current.saturating_add(delta);
        self.store.set(key, &next.to_string()).await?;
        Ok(next)
    }

    /// Overwrite the balance with 0. Idempotent.
    pub async fn reset_points(&self, fid: &str) -> Result<()> {
        self.store.set(&self.keys.points(fid), "0").await?;
        tracing::info!(fid, "Points reset");
        Ok(())
    }
}

/// Anything that is not an integer reads as 0. Same rule the stores apply
/// in `incr_by`.
fn parse_balance(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(0)
}
