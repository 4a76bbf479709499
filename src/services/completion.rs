// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user set of completed quest ids.

use crate::db::{KeySpace, KvStore};
use crate::error::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Completion sets only ever grow.
#[derive(Clone)]
pub struct CompletionTracker {
    store: Arc<dyn KvStore>,
    keys: KeySpace,
}

impl CompletionTracker {
    pub fn new(store: Arc<dyn KvStore>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    pub async fn is_completed(&self, fid: &str, quest_id: &str) -> Result<bool> {
        Ok(self.completed(fid).await?.contains(quest_id))
    }

    /// Record a completion. Returns `true` only for the call that added it;
    /// the answer comes from the store's set-add, never a separate check.
    pub async fn mark_completed(&self, fid: &str, quest_id: &str) -> Result<bool> {
        Ok(self
            .store
            .sadd(&self.keys.completed_quests(fid), quest_id)
            .await?)
    }

    /// Every quest id the user has completed.
    pub async fn completed(&self, fid: &str) -> Result<HashSet<String>> {
        Ok(self
            .store
            .smembers(&self.keys.completed_quests(fid))
            .await?
            .into_iter()
            .collect())
    }
}
