// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest completion: award a quest's points at most once per user.
//!
//! Handles the core workflow:
//! 1. Resolve the quest in the current catalog
//! 2. Add it to the user's completion set
//! 3. Credit the points only if that add was the first
//!
//! Duplicate or retried requests land on step 3's "already there" branch and
//! just read the balance back.

use crate::error::{AppError, Result};
use crate::models::{Quest, QuestView};
use crate::services::{CompletionTracker, PointsLedger, QuestCatalog};

/// Outcome of a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionResult {
    pub already_completed: bool,
    pub points: i64,
}

/// Orchestrates catalog, tracker and ledger.
#[derive(Clone)]
pub struct QuestService {
    catalog: QuestCatalog,
    tracker: CompletionTracker,
    ledger: PointsLedger,
}

impl QuestService {
    pub fn new(catalog: QuestCatalog, tracker: CompletionTracker, ledger: PointsLedger) -> Self {
        Self {
            catalog,
            tracker,
            ledger,
        }
    }

    /// Complete `quest_id` for `fid`.
    ///
    /// Once the quest is resolved, the set-add and the credit run on their
    /// own task. Dropping the returned future (client disconnect, timeout)
    /// cannot separate the two steps.
    pub async fn complete_quest(&self, fid: &str, quest_id: &str) -> Result<CompletionResult> {
        let quest = self
            .catalog
            .find_quest(quest_id)
            .await?
            .ok_or_else(|| AppError::UnknownQuest(quest_id.to_string()))?;

        let service = self.clone();
        let fid = fid.to_string();
        tokio::spawn(async move { service.record_completion(&fid, &quest).await })
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Completion task failed: {}", e)))?
    }

    async fn record_completion(&self, fid: &str, quest: &Quest) -> Result<CompletionResult> {
        let quest_id = quest.id.as_str();
        let newly_added = self.tracker.mark_completed(fid, quest_id).await?;

        if !newly_added {
            let points = self.ledger.get_points(fid).await?;
            tracing::debug!(fid, quest_id, "Quest already completed");
            return Ok(CompletionResult {
                already_completed: true,
                points,
            });
        }

        let points = match self.ledger.increment_points(fid, quest.points).await {
            Ok(points) => points,
            Err(e) => {
                tracing::error!(
                    fid,
                    quest_id,
                    points = quest.points,
                    error = %e,
                    "Quest marked completed but points were not credited"
                );
                return Err(e);
            }
        };

        tracing::info!(
            fid,
            quest_id,
            awarded = quest.points,
            total = points,
            "Quest completed"
        );
        Ok(CompletionResult {
            already_completed: false,
            points,
        })
    }

    /// The catalog annotated with this user's completion flags.
    pub async fn list_for_user(&self, fid: &str) -> Result<Vec<QuestView>> {
        let quests = self.catalog.list_quests().await?;
        let completed = self.tracker.completed(fid).await?;

        Ok(quests
            .into_iter()
            .map(|q| {
                let done = completed.contains(&q.id);
                QuestView::new(q, done)
            })
            .collect())
    }
}
