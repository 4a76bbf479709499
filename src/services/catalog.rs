// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest catalog: the ordered list of quest definitions.
//!
//! The whole list is one store record. Every mutation reads the list,
//! changes it in memory and writes it back, so two admins saving at the same
//! moment race and the later write wins. Admin writes are rare enough that
//! this is accepted.

use crate::db::{KeySpace, KvStore};
use crate::error::{AppError, Result};
use crate::models::quest::{slugify, Quest, QuestInput};
use ring::rand::{SecureRandom, SystemRandom};
use std::collections::HashSet;
use std::sync::Arc;

/// Random suffix attempts before falling back to a numeric counter.
pub const MAX_SUFFIX_ATTEMPTS: usize = 5;
const SUFFIX_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of the random component of generated quest ids.
pub trait SuffixSource: Send + Sync {
    fn next_suffix(&self) -> Result<String>;
}

/// CSPRNG-backed suffixes.
pub struct RandomSuffix {
    rng: SystemRandom,
}

impl Default for RandomSuffix {
    fn default() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> Result<String> {
        let mut bytes = [0u8; SUFFIX_LEN];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        Ok(bytes
            .iter()
            .map(|b| BASE36[*b as usize % BASE36.len()] as char)
            .collect())
    }
}

/// Render a number in lowercase base 36.
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Build `<slug>-<base36 millis>-<suffix>` that no quest in `existing` uses.
///
/// Tries up to [`MAX_SUFFIX_ATTEMPTS`] random suffixes, then appends `-1`,
/// `-2`, ... to the last candidate until it is free.
pub fn generate_quest_id(
    title: &str,
    now_millis: u64,
    existing: &[Quest],
    suffixes: &dyn SuffixSource,
) -> Result<String> {
    let taken: HashSet<&str> = existing.iter().map(|q| q.id.as_str()).collect();
    let base = format!("{}-{}", slugify(title), to_base36(now_millis));

    let mut candidate = String::new();
    for _ in 0..MAX_SUFFIX_ATTEMPTS {
        candidate = format!("{}-{}", base, suffixes.next_suffix()?);
        if !taken.contains(candidate.as_str()) {
            return Ok(candidate);
        }
    }

    tracing::warn!(
        candidate = %candidate,
        attempts = MAX_SUFFIX_ATTEMPTS,
        "Quest id suffixes exhausted, using numeric fallback"
    );

    let mut counter = 1u64;
    loop {
        let numbered = format!("{}-{}", candidate, counter);
        if !taken.contains(numbered.as_str()) {
            return Ok(numbered);
        }
        counter += 1;
    }
}

/// Quests installed by the development seed endpoint.
pub fn default_quests() -> Vec<Quest> {
    vec![
        Quest {
            id: "follow_x".to_string(),
            title: "Follow X account".to_string(),
            link: "https://x.com/".to_string(),
            points: 100,
        },
        Quest {
            id: "follow_telegram".to_string(),
            title: "Follow Telegram account".to_string(),
            link: "https://t.me/".to_string(),
            points: 200,
        },
    ]
}

/// Catalog service.
#[derive(Clone)]
pub struct QuestCatalog {
    store: Arc<dyn KvStore>,
    keys: KeySpace,
    suffixes: Arc<dyn SuffixSource>,
}

impl QuestCatalog {
    pub fn new(store: Arc<dyn KvStore>, keys: KeySpace) -> Self {
        Self::with_suffix_source(store, keys, Arc::new(RandomSuffix::default()))
    }

    pub fn with_suffix_source(
        store: Arc<dyn KvStore>,
        keys: KeySpace,
        suffixes: Arc<dyn SuffixSource>,
    ) -> Self {
        Self {
            store,
            keys,
            suffixes,
        }
    }

    /// The stored list in insertion order.
    ///
    /// A record that is not a JSON array reads as an empty catalog (logged,
    /// not surfaced) so the quest screens stay up. Individual entries that
    /// are not valid quests are skipped.
    pub async fn list_quests(&self) -> Result<Vec<Quest>> {
        let key = self.keys.quest_catalog();
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    "Stored quest catalog is malformed, treating as empty"
                );
                return Ok(Vec::new());
            }
        };

        let total = entries.len();
        let quests: Vec<Quest> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();

        if quests.len() != total {
            tracing::warn!(
                key = %key,
                dropped = total - quests.len(),
                "Skipped malformed quest entries"
            );
        }

        Ok(quests)
    }

    /// Look up one quest by id.
    pub async fn find_quest(&self, id: &str) -> Result<Option<Quest>> {
        Ok(self.list_quests().await?.into_iter().find(|q| q.id == id))
    }

    /// Insert or replace a quest, returning it together with the new list.
    pub async fn upsert_quest(&self, input: &QuestInput) -> Result<(Quest, Vec<Quest>)> {
        let valid = input.validate_input()?;
        let mut quests = self.list_quests().await?;

        let id = match valid.id {
            Some(id) => id,
            None => {
                let now_millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
                generate_quest_id(&valid.title, now_millis, &quests, self.suffixes.as_ref())?
            }
        };

        let quest = Quest {
            id,
            title: valid.title,
            link: valid.link,
            points: valid.points,
        };

        match quests.iter_mut().find(|q| q.id == quest.id) {
            Some(existing) => *existing = quest.clone(),
            None => quests.push(quest.clone()),
        }

        self.save(&quests).await?;
        tracing::info!(quest_id = %quest.id, points = quest.points, "Quest saved");

        Ok((quest, quests))
    }

    /// Remove a quest by id. Unknown ids leave the list as it was.
    pub async fn delete_quest(&self, id: &str) -> Result<Vec<Quest>> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::InvalidPayload("Missing id".to_string()));
        }

        let mut quests = self.list_quests().await?;
        let before = quests.len();
        quests.retain(|q| q.id != id);

        self.save(&quests).await?;
        tracing::info!(
            quest_id = id,
            removed = before != quests.len(),
            "Quest delete processed"
        );

        Ok(quests)
    }

    /// Replace the catalog with [`default_quests`].
    pub async fn seed_defaults(&self) -> Result<Vec<Quest>> {
        let quests = default_quests();
        self.save(&quests).await?;
        tracing::info!(count = quests.len(), "Quest catalog seeded");
        Ok(quests)
    }

    async fn save(&self, quests: &[Quest]) -> Result<()> {
        let raw = serde_json::to_string(quests)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Catalog encode failed: {}", e)))?;
        self.store.set(&self.keys.quest_catalog(), &raw).await?;
        Ok(())
    }
}
