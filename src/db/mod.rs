//! Storage layer: a small key-value contract and its backends.
//!
//! Every piece of persistent state (ledger, catalog, completion sets) lives
//! behind [`KvStore`]. Only `incr_by` and `sadd` are atomic per key; callers
//! that read-modify-write through `get`/`set` accept last-write-wins.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

const PRODUCT: &str = "bonsai";
const SCHEMA_VERSION: &str = "v1";

/// Entity names used as the fourth key segment.
pub mod entities {
    pub const POINTS: &str = "points";
    pub const QUESTS: &str = "quests";
}

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend not configured or unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backend lacks the requested primitive.
    #[error("operation not supported by store: {0}")]
    Unsupported(&'static str),

    /// A stored value has the wrong shape for the operation.
    #[error("corrupt value at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Minimal key-value contract the services are written against.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value; `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a value unconditionally.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Atomically add `delta` to an integer value (missing counts as 0) and
    /// return the new total.
    ///
    /// Backends without a native counter return [`StoreError::Unsupported`].
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    /// Add `member` to the set at `key`; `true` only for the call that
    /// actually inserted it.
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// All members of the set at `key` (empty when missing).
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;
}

/// Builds `<product>:<version>:<environment>:<entity>:<discriminator>` keys.
///
/// Deployments sharing one store instance stay isolated by environment.
#[derive(Debug, Clone)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(environment: &str) -> Self {
        Self {
            prefix: format!("{}:{}:{}", PRODUCT, SCHEMA_VERSION, environment),
        }
    }

    /// Ledger balance for one user.
    pub fn points(&self, fid: &str) -> String {
        format!("{}:{}:{}", self.prefix, entities::POINTS, fid)
    }

    /// The single catalog record.
    pub fn quest_catalog(&self) -> String {
        format!("{}:{}:tasks", self.prefix, entities::QUESTS)
    }

    /// Completion set for one user.
    pub fn completed_quests(&self, fid: &str) -> String {
        format!("{}:{}:done:{}", self.prefix, entities::QUESTS, fid)
    }
}
