// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed key-value store.
//!
//! Layout:
//! - `kv/{urlencoded key}`: `{ value, count }`. Plain values live in `value`;
//!   integer values are mirrored into `count` so they can be incremented with
//!   a server-side field transform.
//! - `kv_set_members/{urlencoded key}|{urlencoded member}`: one document per
//!   set member. Members are created with a create-only insert, so an
//!   "already exists" conflict is the atomic "not new" answer.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use serde::{Deserialize, Serialize};

/// Collection names as constants.
pub mod collections {
    pub const KV: &str = "kv";
    pub const SET_MEMBERS: &str = "kv_set_members";
}

/// One `kv` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KvDocument {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    count: Option<i64>,
}

impl KvDocument {
    fn from_value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            count: value.trim().parse().ok(),
        }
    }

    /// Counter wins: after a transform only `count` is current.
    fn into_value(self) -> Option<String> {
        self.count.map(|c| c.to_string()).or(self.value)
    }
}

/// One member of one set.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SetMemberDocument {
    set_key: String,
    member: String,
}

fn kv_doc_id(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn member_doc_id(key: &str, member: &str) -> String {
    format!("{}|{}", urlencoding::encode(key), urlencoding::encode(member))
}

fn unavailable(e: FirestoreError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Firestore store client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an unconnected client; every operation fails with `Unavailable`.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("Firestore not connected (offline mode)".into()))
    }

    async fn read_document(&self, key: &str) -> Result<Option<KvDocument>, StoreError> {
        self.client()?
            .fluent()
            .select()
            .by_id_in(collections::KV)
            .obj()
            .one(&kv_doc_id(key))
            .await
            .map_err(unavailable)
    }
}

#[async_trait]
impl KvStore for FirestoreStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .read_document(key)
            .await?
            .and_then(KvDocument::into_value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _: () = self
            .client()?
            .fluent()
            .update()
            .in_col(collections::KV)
            .document_id(kv_doc_id(key))
            .object(&KvDocument::from_value(value))
            .execute()
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    /// Server-side `increment` transform, committed on its own.
    ///
    /// The total is read back after the commit, so under concurrent writers it
    /// may already include increments that landed after ours.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let client = self.client()?;
        let doc_id = kv_doc_id(key);

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::KV)
            .document_id(&doc_id)
            .transforms(|t| t.fields([t.field("count").increment(delta)]))
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                StoreError::Unavailable(format!("Failed to add increment to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Increment commit failed: {}", e)))?;

        self.read_document(key)
            .await?
            .and_then(|doc| doc.count)
            .ok_or_else(|| StoreError::Corrupt {
                key: key.to_string(),
                reason: "counter missing after increment".to_string(),
            })
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let doc = SetMemberDocument {
            set_key: key.to_string(),
            member: member.to_string(),
        };

        let inserted: Result<(), FirestoreError> = self
            .client()?
            .fluent()
            .insert()
            .into(collections::SET_MEMBERS)
            .document_id(member_doc_id(key, member))
            .object(&doc)
            .execute()
            .await;

        match inserted {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => Ok(false),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let set_key = key.to_string();
        let docs: Vec<SetMemberDocument> = self
            .client()?
            .fluent()
            .select()
            .from(collections::SET_MEMBERS)
            .filter(move |q| q.for_all([q.field("set_key").eq(set_key.clone())]))
            .obj()
            .query()
            .await
            .map_err(unavailable)?;

        Ok(docs.into_iter().map(|d| d.member).collect())
    }
}
