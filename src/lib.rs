// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bonsai Quests: tap-to-earn points ledger and quest backend
//!
//! This crate provides the backend API for the Bonsai mini app: a per-user
//! points ledger fed by taps and quest completions, an admin-managed quest
//! catalog, and the ledger reset that follows an on-chain token claim.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{KeySpace, KvStore};
use middleware::admin_auth::AdminAuthStrategy;
use services::{ClaimService, CompletionTracker, PointsLedger, QuestCatalog, QuestService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub ledger: PointsLedger,
    pub catalog: QuestCatalog,
    pub quest_service: QuestService,
    pub claim_service: ClaimService,
    pub admin_auth: Arc<dyn AdminAuthStrategy>,
}

impl AppState {
    /// Wire every service onto one store client.
    ///
    /// The store is owned by the caller (normally `main`), which decides the
    /// backend and keeps the connection alive for the life of the process.
    pub fn new(config: Config, store: Arc<dyn KvStore>) -> Self {
        let keys = KeySpace::new(&config.environment);
        let ledger = PointsLedger::new(store.clone(), keys.clone());
        let catalog = QuestCatalog::new(store.clone(), keys.clone());
        let tracker = CompletionTracker::new(store, keys);
        let quest_service = QuestService::new(catalog.clone(), tracker, ledger.clone());
        let claim_service = ClaimService::new(ledger.clone());
        let admin_auth = middleware::admin_auth::strategy_from_config(&config);

        Self {
            config,
            ledger,
            catalog,
            quest_service,
            claim_service,
            admin_auth,
        }
    }
}
