// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod claim;
pub mod completion;
pub mod ledger;
pub mod quests;

pub use catalog::QuestCatalog;
pub use claim::ClaimService;
pub use completion::CompletionTracker;
pub use ledger::PointsLedger;
pub use quests::{CompletionResult, QuestService};
