// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod quest;

pub use quest::{Quest, QuestInput, QuestView};
