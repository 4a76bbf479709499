// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player-facing quest routes.

use crate::error::{AppError, Result};
use crate::models::{Quest, QuestView};
use crate::routes::points::FidQuery;
use crate::routes::require_fid;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/quests", get(list_quests))
        .route("/api/quests/complete", post(complete_quest))
        .route("/api/quests/seed", post(seed_quests))
}

/// Catalog merged with the caller's completion flags.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuestsResponse {
    pub quests: Vec<QuestView>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteBody {
    #[serde(default, alias = "user")]
    fid: Option<serde_json::Value>,
    #[serde(default, alias = "taskId")]
    quest_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompleteResponse {
    pub ok: bool,
    pub already_completed: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: i64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SeedResponse {
    pub ok: bool,
    pub quests: Vec<Quest>,
}

/// List quests for a user.
async fn list_quests(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<FidQuery>, QueryRejection>,
) -> Result<Json<QuestsResponse>> {
    let Query(params) = query?;
    let fid = require_fid(params.fid.map(serde_json::Value::String))?;

    let quests = state.quest_service.list_for_user(&fid).await?;
    Ok(Json(QuestsResponse { quests }))
}

/// Mark a quest done and credit its points the first time.
async fn complete_quest(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CompleteBody>, JsonRejection>,
) -> Result<Json<CompleteResponse>> {
    let Json(body) = body?;
    let fid = require_fid(body.fid)?;
    let quest_id = body
        .quest_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidPayload("Missing questId".to_string()))?;

    let result = state.quest_service.complete_quest(&fid, &quest_id).await?;

    Ok(Json(CompleteResponse {
        ok: true,
        already_completed: result.already_completed,
        points: result.points,
    }))
}

/// Install the default quests. Development only.
async fn seed_quests(State(state): State<Arc<AppState>>) -> Result<Json<SeedResponse>> {
    if state.config.is_production() {
        return Err(AppError::Forbidden("Disabled in production".to_string()));
    }

    let quests = state.catalog.seed_defaults().await?;
    Ok(Json(SeedResponse { ok: true, quests }))
}
