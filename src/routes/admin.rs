// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin session and quest catalog management routes.

use crate::error::{AppError, Result};
use crate::middleware::admin_auth::password_matches;
use crate::models::{Quest, QuestInput};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Login/logout; reachable without credentials.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
}

/// Catalog management. The admin gate is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/admin/quests",
        get(list_quests).post(upsert_quest).delete(delete_quest),
    )
}

// ─── Session ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginBody {
    #[serde(default)]
    password: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub ok: bool,
    /// Bearer token (token mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OkResponse {
    pub ok: bool,
}

/// Exchange the admin password for a cookie or token.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: std::result::Result<Json<LoginBody>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let Json(body) = body?;
    let password = body.password.unwrap_or_default();
    let password = password.trim();

    if password.is_empty() {
        return Err(AppError::InvalidPayload("Password is required.".to_string()));
    }

    if !password_matches(&state.config.admin_password, password) {
        tracing::warn!("Admin login failed: incorrect password");
        return Err(AppError::Unauthorized);
    }

    let (jar, token) = state.admin_auth.issue(jar)?;
    tracing::info!(mode = ?state.admin_auth.mode(), "Admin logged in");

    Ok((jar, Json(LoginResponse { ok: true, token })))
}

/// Drop the admin session.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    (state.admin_auth.revoke(jar), Json(OkResponse { ok: true }))
}

// ─── Catalog ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AdminQuestsResponse {
    pub quests: Vec<Quest>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpsertQuestResponse {
    pub ok: bool,
    pub quest: Quest,
    pub quests: Vec<Quest>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteQuestResponse {
    pub ok: bool,
    pub quests: Vec<Quest>,
}

#[derive(Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    id: Option<String>,
}

async fn list_quests(State(state): State<Arc<AppState>>) -> Result<Json<AdminQuestsResponse>> {
    let quests = state.catalog.list_quests().await?;
    Ok(Json(AdminQuestsResponse { quests }))
}

/// Create a quest, or replace the one with the same id.
async fn upsert_quest(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<QuestInput>, JsonRejection>,
) -> Result<Json<UpsertQuestResponse>> {
    let Json(input) = body?;
    let (quest, quests) = state.catalog.upsert_quest(&input).await?;

    Ok(Json(UpsertQuestResponse {
        ok: true,
        quest,
        quests,
    }))
}

/// Delete a quest by id; unknown ids are not an error.
async fn delete_quest(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Json<DeleteQuestResponse>> {
    let Query(params) = query?;
    let quests = state
        .catalog
        .delete_quest(params.id.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(DeleteQuestResponse { ok: true, quests }))
}
