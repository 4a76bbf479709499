// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points ledger routes: read, tap, and the post-claim reset.

use crate::error::Result;
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
        .route("/api/points", get(get_points))
        .route("/api/points/increment", post(increment_points))
        .route("/api/points/reset", post(reset_points))
}

#[derive(Deserialize)]
pub(crate) struct FidQuery {
    #[serde(default, alias = "user")]
    pub fid: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct FidBody {
    #[serde(default, alias = "user")]
    pub fid: Option<serde_json::Value>,
}

/// Current balance.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PointsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: i64,
}

/// Balance after a claim reset.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResetResponse {
    pub ok: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: i64,
}

/// Get a user's balance.
async fn get_points(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<FidQuery>, QueryRejection>,
) -> Result<Json<PointsResponse>> {
    let Query(params) = query?;
    let fid = require_fid(params.fid.map(serde_json::Value::String))?;

    let points = state.ledger.get_points(&fid).await?;
    Ok(Json(PointsResponse { points }))
}

/// One tap: +1 point.
async fn increment_points(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<FidBody>, JsonRejection>,
) -> Result<Json<PointsResponse>> {
    let Json(body) = body?;
    let fid = require_fid(body.fid)?;

    let points = state.ledger.increment_points(&fid, 1).await?;
    tracing::debug!(fid = %fid, points, "Tap recorded");
    Ok(Json(PointsResponse { points }))
}

/// Called by the client once its claim transaction has confirmed.
async fn reset_points(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<FidBody>, JsonRejection>,
) -> Result<Json<ResetResponse>> {
    let Json(body) = body?;
    let fid = require_fid(body.fid)?;

    tracing::info!(fid = %fid, "Claim reported, resetting points");
    let points = state.claim_service.reset_after_claim(&fid).await?;
    Ok(Json(ResetResponse { ok: true, points }))
}
