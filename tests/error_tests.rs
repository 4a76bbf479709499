// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use bonsai_quests::db::StoreError;
use bonsai_quests::error::AppError;

mod common;
use common::read_json;

#[tokio::test]
async fn test_client_errors_carry_details() {
    let cases = [
        (
            AppError::InvalidPayload("Missing fid".to_string()),
            StatusCode::BAD_REQUEST,
            "invalid_payload",
        ),
        (
            AppError::UnknownQuest("ghost".to_string()),
            StatusCode::BAD_REQUEST,
            "unknown_quest",
        ),
        (
            AppError::Forbidden("Seeding is disabled in production".to_string()),
            StatusCode::FORBIDDEN,
            "forbidden",
        ),
    ];

    for (err, status, code) in cases {
        let response = err.into_response();
        assert_eq!(response.status(), status);
        let body = read_json(response).await;
        assert_eq!(body["error"], code);
        assert!(body["details"].is_string());
    }
}

#[tokio::test]
async fn test_unauthorized_has_no_details() {
    let response = AppError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "unauthorized"})
    );
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let store: AppError = StoreError::Unavailable("connection refused to 10.0.0.3".to_string()).into();
    let response = store.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "store_unavailable"})
    );

    let internal: AppError = anyhow::anyhow!("rng exploded").into();
    let response = internal.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        serde_json::json!({"error": "internal_error"})
    );
}

#[test]
fn test_store_errors_all_map_to_store_unavailable() {
    for err in [
        StoreError::Unavailable("down".to_string()),
        StoreError::Unsupported("incr_by"),
        StoreError::Corrupt {
            key: "k".to_string(),
            reason: "not an integer".to_string(),
        },
    ] {
        assert!(matches!(AppError::from(err), AppError::StoreUnavailable(_)));
    }
}
