// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Quest definitions and the admin upsert payload.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Longest slug kept from a title when generating ids.
pub const MAX_SLUG_LEN: usize = 40;

/// Largest point value the web client can represent exactly.
pub const MAX_QUEST_POINTS: f64 = 9_007_199_254_740_991.0;

/// A quest as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Quest {
    /// Stable unique id, e.g. "follow_x"
    pub id: String,
    /// Label shown in the UI
    pub title: String,
    /// Destination URL
    pub link: String,
    /// Points awarded on first completion
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: i64,
}

/// A quest merged with one user's completion state.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuestView {
    pub id: String,
    pub title: String,
    pub link: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: i64,
    pub completed: bool,
}

impl QuestView {
    pub fn new(quest: Quest, completed: bool) -> Self {
        Self {
            id: quest.id,
            title: quest.title,
            link: quest.link,
            points: quest.points,
            completed,
        }
    }
}

/// Raw admin payload. Every field is optional so that missing and malformed
/// values are reported as `InvalidPayload` rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Number or numeric string (form inputs send strings).
    #[serde(default)]
    pub points: Option<serde_json::Value>,
}

#[derive(Debug, Validate)]
struct QuestDraft {
    #[validate(length(min = 1, message = "title is required"))]
    title: String,
    #[validate(length(min = 1, message = "link is required"))]
    link: String,
    #[validate(range(min = 0.0, max = MAX_QUEST_POINTS, message = "points out of range"))]
    points: f64,
}

/// Admin payload after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuestInput {
    /// Explicit id, if a non-blank one was supplied.
    pub id: Option<String>,
    pub title: String,
    pub link: String,
    pub points: i64,
}

impl QuestInput {
    /// Trim and check the payload.
    pub fn validate_input(&self) -> Result<ValidQuestInput, AppError> {
        let points = parse_points(self.points.as_ref())?;

        let draft = QuestDraft {
            title: trimmed(self.title.as_deref()),
            link: trimmed(self.link.as_deref()),
            points,
        };
        draft
            .validate()
            .map_err(|e| AppError::InvalidPayload(e.to_string()))?;

        if draft.points.fract() != 0.0 {
            return Err(AppError::InvalidPayload(
                "points must be a whole number".to_string(),
            ));
        }

        let id = Some(trimmed(self.id.as_deref())).filter(|id| !id.is_empty());

        Ok(ValidQuestInput {
            id,
            title: draft.title,
            link: draft.link,
            points: draft.points as i64,
        })
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_string()
}

fn parse_points(value: Option<&serde_json::Value>) -> Result<f64, AppError> {
    let invalid = || AppError::InvalidPayload("points must be a number".to_string());

    let points = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().ok_or_else(invalid)?,
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if !points.is_finite() {
        return Err(invalid());
    }
    Ok(points)
}

/// Lowercase, collapse every run of non-alphanumerics to one `-`, trim the
/// ends and cap the length. Falls back to `quest` for titles with no usable
/// characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        "quest".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> QuestInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Join Discord"), "join-discord");
        assert_eq!(slugify("  Follow @X -- now!  "), "follow-x-now");
        assert_eq!(slugify("Ünïcode ☃ only"), "n-code-only");
        assert_eq!(slugify("!!!"), "quest");
        assert_eq!(slugify(""), "quest");
    }

    #[test]
    fn test_slugify_caps_length_without_trailing_hyphen() {
        let title = format!("{} tail", "a".repeat(MAX_SLUG_LEN - 1));
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_valid_payload_is_trimmed() {
        let valid = input(json!({
            "id": "  ",
            "title": " Join Discord ",
            "link": " https://discord.gg/x ",
            "points": "50"
        }))
        .validate_input()
        .unwrap();

        assert_eq!(valid.id, None);
        assert_eq!(valid.title, "Join Discord");
        assert_eq!(valid.link, "https://discord.gg/x");
        assert_eq!(valid.points, 50);
    }

    #[test]
    fn test_invalid_payloads() {
        let cases = [
            json!({"link": "https://x.com", "points": 1}),
            json!({"title": "t", "link": "   ", "points": 1}),
            json!({"title": "t", "link": "l"}),
            json!({"title": "t", "link": "l", "points": -1}),
            json!({"title": "t", "link": "l", "points": 1.5}),
            json!({"title": "t", "link": "l", "points": "lots"}),
            json!({"title": "t", "link": "l", "points": "NaN"}),
            json!({"title": "t", "link": "l", "points": [1]}),
        ];

        for case in cases {
            let result = input(case.clone()).validate_input();
            assert!(
                matches!(result, Err(AppError::InvalidPayload(_))),
                "expected InvalidPayload for {case}"
            );
        }
    }

    #[test]
    fn test_zero_points_allowed() {
        let valid = input(json!({"title": "t", "link": "l", "points": 0}))
            .validate_input()
            .unwrap();
        assert_eq!(valid.points, 0);
    }
}
