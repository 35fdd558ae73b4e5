// src/models/attempt.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// How a submission reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    /// Student pressed submit.
    #[default]
    Manual,
    /// Client-side timer expired.
    Timeout,
    /// Client forced submission after too many tab switches.
    Forced,
}

impl SubmissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionType::Manual => "manual",
            SubmissionType::Timeout => "timeout",
            SubmissionType::Forced => "forced",
        }
    }
}

/// DTO for submitting a finished test.
///
/// Answer values arrive as raw JSON so both `{"3": 1}` and `{"3": "1"}` are
/// accepted; coercion happens in the scoring engine.
#[derive(Debug, Deserialize)]
pub struct SubmitTestRequest {
    /// Question id (as string) -> selected option index.
    #[serde(default)]
    pub answers: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub tab_switches: u32,

    #[serde(default)]
    pub submission_type: SubmissionType,
}

/// Immutable row of the 'test_results' ledger table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttemptLogEntry {
    pub id: i64,
    pub login_id: Option<i64>,
    pub username: String,
    pub class_level: String,
    pub stream: String,
    pub assigned_set: String,
    pub score: i64,
    pub total_questions: i64,
    pub tab_switches: i64,
    pub submission_type: String,
    pub test_date: Option<chrono::DateTime<chrono::Utc>>,
}
