// src/models/question.rs

use serde::{Deserialize, Serialize};

/// One entry of a question catalog file.
/// Loaded read-only from `questions_{class}_{stream}[_{set}].json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// Unique within a set.
    pub id: i64,

    pub prompt: String,

    /// List of options (e.g., ["Option A", "Option B"]).
    pub options: Vec<String>,

    /// Index into `options` of the correct answer.
    pub correct: i64,
}

/// DTO for sending a question to the client (excludes the correct index).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            prompt: q.prompt,
            options: q.options,
        }
    }
}
