// src/services/ledger.rs

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::attempt::SubmissionType;

// Append-only local ledger: one row per successful login and one immutable
// row per submitted attempt. Nothing here is ever updated or deleted.

pub async fn record_login(
    pool: &SqlitePool,
    username: &str,
    class_level: &str,
    stream: &str,
    assigned_set: &str,
) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO login_log (username, class_level, stream, assigned_set)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(class_level)
    .bind(stream)
    .bind(assigned_set)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

pub struct NewResult<'a> {
    pub login_id: i64,
    pub username: &'a str,
    pub class_level: &'a str,
    pub stream: &'a str,
    pub assigned_set: &'a str,
    pub score: i64,
    pub total_questions: i64,
    pub tab_switches: i64,
    pub submission_type: SubmissionType,
}

pub async fn append_result(pool: &SqlitePool, result: &NewResult<'_>) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO test_results
            (login_id, username, class_level, stream, assigned_set,
             score, total_questions, tab_switches, submission_type)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(result.login_id)
    .bind(result.username)
    .bind(result.class_level)
    .bind(result.stream)
    .bind(result.assigned_set)
    .bind(result.score)
    .bind(result.total_questions)
    .bind(result.tab_switches)
    .bind(result.submission_type.as_str())
    .execute(pool)
    .await?;

    Ok(())
}
