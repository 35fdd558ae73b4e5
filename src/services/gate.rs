// src/services/gate.rs

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::student::Student;

// Identity-store access for the one-attempt gate.
//
// The gate is enforced at two checkpoints: credential verification at login
// (the caller compares the hash and checks `has_attempted`), and the lock
// flip at test display via `try_lock_attempt`. Both go straight to the
// durable store, so a flipped lock is immediately visible to later logins.

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<Student>, AppError> {
    let student = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, full_name, phone, email, username, password_hash,
               promoted_to_class, has_attempted, created_at
        FROM students
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(student)
}

/// Attempts to take the one-attempt lock for a student.
///
/// A single conditional update makes check-and-set atomic: of two concurrent
/// test-starts for the same identity, exactly one sees a row change. Returns
/// `true` when this caller won the lock, `false` when the flag was already
/// set.
pub async fn try_lock_attempt(pool: &SqlitePool, student_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE students
        SET has_attempted = 1
        WHERE id = ? AND has_attempted = 0
        "#,
    )
    .bind(student_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Field checks for duplicate signups; returns the offending field name.
pub async fn find_duplicate_field(
    pool: &SqlitePool,
    username: &str,
    phone: &str,
    email: &str,
) -> Result<Option<&'static str>, AppError> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM students WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(Some("username"));
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM students WHERE phone = ?")
        .bind(phone)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(Some("phone"));
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM students WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(Some("email"));
    }

    Ok(None)
}

pub struct NewStudent<'a> {
    pub full_name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub promoted_to_class: &'a str,
}

pub async fn insert_student(pool: &SqlitePool, new: &NewStudent<'_>) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO students
            (full_name, phone, email, username, password_hash, promoted_to_class, has_attempted)
        VALUES (?, ?, ?, ?, ?, ?, 0)
        RETURNING id
        "#,
    )
    .bind(new.full_name)
    .bind(new.phone)
    .bind(new.email)
    .bind(new.username)
    .bind(new.password_hash)
    .bind(new.promoted_to_class)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
