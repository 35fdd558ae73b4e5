// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::student::{LoginRequest, SignupRequest},
    services::{
        gate::{self, NewStudent},
        ledger,
        session::{CurrentSession, SessionRecord},
    },
    state::AppState,
    utils::{
        hash::{hash_password, verify_password},
        student::{generate_username, parse_promoted_class, stream_required},
    },
};

/// Registers a new student in the identity store.
///
/// Derives the login username from name and phone, enforces unique
/// username/phone/email, and stores an Argon2 hash of the password.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let promoted = payload.promoted_to_class.trim();
    let promoted_to_class = if stream_required(promoted) {
        let stream = payload.stream.as_deref().map(str::trim).unwrap_or("");
        if stream.is_empty() {
            return Err(AppError::BadRequest(
                "Stream required for Class 11, 12, and Dropper".to_string(),
            ));
        }
        format!("{} {}", promoted, stream.to_lowercase())
    } else {
        promoted.to_string()
    };

    let username =
        generate_username(&payload.full_name, &payload.phone).map_err(AppError::BadRequest)?;

    if let Some(field) = gate::find_duplicate_field(
        &state.identity_pool,
        &username,
        &payload.phone,
        &payload.email,
    )
    .await?
    {
        let message = match field {
            "username" => "Username already exists. Please contact admin.",
            "phone" => "Phone number already registered",
            _ => "Email already registered",
        };
        return Err(AppError::Conflict(message.to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let id = gate::insert_student(
        &state.identity_pool,
        &NewStudent {
            full_name: payload.full_name.trim(),
            phone: &payload.phone,
            email: &payload.email,
            username: &username,
            password_hash: &password_hash,
            promoted_to_class: &promoted_to_class,
        },
    )
    .await?;

    tracing::info!("Student registered: {} (id {})", username, id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "username": username,
            "message": format!(
                "Account created successfully! Your username is: {}. Please login to start the test.",
                username
            ),
        })),
    ))
}

/// Authenticates a student and opens a quiz session.
///
/// Attempt gate, checkpoint 1: a missing identity and a hash mismatch get
/// the same generic rejection; a set lock flag is rejected explicitly. On
/// success a set is allocated, the login is appended to the local ledger and
/// a session token is issued.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student = gate::find_by_username(&state.identity_pool, payload.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &student.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    if student.attempt_locked() {
        return Err(AppError::AlreadyAttempted);
    }

    let (class_level, stream) =
        parse_promoted_class(&student.promoted_to_class).map_err(AppError::Internal)?;

    let assigned_set = state.allocator.next_set(&class_level, &stream).await?;

    let login_id = ledger::record_login(
        &state.ledger_pool,
        &student.username,
        &class_level,
        &stream,
        &assigned_set,
    )
    .await?;

    let token = state.sessions.create(SessionRecord::new(
        student.id,
        login_id,
        student.username.clone(),
        student.full_name.clone(),
        student.phone.clone(),
        student.email.clone(),
        class_level.clone(),
        stream.clone(),
        assigned_set.clone(),
    ));

    let test_path = if stream == "general" {
        format!("/test/{}", class_level)
    } else {
        format!("/test/{}/{}", class_level, stream)
    };

    tracing::info!(
        "Login: {} -> {} {} set {}",
        student.username,
        class_level,
        stream,
        assigned_set
    );

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "class_level": class_level,
        "stream": stream,
        "assigned_set": assigned_set,
        "test_path": test_path,
    })))
}

/// Destroys the current session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<impl IntoResponse, AppError> {
    state.sessions.remove(&current.token);
    Ok(Json(json!({ "success": true })))
}
