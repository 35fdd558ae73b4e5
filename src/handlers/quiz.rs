// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{attempt::SubmitTestRequest, question::PublicQuestion},
    services::{
        gate,
        ledger::{self, NewResult},
        notify::ResultNotification,
        session::CurrentSession,
    },
    state::AppState,
    utils::scoring::{scholarship_for, score_answers, test_duration_minutes},
};

/// `GET /test/{class_level}` — classes 9 and 10, always the general stream.
pub async fn test_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Path(class_level): Path<String>,
) -> Result<Response, AppError> {
    render_test(state, current, class_level, None).await
}

/// `GET /test/{class_level}/{stream}` — classes 11, 12 and droppers.
pub async fn test_page_with_stream(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Path((class_level, stream)): Path<(String, String)>,
) -> Result<Response, AppError> {
    render_test(state, current, class_level, Some(stream)).await
}

/// Gated test render.
///
/// Completed sessions are sent to the result view; a class/stream that does
/// not match the session is sent back to login. The attempt gate's second
/// checkpoint runs here: the lock flips on test *display*, before any
/// question content leaves the server, so an abandoned test still consumes
/// the one allowed attempt.
async fn render_test(
    state: AppState,
    current: CurrentSession,
    class_level: String,
    stream_param: Option<String>,
) -> Result<Response, AppError> {
    let sess = &current.record;

    if sess.completed {
        return Ok(Redirect::to("/score").into_response());
    }

    if sess.class_level != class_level {
        return Ok(Redirect::to("/login").into_response());
    }

    let stream = if matches!(class_level.as_str(), "class9" | "class10") {
        "general".to_string()
    } else {
        let stream = stream_param.unwrap_or_else(|| sess.stream.clone());
        if sess.stream != stream {
            return Ok(Redirect::to("/login").into_response());
        }
        stream
    };

    // Attempt gate, checkpoint 2. Covers a session that survived from before
    // the lock was set (second tab, replayed token). Exactly one caller wins.
    if !gate::try_lock_attempt(&state.identity_pool, sess.student_id).await? {
        return Err(AppError::AlreadyAttempted);
    }

    let questions = state
        .catalog
        .load(&class_level, &stream, &sess.assigned_set)?;

    if questions.is_empty() {
        let mut label = class_level.clone();
        if stream != "general" {
            label.push_str(&format!(" - {}", stream));
        }
        label.push_str(&format!(" - Set {}", sess.assigned_set.to_uppercase()));
        return Err(AppError::NoContent(label));
    }

    state
        .sessions
        .update(&current.token, |s| s.test_start_time = Some(chrono::Utc::now()))
        .ok_or(AppError::Unauthenticated)?;

    let paper: Vec<PublicQuestion> = questions.into_iter().map(Into::into).collect();

    Ok(Json(json!({
        "username": sess.full_name,
        "class_level": class_level,
        "stream": stream,
        "assigned_set": sess.assigned_set.to_uppercase(),
        "test_duration_minutes": test_duration_minutes(&class_level),
        "questions": paper,
    }))
    .into_response())
}

/// `POST /api/submit_test` — scores the submission server-side and appends
/// the attempt to the local ledger.
///
/// The score is derived from the authoritative question set for the session's
/// (class, stream, set); nothing client-reported is trusted beyond the answer
/// selections themselves. Notification failures are logged and never affect
/// the response.
pub async fn submit_test(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Json(req): Json<SubmitTestRequest>,
) -> Result<Response, AppError> {
    let sess = &current.record;

    if sess.completed {
        return Ok(Redirect::to("/score").into_response());
    }

    let questions = state
        .catalog
        .load(&sess.class_level, &sess.stream, &sess.assigned_set)?;

    let (score, total) = score_answers(&questions, &req.answers);

    ledger::append_result(
        &state.ledger_pool,
        &NewResult {
            login_id: sess.login_id,
            username: &sess.username,
            class_level: &sess.class_level,
            stream: &sess.stream,
            assigned_set: &sess.assigned_set,
            score,
            total_questions: total,
            tab_switches: req.tab_switches as i64,
            submission_type: req.submission_type,
        },
    )
    .await?;

    state
        .sessions
        .update(&current.token, |s| {
            s.completed = true;
            s.score = score;
            s.total_questions = total;
            s.tab_switches = req.tab_switches;
            s.submission_type = req.submission_type;
        })
        .ok_or(AppError::Unauthenticated)?;

    let notification = ResultNotification {
        student_name: sess.full_name.clone(),
        student_email: sess.email.clone(),
        phone: sess.phone.clone(),
        class_level: sess.class_level.clone(),
        stream: sess.stream.clone(),
        score,
        total_questions: total,
    };
    if let Err(e) = state.notifier.send_result(&notification).await {
        tracing::warn!("Result notification failed for {}: {}", sess.username, e);
    }

    Ok(Json(json!({
        "success": true,
        "score": score,
        "total": total,
    }))
    .into_response())
}

/// `POST /api/log_tab_switch` — increments the session's tab-switch counter.
/// No state transition; whether to force-submit past the threshold is client
/// policy.
pub async fn log_tab_switch(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .sessions
        .update(&current.token, |s| s.tab_switches += 1)
        .ok_or(AppError::Unauthenticated)?;

    Ok(Json(json!({
        "success": true,
        "tab_switches": updated.tab_switches,
        "threshold_exceeded": updated.tab_switches >= state.config.tab_switch_threshold,
    })))
}

/// `GET /score` — final result view for a completed session.
pub async fn score(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Response, AppError> {
    // Re-read the live record: the middleware snapshot may predate submission.
    let sess = state
        .sessions
        .get(&current.token)
        .ok_or(AppError::Unauthenticated)?;

    if !sess.completed {
        return Ok(Redirect::to("/login").into_response());
    }

    let percentage = if sess.total_questions > 0 {
        sess.score as f64 / sess.total_questions as f64 * 100.0
    } else {
        0.0
    };
    let (scholarship_percent, scholarship_message) = scholarship_for(percentage);

    Ok(Json(json!({
        "username": sess.full_name,
        "class_level": sess.class_level,
        "stream": sess.stream,
        "assigned_set": sess.assigned_set.to_uppercase(),
        "score": sess.score,
        "total": sess.total_questions,
        "percentage": (percentage * 100.0).round() / 100.0,
        "scholarship_percent": scholarship_percent,
        "scholarship_message": scholarship_message,
        "tab_switches": sess.tab_switches,
        "submission_type": sess.submission_type.as_str(),
    }))
    .into_response())
}
