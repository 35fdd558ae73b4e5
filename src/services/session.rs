// src/services/session.rs

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::models::attempt::SubmissionType;
use crate::state::AppState;

/// Ephemeral per-login state tracking progress through the quiz flow.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Identity-store row id (used for the gate lock flip).
    pub student_id: i64,

    /// Ledger login_log row id.
    pub login_id: i64,

    pub username: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,

    pub class_level: String,
    pub stream: String,
    pub assigned_set: String,

    pub tab_switches: u32,
    pub test_start_time: Option<chrono::DateTime<chrono::Utc>>,

    pub completed: bool,
    pub score: i64,
    pub total_questions: i64,
    pub submission_type: SubmissionType,

    last_seen: Instant,
}

impl SessionRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        student_id: i64,
        login_id: i64,
        username: String,
        full_name: String,
        phone: String,
        email: String,
        class_level: String,
        stream: String,
        assigned_set: String,
    ) -> Self {
        Self {
            student_id,
            login_id,
            username,
            full_name,
            phone,
            email,
            class_level,
            stream,
            assigned_set,
            tab_switches: 0,
            test_start_time: None,
            completed: false,
            score: 0,
            total_questions: 0,
            submission_type: SubmissionType::Manual,
            last_seen: Instant::now(),
        }
    }
}

/// In-process session store with TTL-based lazy expiry.
///
/// Expired records are not reaped eagerly; expiry is observed on the next
/// access, which removes the record and behaves as if it never existed.
pub struct SessionStore {
    ttl: Duration,
    inner: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Stores a new record and returns its opaque token.
    pub fn create(&self, record: SessionRecord) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.inner.lock().expect("session store poisoned");
        sessions.insert(token.clone(), record);
        token
    }

    /// Looks up a record, touching its last-access instant.
    /// An expired record is removed and reported as absent.
    pub fn get(&self, token: &str) -> Option<SessionRecord> {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        match sessions.get_mut(token) {
            Some(record) if record.last_seen.elapsed() <= self.ttl => {
                record.last_seen = Instant::now();
                Some(record.clone())
            }
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Applies a mutation to a live record, returning the updated copy.
    pub fn update<F>(&self, token: &str, mutate: F) -> Option<SessionRecord>
    where
        F: FnOnce(&mut SessionRecord),
    {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        match sessions.get_mut(token) {
            Some(record) if record.last_seen.elapsed() <= self.ttl => {
                mutate(record);
                record.last_seen = Instant::now();
                Some(record.clone())
            }
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, token: &str) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        sessions.remove(token);
    }
}

/// A resolved session attached to the current request.
#[derive(Clone)]
pub struct CurrentSession {
    pub token: String,
    pub record: SessionRecord,
}

/// Axum Middleware: session resolution.
///
/// Validates the 'Authorization: Bearer <token>' header against the session
/// store and injects a `CurrentSession` into the request extensions. Missing,
/// unknown or expired tokens force the client back to the login flow with 401.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => header[7..].to_string(),
        _ => return Err(AppError::Unauthenticated),
    };

    let record = state.sessions.get(&token).ok_or(AppError::Unauthenticated)?;

    req.extensions_mut().insert(CurrentSession { token, record });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord::new(
            1,
            1,
            "stud01".into(),
            "Stud One".into(),
            "9876543210".into(),
            "stud@example.com".into(),
            "class11".into(),
            "jee".into(),
            "c".into(),
        )
    }

    #[test]
    fn create_then_get() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(record());

        let session = store.get(&token).unwrap();
        assert_eq!(session.assigned_set, "c");
        assert!(!session.completed);
        assert!(store.get("unknown-token").is_none());
    }

    #[test]
    fn update_mutates_in_place() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(record());

        let updated = store.update(&token, |s| s.tab_switches += 1).unwrap();
        assert_eq!(updated.tab_switches, 1);
        assert_eq!(store.get(&token).unwrap().tab_switches, 1);
    }

    #[test]
    fn expiry_is_observed_lazily() {
        let store = SessionStore::new(Duration::from_millis(10));
        let token = store.create(record());

        std::thread::sleep(Duration::from_millis(25));
        assert!(store.get(&token).is_none());
        // The expired record was dropped; updates also miss.
        assert!(store.update(&token, |s| s.completed = true).is_none());
    }

    #[test]
    fn remove_destroys_the_record() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(record());
        store.remove(&token);
        assert!(store.get(&token).is_none());
    }
}
