// src/services/notify.rs

use std::fmt;

use async_trait::async_trait;

/// Payload delivered once per completed submission.
#[derive(Debug, Clone)]
pub struct ResultNotification {
    pub student_name: String,
    pub student_email: String,
    pub phone: String,
    pub class_level: String,
    pub stream: String,
    pub score: i64,
    pub total_questions: i64,
}

#[derive(Debug)]
pub struct NotifyError(pub String);

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Outbound notification collaborator (email, SMS, ...).
///
/// Failures here must never block or fail the submission response; callers
/// log and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_result(&self, notification: &ResultNotification) -> Result<(), NotifyError>;
}

/// Default collaborator: writes the result to the application log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_result(&self, n: &ResultNotification) -> Result<(), NotifyError> {
        tracing::info!(
            student = %n.student_name,
            email = %n.student_email,
            phone = %n.phone,
            class_level = %n.class_level,
            stream = %n.stream,
            score = n.score,
            total = n.total_questions,
            "test result recorded"
        );
        Ok(())
    }
}
