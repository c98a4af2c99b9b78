//! Driven port for per-lesson progress records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{LessonProgress, ProgressObservation, UserId, apply_report};

use super::define_port_error;

define_port_error! {
    /// Errors raised by progress adapters.
    pub enum ProgressRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "progress repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "progress repository query failed: {message}",
    }
}

/// Storage for lesson progress.
///
/// `record` must apply [`apply_report`] atomically: read the current row,
/// merge, and write back without another reporter interleaving.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Merge an observation into the stored record and return the result.
    async fn record(
        &self,
        user_id: &UserId,
        lesson_id: Uuid,
        observation: ProgressObservation,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, ProgressRepositoryError>;

    /// The user's records for the given lessons.
    async fn list_for_lessons(
        &self,
        user_id: &UserId,
        lesson_ids: &[Uuid],
    ) -> Result<Vec<LessonProgress>, ProgressRepositoryError>;
}

/// Fixture repository that keeps nothing; `record` echoes a first report.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressRepository;

#[async_trait]
impl ProgressRepository for FixtureProgressRepository {
    async fn record(
        &self,
        user_id: &UserId,
        lesson_id: Uuid,
        observation: ProgressObservation,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress, ProgressRepositoryError> {
        Ok(apply_report(None, user_id.clone(), lesson_id, observation, now))
    }

    async fn list_for_lessons(
        &self,
        _user_id: &UserId,
        _lesson_ids: &[Uuid],
    ) -> Result<Vec<LessonProgress>, ProgressRepositoryError> {
        Ok(Vec::new())
    }
}
