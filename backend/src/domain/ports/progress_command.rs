//! Driving port for lesson progress reports from the player.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, LessonProgress, ProgressObservation, UserId, apply_report};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressCommand: Send + Sync {
    /// Merge a report and return the stored record.
    async fn report(
        &self,
        user_id: &UserId,
        lesson_id: Uuid,
        observation: ProgressObservation,
    ) -> Result<LessonProgress, Error>;
}

/// Fixture command that echoes the report as a first record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressCommand;

#[async_trait]
impl ProgressCommand for FixtureProgressCommand {
    async fn report(
        &self,
        user_id: &UserId,
        lesson_id: Uuid,
        observation: ProgressObservation,
    ) -> Result<LessonProgress, Error> {
        Ok(apply_report(
            None,
            user_id.clone(),
            lesson_id,
            observation,
            chrono::Utc::now(),
        ))
    }
}
