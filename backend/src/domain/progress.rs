//! Per-lesson watch progress and its monotonic merge rule.
//!
//! The player reports its position every few seconds and once more when the
//! video ends. Reports can arrive out of order (several tabs, retries), so
//! merging keeps `percent` at its maximum and never moves `status` back from
//! completed. `last_watched_second` is the playhead and is simply overwritten:
//! the most recent seek wins.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Percent at or above which a report without an explicit status counts as
/// completed.
pub const COMPLETION_THRESHOLD_PERCENT: i32 = 90;

/// Saved positions at or below this are not worth resuming from.
pub const RESUME_MIN_SECONDS: i32 = 5;

/// Validation failures for progress reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressValidationError {
    #[error("progressPercent must be between 0 and 100")]
    PercentOutOfRange,
    #[error("lastWatchedSecond must not be negative")]
    NegativeSeconds,
    #[error("unknown progress status: {0}")]
    UnknownStatus(String),
}

impl ProgressValidationError {
    /// JSON field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::PercentOutOfRange => "progressPercent",
            Self::NegativeSeconds => "lastWatchedSecond",
            Self::UnknownStatus(_) => "status",
        }
    }
}

/// Watch state of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Started,
    Completed,
}

impl ProgressStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
        }
    }

    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = ProgressValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            other => Err(ProgressValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Observed playback state from a single client report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressObservation {
    last_watched_second: i32,
    percent: i32,
    status: ProgressStatus,
}

impl ProgressObservation {
    /// Validate a report. When `status` is omitted it is derived from
    /// [`COMPLETION_THRESHOLD_PERCENT`].
    ///
    /// # Examples
    /// ```
    /// use lms_backend::domain::{ProgressObservation, ProgressStatus};
    ///
    /// let obs = ProgressObservation::try_new(540, 92, None).expect("valid report");
    /// assert_eq!(obs.status(), ProgressStatus::Completed);
    /// ```
    pub fn try_new(
        last_watched_second: i32,
        percent: i32,
        status: Option<ProgressStatus>,
    ) -> Result<Self, ProgressValidationError> {
        if !(0..=100).contains(&percent) {
            return Err(ProgressValidationError::PercentOutOfRange);
        }
        if last_watched_second < 0 {
            return Err(ProgressValidationError::NegativeSeconds);
        }
        let status = status.unwrap_or(if percent >= COMPLETION_THRESHOLD_PERCENT {
            ProgressStatus::Completed
        } else {
            ProgressStatus::Started
        });
        Ok(Self {
            last_watched_second,
            percent,
            status,
        })
    }

    pub fn last_watched_second(&self) -> i32 {
        self.last_watched_second
    }

    pub fn percent(&self) -> i32 {
        self.percent
    }

    pub fn status(&self) -> ProgressStatus {
        self.status
    }
}

/// Stored progress for one (user, lesson) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgress {
    pub user_id: UserId,
    pub lesson_id: Uuid,
    pub last_watched_second: i32,
    pub percent: i32,
    pub status: ProgressStatus,
    pub updated_at: DateTime<Utc>,
}

impl LessonProgress {
    /// First record for a pair: the observation verbatim.
    pub fn first(
        user_id: UserId,
        lesson_id: Uuid,
        observation: ProgressObservation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            lesson_id,
            last_watched_second: observation.last_watched_second,
            percent: observation.percent,
            status: observation.status,
            updated_at: now,
        }
    }

    /// Fold a later observation into this record.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use lms_backend::domain::{LessonProgress, ProgressObservation, ProgressStatus, UserId};
    /// use uuid::Uuid;
    ///
    /// let now = Utc::now();
    /// let first = ProgressObservation::try_new(480, 80, Some(ProgressStatus::Started)).unwrap();
    /// let rewind = ProgressObservation::try_new(120, 40, Some(ProgressStatus::Started)).unwrap();
    /// let merged = LessonProgress::first(UserId::random(), Uuid::new_v4(), first, now)
    ///     .merge(rewind, now);
    /// assert_eq!(merged.percent, 80);
    /// assert_eq!(merged.last_watched_second, 120);
    /// ```
    #[must_use]
    pub fn merge(self, observation: ProgressObservation, now: DateTime<Utc>) -> Self {
        let status = if self.status.is_completed() {
            ProgressStatus::Completed
        } else {
            observation.status
        };
        Self {
            last_watched_second: observation.last_watched_second,
            percent: self.percent.max(observation.percent),
            status,
            updated_at: now,
            ..self
        }
    }

    /// Second to seek to when the lesson is opened again, or zero when the
    /// player should start from the beginning.
    pub fn resume_at_second(&self) -> i32 {
        if self.status.is_completed() || self.last_watched_second <= RESUME_MIN_SECONDS {
            0
        } else {
            self.last_watched_second
        }
    }
}

/// Apply a report to the optional existing record.
pub fn apply_report(
    existing: Option<LessonProgress>,
    user_id: UserId,
    lesson_id: Uuid,
    observation: ProgressObservation,
    now: DateTime<Utc>,
) -> LessonProgress {
    match existing {
        Some(record) => record.merge(observation, now),
        None => LessonProgress::first(user_id, lesson_id, observation, now),
    }
}
