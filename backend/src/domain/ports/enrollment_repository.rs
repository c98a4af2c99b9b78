//! Driven port for enrollments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by enrollment adapters.
    pub enum EnrollmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "enrollment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "enrollment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn is_enrolled(
        &self,
        user_id: &UserId,
        course_id: Uuid,
    ) -> Result<bool, EnrollmentRepositoryError>;

    /// Ids of every course the user is enrolled in.
    async fn enrolled_course_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, EnrollmentRepositoryError>;
}

/// Fixture repository with no enrollments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEnrollmentRepository;

#[async_trait]
impl EnrollmentRepository for FixtureEnrollmentRepository {
    async fn is_enrolled(
        &self,
        _user_id: &UserId,
        _course_id: Uuid,
    ) -> Result<bool, EnrollmentRepositoryError> {
        Ok(false)
    }

    async fn enrolled_course_ids(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Uuid>, EnrollmentRepositoryError> {
        Ok(Vec::new())
    }
}

/// Whether a grant produced a new enrollment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentGrant {
    Created,
    AlreadyEnrolled,
}

impl EnrollmentGrant {
    /// Map the affected-row count of an insert-if-absent.
    pub fn from_inserted_rows(rows: usize) -> Self {
        if rows == 0 {
            Self::AlreadyEnrolled
        } else {
            Self::Created
        }
    }
}
