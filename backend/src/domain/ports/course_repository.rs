//! Driven port for reading the course catalog.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, CourseOutline, CourseSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog read adapters.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "course repository query failed: {message}",
    }
}

/// Read access to courses, modules, and lessons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Published courses, newest first, with module counts.
    async fn list_published(&self) -> Result<Vec<CourseSummary>, CourseRepositoryError>;

    /// A course regardless of publication state.
    async fn find_course(&self, course_id: Uuid) -> Result<Option<Course>, CourseRepositoryError>;

    /// A course with all modules and lessons.
    async fn find_outline(
        &self,
        course_id: Uuid,
    ) -> Result<Option<CourseOutline>, CourseRepositoryError>;

    /// Outlines for every published course, newest first.
    async fn published_outlines(&self) -> Result<Vec<CourseOutline>, CourseRepositoryError>;

    /// Outlines for the given courses, newest first. Unknown ids are skipped.
    async fn outlines_by_ids(
        &self,
        course_ids: &[Uuid],
    ) -> Result<Vec<CourseOutline>, CourseRepositoryError>;

    /// The course a lesson belongs to.
    async fn course_for_lesson(
        &self,
        lesson_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError>;
}

/// Fixture repository backed by an empty catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCourseRepository;

#[async_trait]
impl CourseRepository for FixtureCourseRepository {
    async fn list_published(&self) -> Result<Vec<CourseSummary>, CourseRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_course(&self, _course_id: Uuid) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(None)
    }

    async fn find_outline(
        &self,
        _course_id: Uuid,
    ) -> Result<Option<CourseOutline>, CourseRepositoryError> {
        Ok(None)
    }

    async fn published_outlines(&self) -> Result<Vec<CourseOutline>, CourseRepositoryError> {
        Ok(Vec::new())
    }

    async fn outlines_by_ids(
        &self,
        _course_ids: &[Uuid],
    ) -> Result<Vec<CourseOutline>, CourseRepositoryError> {
        Ok(Vec::new())
    }

    async fn course_for_lesson(
        &self,
        _lesson_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(None)
    }
}
