//! Driving port for catalog reads: listing, course pages, and the learner
//! dashboard.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CourseDetail, CourseSummary, Error, LearnerCourse, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Published courses, newest first.
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, Error>;

    /// A course page for an optional viewer.
    async fn course_detail(
        &self,
        viewer: Option<UserId>,
        course_id: Uuid,
    ) -> Result<CourseDetail, Error>;

    /// Courses the user follows with completion totals.
    async fn my_courses(&self, user_id: &UserId) -> Result<Vec<LearnerCourse>, Error>;
}

/// Fixture query over an empty catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogQuery;

#[async_trait]
impl CatalogQuery for FixtureCatalogQuery {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, Error> {
        Ok(Vec::new())
    }

    async fn course_detail(
        &self,
        _viewer: Option<UserId>,
        course_id: Uuid,
    ) -> Result<CourseDetail, Error> {
        Err(Error::not_found(format!("course {course_id} not found")))
    }

    async fn my_courses(&self, _user_id: &UserId) -> Result<Vec<LearnerCourse>, Error> {
        Ok(Vec::new())
    }
}
