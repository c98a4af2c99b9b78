//! Driven port for catalog writes performed by administrators.
//!
//! Adapters assign module and lesson positions as `max + 1` within the
//! parent, in the same transaction as the insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Course, CourseDraft, Lesson, LessonDraft, Module, ModuleDraft};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog write adapters.
    pub enum CatalogAuthoringRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalog authoring connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "catalog authoring query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogAuthoringRepository: Send + Sync {
    async fn create_course(
        &self,
        draft: &CourseDraft,
        now: DateTime<Utc>,
    ) -> Result<Course, CatalogAuthoringRepositoryError>;

    /// Replace a course's editable fields. `None` when the course is absent.
    async fn update_course(
        &self,
        course_id: Uuid,
        draft: &CourseDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Course>, CatalogAuthoringRepositoryError>;

    /// Append a module. `None` when the course is absent.
    async fn create_module(
        &self,
        course_id: Uuid,
        draft: &ModuleDraft,
    ) -> Result<Option<Module>, CatalogAuthoringRepositoryError>;

    /// Append a lesson. `None` when the module is absent.
    async fn create_lesson(
        &self,
        module_id: Uuid,
        draft: &LessonDraft,
    ) -> Result<Option<Lesson>, CatalogAuthoringRepositoryError>;

    /// Delete a module with its lessons. `false` when nothing was deleted.
    async fn delete_module(&self, module_id: Uuid) -> Result<bool, CatalogAuthoringRepositoryError>;

    /// Delete a lesson. `false` when nothing was deleted.
    async fn delete_lesson(&self, lesson_id: Uuid) -> Result<bool, CatalogAuthoringRepositoryError>;
}

/// Fixture repository that accepts writes without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogAuthoringRepository;

#[async_trait]
impl CatalogAuthoringRepository for FixtureCatalogAuthoringRepository {
    async fn create_course(
        &self,
        draft: &CourseDraft,
        now: DateTime<Utc>,
    ) -> Result<Course, CatalogAuthoringRepositoryError> {
        Ok(Course {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            price: draft.price,
            thumbnail_url: draft.thumbnail_url.clone(),
            is_free: draft.is_free,
            published: draft.published,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_course(
        &self,
        _course_id: Uuid,
        _draft: &CourseDraft,
        _now: DateTime<Utc>,
    ) -> Result<Option<Course>, CatalogAuthoringRepositoryError> {
        Ok(None)
    }

    async fn create_module(
        &self,
        _course_id: Uuid,
        _draft: &ModuleDraft,
    ) -> Result<Option<Module>, CatalogAuthoringRepositoryError> {
        Ok(None)
    }

    async fn create_lesson(
        &self,
        _module_id: Uuid,
        _draft: &LessonDraft,
    ) -> Result<Option<Lesson>, CatalogAuthoringRepositoryError> {
        Ok(None)
    }

    async fn delete_module(&self, _module_id: Uuid) -> Result<bool, CatalogAuthoringRepositoryError> {
        Ok(false)
    }

    async fn delete_lesson(&self, _lesson_id: Uuid) -> Result<bool, CatalogAuthoringRepositoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_echoes_created_course() {
        let draft = CourseDraft::try_new("Curso", None, None, None, true, None).expect("draft");
        let now = Utc::now();
        let course = FixtureCatalogAuthoringRepository
            .create_course(&draft, now)
            .await
            .expect("create");
        assert_eq!(course.title, "Curso");
        assert!(course.is_free);
        assert_eq!(course.created_at, now);
    }
}
