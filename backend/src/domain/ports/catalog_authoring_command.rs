//! Driving port for administrator catalog edits.
//!
//! Every operation takes the acting user so the service can check the
//! `AuthorCatalog` capability before touching the store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Course, CourseDraft, Error, Lesson, LessonDraft, Module, ModuleDraft, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogAuthoringCommand: Send + Sync {
    async fn create_course(&self, actor: &UserId, draft: CourseDraft) -> Result<Course, Error>;

    async fn update_course(
        &self,
        actor: &UserId,
        course_id: Uuid,
        draft: CourseDraft,
    ) -> Result<Course, Error>;

    async fn create_module(
        &self,
        actor: &UserId,
        course_id: Uuid,
        draft: ModuleDraft,
    ) -> Result<Module, Error>;

    async fn delete_module(&self, actor: &UserId, module_id: Uuid) -> Result<(), Error>;

    async fn create_lesson(
        &self,
        actor: &UserId,
        module_id: Uuid,
        draft: LessonDraft,
    ) -> Result<Lesson, Error>;

    async fn delete_lesson(&self, actor: &UserId, lesson_id: Uuid) -> Result<(), Error>;
}

/// Fixture command that refuses every edit; the fixture user is a student.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogAuthoringCommand;

fn refuse() -> Error {
    Error::forbidden("catalog authoring requires an administrator")
}

#[async_trait]
impl CatalogAuthoringCommand for FixtureCatalogAuthoringCommand {
    async fn create_course(&self, _actor: &UserId, _draft: CourseDraft) -> Result<Course, Error> {
        Err(refuse())
    }

    async fn update_course(
        &self,
        _actor: &UserId,
        _course_id: Uuid,
        _draft: CourseDraft,
    ) -> Result<Course, Error> {
        Err(refuse())
    }

    async fn create_module(
        &self,
        _actor: &UserId,
        _course_id: Uuid,
        _draft: ModuleDraft,
    ) -> Result<Module, Error> {
        Err(refuse())
    }

    async fn delete_module(&self, _actor: &UserId, _module_id: Uuid) -> Result<(), Error> {
        Err(refuse())
    }

    async fn create_lesson(
        &self,
        _actor: &UserId,
        _module_id: Uuid,
        _draft: LessonDraft,
    ) -> Result<Lesson, Error> {
        Err(refuse())
    }

    async fn delete_lesson(&self, _actor: &UserId, _lesson_id: Uuid) -> Result<(), Error> {
        Err(refuse())
    }
}
