//! Catalog authoring service for administrators.
//!
//! The `AuthorCatalog` capability is checked before any write reaches the
//! repository.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{CatalogAuthoringCommand, CatalogAuthoringRepository, UserRepository};
use crate::domain::service_support::{load_user, map_authoring_error};
use crate::domain::{
    Capability, Course, CourseDraft, Error, Lesson, LessonDraft, Module, ModuleDraft, UserId,
};

/// Authoring service implementing [`CatalogAuthoringCommand`].
#[derive(Clone)]
pub struct CatalogAuthoringService<A, U> {
    catalog: Arc<A>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<A, U> CatalogAuthoringService<A, U> {
    pub fn new(catalog: Arc<A>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            users,
            clock,
        }
    }
}

impl<A, U> CatalogAuthoringService<A, U>
where
    A: CatalogAuthoringRepository,
    U: UserRepository,
{
    async fn require_author(&self, actor: &UserId) -> Result<(), Error> {
        let user = load_user(self.users.as_ref(), actor).await?;
        if user.can(Capability::AuthorCatalog) {
            Ok(())
        } else {
            Err(Error::forbidden("catalog authoring requires an administrator"))
        }
    }
}

fn missing(kind: &str, id: Uuid) -> Error {
    Error::not_found(format!("{kind} {id} not found"))
}

#[async_trait]
impl<A, U> CatalogAuthoringCommand for CatalogAuthoringService<A, U>
where
    A: CatalogAuthoringRepository,
    U: UserRepository,
{
    async fn create_course(&self, actor: &UserId, draft: CourseDraft) -> Result<Course, Error> {
        self.require_author(actor).await?;
        let course = self
            .catalog
            .create_course(&draft, self.clock.utc())
            .await
            .map_err(map_authoring_error)?;
        info!(course_id = %course.id, %actor, "course created");
        Ok(course)
    }

    async fn update_course(
        &self,
        actor: &UserId,
        course_id: Uuid,
        draft: CourseDraft,
    ) -> Result<Course, Error> {
        self.require_author(actor).await?;
        self.catalog
            .update_course(course_id, &draft, self.clock.utc())
            .await
            .map_err(map_authoring_error)?
            .ok_or_else(|| missing("course", course_id))
    }

    async fn create_module(
        &self,
        actor: &UserId,
        course_id: Uuid,
        draft: ModuleDraft,
    ) -> Result<Module, Error> {
        self.require_author(actor).await?;
        self.catalog
            .create_module(course_id, &draft)
            .await
            .map_err(map_authoring_error)?
            .ok_or_else(|| missing("course", course_id))
    }

    async fn delete_module(&self, actor: &UserId, module_id: Uuid) -> Result<(), Error> {
        self.require_author(actor).await?;
        let deleted = self
            .catalog
            .delete_module(module_id)
            .await
            .map_err(map_authoring_error)?;
        if deleted {
            info!(%module_id, %actor, "module deleted with its lessons");
            Ok(())
        } else {
            Err(missing("module", module_id))
        }
    }

    async fn create_lesson(
        &self,
        actor: &UserId,
        module_id: Uuid,
        draft: LessonDraft,
    ) -> Result<Lesson, Error> {
        self.require_author(actor).await?;
        self.catalog
            .create_lesson(module_id, &draft)
            .await
            .map_err(map_authoring_error)?
            .ok_or_else(|| missing("module", module_id))
    }

    async fn delete_lesson(&self, actor: &UserId, lesson_id: Uuid) -> Result<(), Error> {
        self.require_author(actor).await?;
        let deleted = self
            .catalog
            .delete_lesson(lesson_id)
            .await
            .map_err(map_authoring_error)?;
        if deleted {
            Ok(())
        } else {
            Err(missing("lesson", lesson_id))
        }
    }
}

#[cfg(test)]
#[path = "authoring_service_tests.rs"]
mod tests;
