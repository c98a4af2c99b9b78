//! PostgreSQL-backed `CatalogAuthoringRepository` implementation.
//!
//! Appending a module or lesson locks the parent row first, so concurrent
//! appends to the same parent serialise on the `max + 1` position.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CatalogAuthoringRepository, CatalogAuthoringRepositoryError};
use crate::domain::{Course, CourseDraft, Lesson, LessonDraft, Module, ModuleDraft, next_position};

use super::diesel_error_mapping::repository_error_mappers;
use super::models::{CourseRow, CourseWrite, LessonRow, ModuleRow, NewCourseRow};
use super::pool::DbPool;
use super::schema::{courses, lessons, modules};

/// Diesel-backed implementation of the catalog authoring port.
#[derive(Clone)]
pub struct DieselCatalogAuthoringRepository {
    pool: DbPool,
}

impl DieselCatalogAuthoringRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(CatalogAuthoringRepositoryError);

fn course_write(draft: &CourseDraft, now: DateTime<Utc>) -> CourseWrite<'_> {
    CourseWrite {
        title: &draft.title,
        description: draft.description.as_deref(),
        price_minor: draft.price.minor_units(),
        thumbnail_url: draft.thumbnail_url.as_deref(),
        is_free: draft.is_free,
        published: draft.published,
        updated_at: now,
    }
}

fn to_course(row: CourseRow) -> Result<Course, CatalogAuthoringRepositoryError> {
    Course::try_from(row).map_err(CatalogAuthoringRepositoryError::query)
}

#[async_trait]
impl CatalogAuthoringRepository for DieselCatalogAuthoringRepository {
    async fn create_course(
        &self,
        draft: &CourseDraft,
        now: DateTime<Utc>,
    ) -> Result<Course, CatalogAuthoringRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(courses::table)
            .values(NewCourseRow {
                id: Uuid::new_v4(),
                created_at: now,
                fields: course_write(draft, now),
            })
            .returning(CourseRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_course(row)
    }

    async fn update_course(
        &self,
        course_id: Uuid,
        draft: &CourseDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Course>, CatalogAuthoringRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(courses::table.find(course_id))
            .set(course_write(draft, now))
            .returning(CourseRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_course).transpose()
    }

    async fn create_module(
        &self,
        course_id: Uuid,
        draft: &ModuleDraft,
    ) -> Result<Option<Module>, CatalogAuthoringRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let title = draft.title.clone();
        let row = conn
            .transaction(|conn| {
                async move {
                    let parent: Option<Uuid> = courses::table
                        .find(course_id)
                        .select(courses::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if parent.is_none() {
                        return Ok(None);
                    }

                    let current: Option<i32> = modules::table
                        .filter(modules::course_id.eq(course_id))
                        .select(diesel::dsl::max(modules::position))
                        .first(conn)
                        .await?;
                    let row = ModuleRow {
                        id: Uuid::new_v4(),
                        course_id,
                        title,
                        position: next_position(current),
                    };
                    diesel::insert_into(modules::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(Module::from))
    }

    async fn create_lesson(
        &self,
        module_id: Uuid,
        draft: &LessonDraft,
    ) -> Result<Option<Lesson>, CatalogAuthoringRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let draft = draft.clone();
        let row = conn
            .transaction(|conn| {
                async move {
                    let parent: Option<Uuid> = modules::table
                        .find(module_id)
                        .select(modules::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if parent.is_none() {
                        return Ok(None);
                    }

                    let current: Option<i32> = lessons::table
                        .filter(lessons::module_id.eq(module_id))
                        .select(diesel::dsl::max(lessons::position))
                        .first(conn)
                        .await?;
                    let row = LessonRow {
                        id: Uuid::new_v4(),
                        module_id,
                        title: draft.title,
                        description: draft.description,
                        video_id: draft.video_id,
                        duration_seconds: draft.duration_seconds,
                        position: next_position(current),
                    };
                    diesel::insert_into(lessons::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(Lesson::from))
    }

    async fn delete_module(&self, module_id: Uuid) -> Result<bool, CatalogAuthoringRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(modules::table.find(module_id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_lesson(&self, lesson_id: Uuid) -> Result<bool, CatalogAuthoringRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(lessons::table.find(lesson_id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
