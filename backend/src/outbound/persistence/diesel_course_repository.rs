//! PostgreSQL-backed `CourseRepository` implementation using Diesel ORM.
//!
//! Outlines are assembled from three flat queries (courses, their modules,
//! those modules' lessons) rather than one wide join.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{CourseRepository, CourseRepositoryError};
use crate::domain::{Course, CourseOutline, CourseSummary, Lesson, Module, ModuleOutline};

use super::diesel_error_mapping::repository_error_mappers;
use super::models::{CourseRow, LessonRow, ModuleRow};
use super::pool::DbPool;
use super::schema::{courses, lessons, modules};

/// Diesel-backed implementation of the catalog read port.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(CourseRepositoryError);

fn to_course(row: CourseRow) -> Result<Course, CourseRepositoryError> {
    Course::try_from(row).map_err(CourseRepositoryError::query)
}

/// Group modules and lessons under their courses, keeping course order.
fn assemble_outlines(
    courses: Vec<Course>,
    module_rows: Vec<ModuleRow>,
    lesson_rows: Vec<LessonRow>,
) -> Vec<CourseOutline> {
    let mut lessons_by_module: HashMap<Uuid, Vec<Lesson>> = HashMap::new();
    for row in lesson_rows {
        lessons_by_module
            .entry(row.module_id)
            .or_default()
            .push(Lesson::from(row));
    }

    let mut modules_by_course: HashMap<Uuid, Vec<ModuleOutline>> = HashMap::new();
    for row in module_rows {
        let module = Module::from(row);
        let lessons = lessons_by_module.remove(&module.id).unwrap_or_default();
        modules_by_course
            .entry(module.course_id)
            .or_default()
            .push(ModuleOutline { module, lessons });
    }

    courses
        .into_iter()
        .map(|course| {
            let modules = modules_by_course.remove(&course.id).unwrap_or_default();
            CourseOutline { course, modules }.sorted()
        })
        .collect()
}

async fn load_outlines(
    conn: &mut AsyncPgConnection,
    course_rows: Vec<CourseRow>,
) -> Result<Vec<CourseOutline>, CourseRepositoryError> {
    let courses = course_rows
        .into_iter()
        .map(to_course)
        .collect::<Result<Vec<_>, _>>()?;
    if courses.is_empty() {
        return Ok(Vec::new());
    }

    let course_ids: Vec<Uuid> = courses.iter().map(|course| course.id).collect();
    let module_rows: Vec<ModuleRow> = modules::table
        .filter(modules::course_id.eq_any(course_ids))
        .order((modules::course_id, modules::position))
        .select(ModuleRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let module_ids: Vec<Uuid> = module_rows.iter().map(|row| row.id).collect();
    let lesson_rows: Vec<LessonRow> = if module_ids.is_empty() {
        Vec::new()
    } else {
        lessons::table
            .filter(lessons::module_id.eq_any(module_ids))
            .order((lessons::module_id, lessons::position))
            .select(LessonRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?
    };

    Ok(assemble_outlines(courses, module_rows, lesson_rows))
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn list_published(&self) -> Result<Vec<CourseSummary>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::published.eq(true))
            .order(courses::created_at.desc())
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let course_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let counts: HashMap<Uuid, i64> = modules::table
            .filter(modules::course_id.eq_any(course_ids))
            .group_by(modules::course_id)
            .select((modules::course_id, diesel::dsl::count(modules::id)))
            .load::<(Uuid, i64)>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|row| {
                let module_count = counts.get(&row.id).copied().unwrap_or(0);
                to_course(row).map(|course| CourseSummary {
                    course,
                    module_count,
                })
            })
            .collect()
    }

    async fn find_course(&self, course_id: Uuid) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = courses::table
            .find(course_id)
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_course).transpose()
    }

    async fn find_outline(
        &self,
        course_id: Uuid,
    ) -> Result<Option<CourseOutline>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .find(course_id)
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(load_outlines(&mut conn, rows).await?.into_iter().next())
    }

    async fn published_outlines(&self) -> Result<Vec<CourseOutline>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::published.eq(true))
            .order(courses::created_at.desc())
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_outlines(&mut conn, rows).await
    }

    async fn outlines_by_ids(
        &self,
        course_ids: &[Uuid],
    ) -> Result<Vec<CourseOutline>, CourseRepositoryError> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .filter(courses::id.eq_any(course_ids.to_vec()))
            .order(courses::created_at.desc())
            .select(CourseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_outlines(&mut conn, rows).await
    }

    async fn course_for_lesson(
        &self,
        lesson_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = lessons::table
            .inner_join(modules::table.inner_join(courses::table))
            .filter(lessons::id.eq(lesson_id))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_course).transpose()
    }
}
