//! Catalog read service: public listing, course pages, and the learner
//! dashboard.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    CatalogQuery, CourseRepository, EnrollmentRepository, ProgressRepository, UserRepository,
};
use crate::domain::service_support::{
    load_user, map_course_error, map_enrollment_error, map_progress_error, viewer_for,
};
use crate::domain::{
    Capability, CourseAccess, CourseCompletion, CourseDetail, CourseOutline, CourseSummary, Error,
    LearnerCourse, LessonProgress, UserId, Viewer,
};

/// Catalog service implementing [`CatalogQuery`].
#[derive(Clone)]
pub struct CatalogService<C, E, P, U> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    progress: Arc<P>,
    users: Arc<U>,
}

impl<C, E, P, U> CatalogService<C, E, P, U> {
    pub fn new(courses: Arc<C>, enrollments: Arc<E>, progress: Arc<P>, users: Arc<U>) -> Self {
        Self {
            courses,
            enrollments,
            progress,
            users,
        }
    }
}

impl<C, E, P, U> CatalogService<C, E, P, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    P: ProgressRepository,
    U: UserRepository,
{
    async fn progress_for(
        &self,
        user_id: &UserId,
        outlines: &[CourseOutline],
    ) -> Result<Vec<LessonProgress>, Error> {
        let lesson_ids: Vec<Uuid> = outlines
            .iter()
            .flat_map(|outline| outline.lessons().map(|lesson| lesson.id))
            .collect();
        if lesson_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.progress
            .list_for_lessons(user_id, &lesson_ids)
            .await
            .map_err(map_progress_error)
    }
}

#[async_trait]
impl<C, E, P, U> CatalogQuery for CatalogService<C, E, P, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    P: ProgressRepository,
    U: UserRepository,
{
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, Error> {
        self.courses.list_published().await.map_err(map_course_error)
    }

    async fn course_detail(
        &self,
        viewer: Option<UserId>,
        course_id: Uuid,
    ) -> Result<CourseDetail, Error> {
        let not_found = || Error::not_found(format!("course {course_id} not found"));
        let outline = self
            .courses
            .find_outline(course_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(not_found)?;

        let (access, progress) = match viewer {
            None => (CourseAccess::resolve(&outline.course, Viewer::Anonymous), Vec::new()),
            Some(user_id) => {
                let user = load_user(self.users.as_ref(), &user_id).await?;
                let viewer = viewer_for(self.enrollments.as_ref(), &user, course_id).await?;
                let access = CourseAccess::resolve(&outline.course, viewer);
                let progress = self
                    .progress_for(&user_id, std::slice::from_ref(&outline))
                    .await?;
                (access, progress)
            }
        };
        if !access.can_view {
            return Err(not_found());
        }

        Ok(CourseDetail::assemble(outline, access, progress))
    }

    async fn my_courses(&self, user_id: &UserId) -> Result<Vec<LearnerCourse>, Error> {
        let user = load_user(self.users.as_ref(), user_id).await?;
        let outlines = if user.can(Capability::ListAllCourses) {
            self.courses
                .published_outlines()
                .await
                .map_err(map_course_error)?
        } else {
            let course_ids = self
                .enrollments
                .enrolled_course_ids(user_id)
                .await
                .map_err(map_enrollment_error)?;
            if course_ids.is_empty() {
                return Ok(Vec::new());
            }
            self.courses
                .outlines_by_ids(&course_ids)
                .await
                .map_err(map_course_error)?
        };

        let mut by_lesson: HashMap<Uuid, LessonProgress> = self
            .progress_for(user_id, &outlines)
            .await?
            .into_iter()
            .map(|record| (record.lesson_id, record))
            .collect();

        Ok(outlines
            .into_iter()
            .map(|outline| {
                let records: Vec<LessonProgress> = outline
                    .lessons()
                    .filter_map(|lesson| by_lesson.remove(&lesson.id))
                    .collect();
                LearnerCourse {
                    completion: CourseCompletion::for_outline(&outline, &records),
                    course: outline.course,
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
