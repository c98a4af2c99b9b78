//! Progress service: access-checked merging of player reports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CourseRepository, EnrollmentRepository, ProgressCommand, ProgressRepository, UserRepository,
};
use crate::domain::service_support::{
    load_user, map_course_error, map_progress_error, viewer_for,
};
use crate::domain::{CourseAccess, Error, LessonProgress, ProgressObservation, UserId};

/// Progress service implementing [`ProgressCommand`].
#[derive(Clone)]
pub struct ProgressService<C, E, P, U> {
    courses: Arc<C>,
    enrollments: Arc<E>,
    progress: Arc<P>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C, E, P, U> ProgressService<C, E, P, U> {
    pub fn new(
        courses: Arc<C>,
        enrollments: Arc<E>,
        progress: Arc<P>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            courses,
            enrollments,
            progress,
            users,
            clock,
        }
    }
}

#[async_trait]
impl<C, E, P, U> ProgressCommand for ProgressService<C, E, P, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    P: ProgressRepository,
    U: UserRepository,
{
    async fn report(
        &self,
        user_id: &UserId,
        lesson_id: Uuid,
        observation: ProgressObservation,
    ) -> Result<LessonProgress, Error> {
        let course = self
            .courses
            .course_for_lesson(lesson_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(format!("lesson {lesson_id} not found")))?;
        let user = load_user(self.users.as_ref(), user_id).await?;
        let viewer = viewer_for(self.enrollments.as_ref(), &user, course.id).await?;
        if !CourseAccess::resolve(&course, viewer).can_play {
            return Err(Error::forbidden("you do not have access to this course"));
        }

        let record = self
            .progress
            .record(user_id, lesson_id, observation, self.clock.utc())
            .await
            .map_err(map_progress_error)?;
        debug!(
            %user_id,
            %lesson_id,
            percent = record.percent,
            status = %record.status,
            "lesson progress recorded"
        );
        Ok(record)
    }
}

#[cfg(test)]
#[path = "progress_service_tests.rs"]
mod tests;
