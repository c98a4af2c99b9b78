//! Per-course completion rolled up from lesson progress.
//!
//! Computed on every read; nothing here is persisted.

use std::collections::HashMap;

use uuid::Uuid;

use super::catalog::CourseOutline;
use super::progress::LessonProgress;

/// Completion figures shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CourseCompletion {
    pub total_lessons: u32,
    pub completed_lessons: u32,
    /// Whole percent in `0..=100`, rounded half up.
    pub total_progress: u32,
}

impl CourseCompletion {
    /// Build from raw counts.
    ///
    /// # Examples
    /// ```
    /// use lms_backend::domain::CourseCompletion;
    ///
    /// assert_eq!(CourseCompletion::from_counts(4, 1).total_progress, 25);
    /// assert_eq!(CourseCompletion::from_counts(3, 2).total_progress, 67);
    /// assert_eq!(CourseCompletion::from_counts(0, 0).total_progress, 0);
    /// ```
    pub fn from_counts(total_lessons: u32, completed_lessons: u32) -> Self {
        let completed_lessons = completed_lessons.min(total_lessons);
        let total_progress = if total_lessons == 0 {
            0
        } else {
            let total = u64::from(total_lessons);
            let done = u64::from(completed_lessons);
            // round(100 * done / total) with halves rounding up
            u32::try_from((200 * done + total) / (2 * total)).unwrap_or(100)
        };
        Self {
            total_lessons,
            completed_lessons,
            total_progress,
        }
    }

    /// Count the outline's lessons and those the viewer completed.
    pub fn for_outline<'a, I>(outline: &CourseOutline, progress: I) -> Self
    where
        I: IntoIterator<Item = &'a LessonProgress>,
    {
        let by_lesson: HashMap<Uuid, &LessonProgress> = progress
            .into_iter()
            .map(|record| (record.lesson_id, record))
            .collect();
        let (total, completed) = outline.lessons().fold((0_u32, 0_u32), |(total, done), lesson| {
            let finished = by_lesson
                .get(&lesson.id)
                .is_some_and(|record| record.status.is_completed());
            (total.saturating_add(1), done.saturating_add(u32::from(finished)))
        });
        Self::from_counts(total, completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Course, Lesson, Module, ModuleOutline, Price, ProgressObservation, ProgressStatus, UserId,
    };
    use chrono::Utc;
    use rstest::rstest;

    fn outline(lessons_per_module: &[usize]) -> CourseOutline {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: "Course".to_owned(),
            description: None,
            price: Price::ZERO,
            thumbnail_url: None,
            is_free: true,
            published: true,
            created_at: now,
            updated_at: now,
        };
        let modules = lessons_per_module
            .iter()
            .zip(1..)
            .map(|(count, position)| {
                let module = Module {
                    id: Uuid::new_v4(),
                    course_id: course.id,
                    title: format!("Module {position}"),
                    position,
                };
                let lessons = (1..=*count)
                    .zip(1..)
                    .map(|(_, lesson_position)| Lesson {
                        id: Uuid::new_v4(),
                        module_id: module.id,
                        title: format!("Lesson {lesson_position}"),
                        description: None,
                        video_id: format!("vid-{lesson_position}"),
                        duration_seconds: 600,
                        position: lesson_position,
                    })
                    .collect();
                ModuleOutline { module, lessons }
            })
            .collect();
        CourseOutline { course, modules }
    }

    fn progress_for(lesson_id: Uuid, status: ProgressStatus) -> LessonProgress {
        let observation = ProgressObservation::try_new(10, 50, Some(status)).expect("valid");
        LessonProgress::first(UserId::random(), lesson_id, observation, Utc::now())
    }

    #[rstest]
    #[case(4, 1, 25)]
    #[case(3, 1, 33)]
    #[case(3, 2, 67)]
    #[case(8, 1, 13)]
    #[case(2, 2, 100)]
    #[case(0, 0, 0)]
    fn rounds_half_up(#[case] total: u32, #[case] done: u32, #[case] expected: u32) {
        assert_eq!(CourseCompletion::from_counts(total, done).total_progress, expected);
    }

    #[rstest]
    fn one_of_four_completed_is_a_quarter() {
        let outline = outline(&[2, 2]);
        let first = outline.lessons().next().expect("a lesson").id;
        let second = outline.lessons().nth(1).expect("a lesson").id;
        let records = [
            progress_for(first, ProgressStatus::Completed),
            progress_for(second, ProgressStatus::Started),
        ];
        let completion = CourseCompletion::for_outline(&outline, &records);
        assert_eq!(
            completion,
            CourseCompletion {
                total_lessons: 4,
                completed_lessons: 1,
                total_progress: 25,
            }
        );
    }

    #[rstest]
    fn courses_without_lessons_report_zero() {
        let completion = CourseCompletion::for_outline(&outline(&[0, 0]), std::iter::empty());
        assert_eq!(completion, CourseCompletion::default());
    }

    #[rstest]
    fn progress_for_foreign_lessons_is_ignored() {
        let outline = outline(&[1]);
        let stray = progress_for(Uuid::new_v4(), ProgressStatus::Completed);
        let completion = CourseCompletion::for_outline(&outline, [&stray]);
        assert_eq!(completion.completed_lessons, 0);
        assert_eq!(completion.total_progress, 0);
    }
}
