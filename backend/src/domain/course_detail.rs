//! Read models assembled for course pages and the learner dashboard.

use std::collections::HashMap;

use uuid::Uuid;

use super::access::CourseAccess;
use super::catalog::{Course, CourseOutline, Lesson, Module};
use super::completion::CourseCompletion;
use super::progress::LessonProgress;

/// A lesson as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonView {
    pub lesson: Lesson,
    pub progress: Option<LessonProgress>,
    playable: bool,
}

impl LessonView {
    /// External video id, withheld when the viewer cannot play the course.
    pub fn video_id(&self) -> Option<&str> {
        self.playable.then_some(self.lesson.video_id.as_str())
    }

    pub fn resume_at_second(&self) -> i32 {
        self.progress
            .as_ref()
            .map_or(0, LessonProgress::resume_at_second)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleView {
    pub module: Module,
    pub lessons: Vec<LessonView>,
}

/// Everything the course page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub course: Course,
    pub modules: Vec<ModuleView>,
    pub can_access: bool,
    pub is_enrolled: bool,
    /// Lesson the player should open first.
    pub resume_lesson_id: Option<Uuid>,
    pub completion: CourseCompletion,
}

impl CourseDetail {
    /// Combine an outline with the viewer's access and progress.
    ///
    /// The resume lesson is the one most recently reported on, falling back
    /// to the first lesson in display order.
    pub fn assemble(
        outline: CourseOutline,
        access: CourseAccess,
        progress: Vec<LessonProgress>,
    ) -> Self {
        let outline = outline.sorted();
        let completion = CourseCompletion::for_outline(&outline, &progress);
        let first_lesson = outline.lessons().next().map(|lesson| lesson.id);
        let lesson_ids: Vec<Uuid> = outline.lessons().map(|lesson| lesson.id).collect();
        let latest = progress
            .iter()
            .filter(|record| lesson_ids.contains(&record.lesson_id))
            .max_by_key(|record| record.updated_at)
            .map(|record| record.lesson_id);

        let mut by_lesson: HashMap<Uuid, LessonProgress> = progress
            .into_iter()
            .map(|record| (record.lesson_id, record))
            .collect();
        let modules = outline
            .modules
            .into_iter()
            .map(|module| ModuleView {
                module: module.module,
                lessons: module
                    .lessons
                    .into_iter()
                    .map(|lesson| LessonView {
                        progress: by_lesson.remove(&lesson.id),
                        lesson,
                        playable: access.can_play,
                    })
                    .collect(),
            })
            .collect();

        Self {
            course: outline.course,
            modules,
            can_access: access.can_play,
            is_enrolled: access.is_enrolled,
            resume_lesson_id: latest.or(first_lesson),
            completion,
        }
    }
}

/// Dashboard entry for a course the viewer follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerCourse {
    pub course: Course,
    pub completion: CourseCompletion,
}
