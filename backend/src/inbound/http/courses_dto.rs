//! JSON shapes for catalog, course detail, and progress responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Course, CourseCompletion, CourseDetail, CourseSummary, LearnerCourse, LessonProgress,
    LessonView, ModuleView,
};

/// A course as shown to clients. `price` is the effective price.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "1500.00")]
    pub price: String,
    pub thumbnail_url: Option<String>,
    pub is_free: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            price: course.effective_price().to_string(),
            title: course.title,
            description: course.description,
            thumbnail_url: course.thumbnail_url,
            is_free: course.is_free,
            published: course.published,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

/// Public catalog entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub module_count: i64,
}

impl From<CourseSummary> for CourseSummaryResponse {
    fn from(summary: CourseSummary) -> Self {
        Self {
            course: summary.course.into(),
            module_count: summary.module_count,
        }
    }
}

/// Completion roll-up for one course.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub total_lessons: u32,
    pub completed_lessons: u32,
    /// Percentage of completed lessons, rounded half up.
    pub total_progress: u32,
}

impl From<CourseCompletion> for CompletionResponse {
    fn from(value: CourseCompletion) -> Self {
        Self {
            total_lessons: value.total_lessons,
            completed_lessons: value.completed_lessons,
            total_progress: value.total_progress,
        }
    }
}

/// Stored progress for one lesson.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub lesson_id: Uuid,
    pub last_watched_second: i32,
    pub progress_percent: i32,
    #[schema(example = "started")]
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl From<LessonProgress> for ProgressResponse {
    fn from(progress: LessonProgress) -> Self {
        Self {
            lesson_id: progress.lesson_id,
            last_watched_second: progress.last_watched_second,
            progress_percent: progress.percent,
            status: progress.status.as_str().to_owned(),
            updated_at: progress.updated_at,
        }
    }
}

/// A lesson inside course detail. `videoId` is null unless playable.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetailResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_id: Option<String>,
    pub duration_seconds: i32,
    pub position: i32,
    pub progress: Option<ProgressResponse>,
    /// Where the player should seek on open; 0 to start over.
    pub resume_at_second: i32,
}

impl From<LessonView> for LessonDetailResponse {
    fn from(view: LessonView) -> Self {
        let video_id = view.video_id().map(str::to_owned);
        let resume_at_second = view.resume_at_second();
        let LessonView {
            lesson, progress, ..
        } = view;
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            title: lesson.title,
            description: lesson.description,
            video_id,
            duration_seconds: lesson.duration_seconds,
            position: lesson.position,
            progress: progress.map(ProgressResponse::from),
            resume_at_second,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDetailResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
    pub lessons: Vec<LessonDetailResponse>,
}

impl From<ModuleView> for ModuleDetailResponse {
    fn from(view: ModuleView) -> Self {
        Self {
            id: view.module.id,
            course_id: view.module.course_id,
            title: view.module.title,
            position: view.module.position,
            lessons: view.lessons.into_iter().map(Into::into).collect(),
        }
    }
}

/// Course detail scoped to the caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub modules: Vec<ModuleDetailResponse>,
    pub can_access: bool,
    pub is_enrolled: bool,
    pub resume_lesson_id: Option<Uuid>,
    #[serde(flatten)]
    pub completion: CompletionResponse,
}

impl From<CourseDetail> for CourseDetailResponse {
    fn from(detail: CourseDetail) -> Self {
        Self {
            course: detail.course.into(),
            modules: detail.modules.into_iter().map(Into::into).collect(),
            can_access: detail.can_access,
            is_enrolled: detail.is_enrolled,
            resume_lesson_id: detail.resume_lesson_id,
            completion: detail.completion.into(),
        }
    }
}

/// Dashboard entry in "my courses".
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LearnerCourseResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    #[serde(flatten)]
    pub completion: CompletionResponse,
}

impl From<LearnerCourse> for LearnerCourseResponse {
    fn from(entry: LearnerCourse) -> Self {
        Self {
            course: entry.course.into(),
            completion: entry.completion.into(),
        }
    }
}
