//! Administrator catalog authoring.
//!
//! ```text
//! POST   /api/v1/admin/courses
//! PUT    /api/v1/admin/courses/{id}
//! POST   /api/v1/admin/courses/{id}/modules
//! DELETE /api/v1/admin/modules/{id}
//! POST   /api/v1/admin/modules/{id}/lessons
//! DELETE /api/v1/admin/lessons/{id}
//! ```
//!
//! Handlers only check that a session exists; the authoring service decides
//! whether the user may write.

use actix_web::{HttpResponse, delete, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CatalogValidationError, CourseDraft, Lesson, LessonDraft, Module, ModuleDraft, Price,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::courses_dto::CourseResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_uuid, required};

/// Body for creating or replacing a course.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Decimal string or number, e.g. `"1500.00"` or `1500`.
    #[schema(value_type = Option<String>, example = "1500.00")]
    pub price: Option<Value>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRequest {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_id: Option<String>,
    #[serde(default)]
    pub duration_seconds: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

impl From<Module> for ModuleResponse {
    fn from(module: Module) -> Self {
        Self {
            id: module.id,
            course_id: module.course_id,
            title: module.title,
            position: module.position,
        }
    }
}

/// Lesson as seen by its author, video id included.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_id: String,
    pub duration_seconds: i32,
    pub position: i32,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            title: lesson.title,
            description: lesson.description,
            video_id: lesson.video_id,
            duration_seconds: lesson.duration_seconds,
            position: lesson.position,
        }
    }
}

fn parse_price(raw: Option<Value>) -> ApiResult<Option<Price>> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value::<Price>(value)
            .map(Some)
            .map_err(|_| invalid_field(&CatalogValidationError::InvalidPrice)),
    }
}

fn parse_course(payload: CourseRequest) -> ApiResult<CourseDraft> {
    let title = required(payload.title, FieldName::new("title"))?;
    let price = parse_price(payload.price)?;
    CourseDraft::try_new(
        &title,
        payload.description,
        price,
        payload.thumbnail_url,
        payload.is_free,
        payload.published,
    )
    .map_err(|err| invalid_field(&err))
}

fn parse_module(payload: ModuleRequest) -> ApiResult<ModuleDraft> {
    let title = required(payload.title, FieldName::new("title"))?;
    ModuleDraft::try_new(&title).map_err(|err| invalid_field(&err))
}

fn parse_lesson(payload: LessonRequest) -> ApiResult<LessonDraft> {
    let title = required(payload.title, FieldName::new("title"))?;
    let video_id = required(payload.video_id, FieldName::new("videoId"))?;
    LessonDraft::try_new(
        &title,
        payload.description,
        &video_id,
        payload.duration_seconds,
    )
    .map_err(|err| invalid_field(&err))
}

fn path_id(path: web::Path<String>) -> ApiResult<Uuid> {
    parse_uuid(&path.into_inner(), FieldName::new("id"))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createCourse"
)]
#[post("/admin/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let draft = parse_course(payload.into_inner())?;
    let course = state.authoring.create_course(&actor, draft).await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateCourse"
)]
#[put("/admin/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CourseRequest>,
) -> ApiResult<web::Json<CourseResponse>> {
    let actor = session.require_user_id()?;
    let course_id = path_id(path)?;
    let draft = parse_course(payload.into_inner())?;
    let course = state
        .authoring
        .update_course(&actor, course_id, draft)
        .await?;
    Ok(web::Json(course.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/courses/{id}/modules",
    params(("id" = String, Path, description = "Course id")),
    request_body = ModuleRequest,
    responses(
        (status = 201, description = "Module appended", body = ModuleResponse),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createModule"
)]
#[post("/admin/courses/{id}/modules")]
pub async fn create_module(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ModuleRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let course_id = path_id(path)?;
    let draft = parse_module(payload.into_inner())?;
    let module = state
        .authoring
        .create_module(&actor, course_id, draft)
        .await?;
    Ok(HttpResponse::Created().json(ModuleResponse::from(module)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/modules/{id}",
    params(("id" = String, Path, description = "Module id")),
    responses(
        (status = 204, description = "Module and its lessons deleted"),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Module not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteModule"
)]
#[delete("/admin/modules/{id}")]
pub async fn delete_module(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let module_id = path_id(path)?;
    state.authoring.delete_module(&actor, module_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/modules/{id}/lessons",
    params(("id" = String, Path, description = "Module id")),
    request_body = LessonRequest,
    responses(
        (status = 201, description = "Lesson appended", body = LessonResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Module not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createLesson"
)]
#[post("/admin/modules/{id}/lessons")]
pub async fn create_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<LessonRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let module_id = path_id(path)?;
    let draft = parse_lesson(payload.into_inner())?;
    let lesson = state
        .authoring
        .create_lesson(&actor, module_id, draft)
        .await?;
    Ok(HttpResponse::Created().json(LessonResponse::from(lesson)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lessons/{id}",
    params(("id" = String, Path, description = "Lesson id")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Lesson not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteLesson"
)]
#[delete("/admin/lessons/{id}")]
pub async fn delete_lesson(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let lesson_id = path_id(path)?;
    state.authoring.delete_lesson(&actor, lesson_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
