//! Lesson progress reports from the video player.
//!
//! ```text
//! POST /api/v1/progress {"lessonId":"…","lastWatchedSecond":120,"progressPercent":40}
//! ```

use actix_web::{post, web};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ProgressObservation, ProgressStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::courses_dto::ProgressResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_uuid, required};

/// Body for `POST /api/v1/progress`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub lesson_id: Option<String>,
    pub last_watched_second: Option<i32>,
    pub progress_percent: Option<i32>,
    /// `started` or `completed`; derived from the percentage when omitted.
    pub status: Option<String>,
}

fn parse_report(payload: ProgressRequest) -> ApiResult<(Uuid, ProgressObservation)> {
    let lesson_field = FieldName::new("lessonId");
    let lesson_id = parse_uuid(&required(payload.lesson_id, lesson_field)?, lesson_field)?;
    let seconds = required(
        payload.last_watched_second,
        FieldName::new("lastWatchedSecond"),
    )?;
    let percent = required(payload.progress_percent, FieldName::new("progressPercent"))?;
    let status = payload
        .status
        .map(|raw| raw.trim().parse::<ProgressStatus>())
        .transpose()
        .map_err(|err| invalid_field(&err))?;
    let observation =
        ProgressObservation::try_new(seconds, percent, status).map_err(|err| invalid_field(&err))?;
    Ok((lesson_id, observation))
}

/// Record playback progress for the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/progress",
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Stored progress after merging", body = ProgressResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "No access to the lesson's course", body = ErrorSchema),
        (status = 404, description = "Lesson not found", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "reportProgress"
)]
#[post("/progress")]
pub async fn report_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProgressRequest>,
) -> ApiResult<web::Json<ProgressResponse>> {
    let user_id = session.require_user_id()?;
    let (lesson_id, observation) = parse_report(payload.into_inner())?;
    let stored = state
        .progress
        .report(&user_id, lesson_id, observation)
        .await?;
    Ok(web::Json(stored.into()))
}
