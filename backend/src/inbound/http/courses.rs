//! Catalog reading and checkout handlers.
//!
//! ```text
//! GET  /api/v1/courses
//! GET  /api/v1/courses/{id}
//! GET  /api/v1/my-courses
//! POST /api/v1/courses/{id}/checkout
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Checkout;
use crate::inbound::http::ApiResult;
use crate::inbound::http::courses_dto::{
    CourseDetailResponse, CourseSummaryResponse, LearnerCourseResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const COURSE_ID: FieldName = FieldName::new("id");

/// What the browser payment widget needs to start a charge.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Server-minted reference the provider echoes back on verification.
    pub tx_ref: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    #[schema(example = "1500.00")]
    pub amount: String,
    #[schema(example = "MZN")]
    pub currency: String,
    pub customer_email: String,
    pub customer_name: String,
}

impl From<Checkout> for CheckoutResponse {
    fn from(started: Checkout) -> Self {
        Self {
            tx_ref: started.pending.tx_ref,
            course_id: started.pending.course_id,
            course_title: started.course_title,
            amount: started.pending.amount.to_string(),
            currency: started.pending.currency,
            customer_email: started.customer_email,
            customer_name: started.customer_name,
        }
    }
}

/// List published courses, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "Published courses", body = [CourseSummaryResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CourseSummaryResponse>>> {
    let courses = state.catalog.list_courses().await?;
    Ok(web::Json(courses.into_iter().map(Into::into).collect()))
}

/// Course with modules, lessons, and the caller's progress and access.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course detail", body = CourseDetailResponse),
        (status = 400, description = "Invalid course id", body = ErrorSchema),
        (status = 401, description = "Session user no longer exists", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([])
)]
#[get("/courses/{id}")]
pub async fn course_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseDetailResponse>> {
    let course_id = parse_uuid(&path.into_inner(), COURSE_ID)?;
    let viewer = session.user_id()?;
    let detail = state.catalog.course_detail(viewer, course_id).await?;
    Ok(web::Json(detail.into()))
}

/// Courses on the caller's dashboard with completion totals.
#[utoipa::path(
    get,
    path = "/api/v1/my-courses",
    responses(
        (status = 200, description = "Dashboard courses", body = [LearnerCourseResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listMyCourses"
)]
#[get("/my-courses")]
pub async fn my_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LearnerCourseResponse>>> {
    let user_id = session.require_user_id()?;
    let courses = state.catalog.my_courses(&user_id).await?;
    Ok(web::Json(courses.into_iter().map(Into::into).collect()))
}

/// Start paying for a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/checkout",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Pending payment", body = CheckoutResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "Course is free or already owned", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "checkoutCourse"
)]
#[post("/courses/{id}/checkout")]
pub async fn checkout(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CheckoutResponse>> {
    let user_id = session.require_user_id()?;
    let course_id = parse_uuid(&path.into_inner(), COURSE_ID)?;
    let started = state.payments.checkout(&user_id, course_id).await?;
    Ok(web::Json(started.into()))
}
