//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api/v1` plus the health probes,
//! the request and response DTOs, and the domain error wrappers from
//! [`crate::inbound::http::schemas`]. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::admin::{
    CourseRequest, LessonRequest, LessonResponse, ModuleRequest, ModuleResponse,
};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::courses::CheckoutResponse;
use crate::inbound::http::courses_dto::{
    CompletionResponse, CourseDetailResponse, CourseResponse, CourseSummaryResponse,
    LearnerCourseResponse, LessonDetailResponse, ModuleDetailResponse, ProgressResponse,
};
use crate::inbound::http::payments::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, TransactionId,
};
use crate::inbound::http::progress::ProgressRequest;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::UserResponse;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "LMS backend API",
        description = "Course catalog, lesson progress, checkout and payment confirmation, \
                       and catalog authoring."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::course_detail,
        crate::inbound::http::courses::my_courses,
        crate::inbound::http::courses::checkout,
        crate::inbound::http::progress::report_progress,
        crate::inbound::http::payments::confirm_payment,
        crate::inbound::http::admin::create_course,
        crate::inbound::http::admin::update_course,
        crate::inbound::http::admin::create_module,
        crate::inbound::http::admin::delete_module,
        crate::inbound::http::admin::create_lesson,
        crate::inbound::http::admin::delete_lesson,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        UserResponse,
        CourseResponse,
        CourseSummaryResponse,
        CourseDetailResponse,
        ModuleDetailResponse,
        LessonDetailResponse,
        LearnerCourseResponse,
        CompletionResponse,
        ProgressRequest,
        ProgressResponse,
        CheckoutResponse,
        ConfirmPaymentRequest,
        ConfirmPaymentResponse,
        TransactionId,
        CourseRequest,
        ModuleRequest,
        ModuleResponse,
        LessonRequest,
        LessonResponse,
    )),
    tags(
        (name = "auth", description = "Registration and cookie sessions"),
        (name = "users", description = "The signed-in account"),
        (name = "courses", description = "Public catalog, course detail, and checkout"),
        (name = "progress", description = "Per-lesson watch progress"),
        (name = "payments", description = "Payment confirmation and enrollment"),
        (name = "admin", description = "Catalog authoring"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema field structure.

    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/auth/register")]
    #[case("/api/v1/courses/{id}")]
    #[case("/api/v1/courses/{id}/checkout")]
    #[case("/api/v1/progress")]
    #[case("/api/v1/payments/confirm")]
    #[case("/api/v1/admin/modules/{id}/lessons")]
    #[case("/health/ready")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    fn course_detail_schema_is_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let detail = schemas
            .get("CourseDetailResponse")
            .expect("course detail schema");
        let json = serde_json::to_string(detail).expect("schema serialises");
        assert!(json.contains("canAccess"));
        assert!(!json.contains("can_access"));
    }
}
