//! Helpers shared by the domain services: port error mapping and viewer
//! lookup.

use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    CatalogAuthoringRepositoryError, CourseRepositoryError, EnrollmentRepository,
    EnrollmentRepositoryError, PendingPaymentRepositoryError, ProgressRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Error, User, UserId, Viewer};

macro_rules! map_connection_query_error {
    ($fn_name:ident, $error:ident, $label:literal) => {
        pub(crate) fn $fn_name(error: $error) -> Error {
            match error {
                $error::Connection { message } => {
                    Error::service_unavailable(format!(concat!($label, " unavailable: {}"), message))
                }
                $error::Query { message } => {
                    Error::internal(format!(concat!($label, " error: {}"), message))
                }
            }
        }
    };
}

map_connection_query_error!(map_course_error, CourseRepositoryError, "course repository");
map_connection_query_error!(
    map_authoring_error,
    CatalogAuthoringRepositoryError,
    "catalog authoring repository"
);
map_connection_query_error!(
    map_enrollment_error,
    EnrollmentRepositoryError,
    "enrollment repository"
);
map_connection_query_error!(map_progress_error, ProgressRepositoryError, "progress repository");
map_connection_query_error!(
    map_pending_payment_error,
    PendingPaymentRepositoryError,
    "pending payment repository"
);

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict("email already registered")
            .with_details(json!({ "field": "email", "code": "duplicate_email" })),
    }
}

/// Load the session user, rejecting sessions whose user no longer exists.
pub(crate) async fn load_user<U>(users: &U, user_id: &UserId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_id(user_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::unauthorized("session user no longer exists"))
}

/// Build the access viewer for `user` on `course_id`.
pub(crate) async fn viewer_for<E>(
    enrollments: &E,
    user: &User,
    course_id: Uuid,
) -> Result<Viewer, Error>
where
    E: EnrollmentRepository + ?Sized,
{
    let enrolled = enrollments
        .is_enrolled(user.id(), course_id)
        .await
        .map_err(map_enrollment_error)?;
    Ok(Viewer::Authenticated {
        role: user.role(),
        enrolled,
    })
}
