//! PostgreSQL-backed `EnrollmentRepository` implementation.
//!
//! Enrollments are only ever written by payment settlement; see
//! [`super::DieselPendingPaymentRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{EnrollmentRepository, EnrollmentRepositoryError};

use super::diesel_error_mapping::repository_error_mappers;
use super::pool::DbPool;
use super::schema::enrollments;

/// Diesel-backed implementation of the enrollment port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(EnrollmentRepositoryError);

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn is_enrolled(
        &self,
        user_id: &UserId,
        course_id: Uuid,
    ) -> Result<bool, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            enrollments::table.find((*user_id.as_uuid(), course_id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn enrolled_course_ids(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Uuid>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        enrollments::table
            .filter(enrollments::user_id.eq(*user_id.as_uuid()))
            .order(enrollments::enrolled_at.desc())
            .select(enrollments::course_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
