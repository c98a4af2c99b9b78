//! PostgreSQL-backed `PendingPaymentRepository` implementation.
//!
//! Settlement inserts the enrollment if absent and stamps the checkout as
//! confirmed in one transaction. Replaying a confirmation is harmless: the
//! enrollment insert does nothing and the stamp keeps its first value.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    EnrollmentGrant, PendingPaymentRepository, PendingPaymentRepositoryError,
};
use crate::domain::{Enrollment, PendingPayment};

use super::diesel_error_mapping::repository_error_mappers;
use super::models::{NewEnrollmentRow, PendingPaymentRow};
use super::pool::DbPool;
use super::schema::{enrollments, pending_payments};

/// Diesel-backed implementation of the pending payment port.
#[derive(Clone)]
pub struct DieselPendingPaymentRepository {
    pool: DbPool,
}

impl DieselPendingPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

repository_error_mappers!(PendingPaymentRepositoryError);

#[async_trait]
impl PendingPaymentRepository for DieselPendingPaymentRepository {
    async fn create(&self, pending: &PendingPayment) -> Result<(), PendingPaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(pending_payments::table)
            .values(PendingPaymentRow::from(pending))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_reference(
        &self,
        tx_ref: Uuid,
    ) -> Result<Option<PendingPayment>, PendingPaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = pending_payments::table
            .find(tx_ref)
            .select(PendingPaymentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PendingPayment::try_from)
            .transpose()
            .map_err(PendingPaymentRepositoryError::query)
    }

    async fn settle(
        &self,
        tx_ref: Uuid,
        enrollment: &Enrollment,
    ) -> Result<EnrollmentGrant, PendingPaymentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let enrollment = enrollment.clone();
        conn.transaction(|conn| {
            async move {
                let inserted = diesel::insert_into(enrollments::table)
                    .values(NewEnrollmentRow::from(&enrollment))
                    .on_conflict((enrollments::user_id, enrollments::course_id))
                    .do_nothing()
                    .execute(conn)
                    .await?;

                diesel::update(
                    pending_payments::table
                        .find(tx_ref)
                        .filter(pending_payments::confirmed_at.is_null()),
                )
                .set(pending_payments::confirmed_at.eq(Some(enrollment.enrolled_at)))
                .execute(conn)
                .await?;

                Ok::<_, diesel::result::Error>(EnrollmentGrant::from_inserted_rows(inserted))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{Price, UserId};

    #[rstest]
    fn corrupt_amounts_surface_as_query_errors() {
        let row = PendingPaymentRow {
            tx_ref: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            amount_minor: -100,
            currency: "MZN".to_owned(),
            created_at: Utc::now(),
            confirmed_at: None,
        };
        let mapped = PendingPayment::try_from(row).map_err(PendingPaymentRepositoryError::query);
        assert!(matches!(
            mapped,
            Err(PendingPaymentRepositoryError::Query { .. })
        ));
    }

    #[rstest]
    fn rows_keep_the_checkout_amount() {
        let pending = PendingPayment::mint(
            UserId::random(),
            Uuid::new_v4(),
            "1500.50".parse::<Price>().expect("price"),
            "MZN",
            Utc::now(),
        );
        let row = PendingPaymentRow::from(&pending);
        assert_eq!(row.amount_minor, 150_050);
        assert_eq!(row.tx_ref, pending.tx_ref);
        assert!(row.confirmed_at.is_none());
    }
}
