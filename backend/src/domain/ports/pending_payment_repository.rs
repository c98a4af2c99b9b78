//! Driven port for checkouts awaiting confirmation and their settlement.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Enrollment, PendingPayment};

use super::EnrollmentGrant;
use super::define_port_error;

define_port_error! {
    /// Errors raised by pending payment adapters.
    pub enum PendingPaymentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "pending payment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "pending payment repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PendingPaymentRepository: Send + Sync {
    async fn create(&self, pending: &PendingPayment) -> Result<(), PendingPaymentRepositoryError>;

    async fn find_by_reference(
        &self,
        tx_ref: Uuid,
    ) -> Result<Option<PendingPayment>, PendingPaymentRepositoryError>;

    /// Insert the enrollment if absent and mark the pending payment
    /// confirmed, in one transaction.
    async fn settle(
        &self,
        tx_ref: Uuid,
        enrollment: &Enrollment,
    ) -> Result<EnrollmentGrant, PendingPaymentRepositoryError>;
}

/// Fixture repository that remembers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePendingPaymentRepository;

#[async_trait]
impl PendingPaymentRepository for FixturePendingPaymentRepository {
    async fn create(&self, _pending: &PendingPayment) -> Result<(), PendingPaymentRepositoryError> {
        Ok(())
    }

    async fn find_by_reference(
        &self,
        _tx_ref: Uuid,
    ) -> Result<Option<PendingPayment>, PendingPaymentRepositoryError> {
        Ok(None)
    }

    async fn settle(
        &self,
        _tx_ref: Uuid,
        _enrollment: &Enrollment,
    ) -> Result<EnrollmentGrant, PendingPaymentRepositoryError> {
        Ok(EnrollmentGrant::Created)
    }
}
