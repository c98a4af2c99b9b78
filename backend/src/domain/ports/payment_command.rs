//! Driving port for checkout and payment confirmation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Checkout, Error, PaymentConfirmation, PaymentOutcome, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Mint a pending payment for a paid course.
    async fn checkout(&self, user_id: &UserId, course_id: Uuid) -> Result<Checkout, Error>;

    /// Verify a provider transaction and grant the enrollment it pays for.
    async fn confirm(
        &self,
        user_id: &UserId,
        confirmation: PaymentConfirmation,
    ) -> Result<PaymentOutcome, Error>;
}

/// Fixture command with no purchasable courses and no provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentCommand;

#[async_trait]
impl PaymentCommand for FixturePaymentCommand {
    async fn checkout(&self, _user_id: &UserId, course_id: Uuid) -> Result<Checkout, Error> {
        Err(Error::not_found(format!("course {course_id} not found")))
    }

    async fn confirm(
        &self,
        _user_id: &UserId,
        _confirmation: PaymentConfirmation,
    ) -> Result<PaymentOutcome, Error> {
        Ok(PaymentOutcome::not_confirmed(
            "payment provider is not configured",
        ))
    }
}
