//! Payment service: checkout and verified confirmation.
//!
//! Confirmation never trusts the client. The provider's transaction must be
//! `successful`, reference a pending payment minted for the same session user
//! and course, and cover its amount in its currency. Only then is the
//! enrollment inserted (if absent). Provider errors are reported as
//! "not confirmed" outcomes rather than request failures.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    CourseRepository, EnrollmentGrant, EnrollmentRepository, PaymentCommand, PaymentVerifier,
    PendingPaymentRepository, UserRepository,
};
use crate::domain::service_support::{
    load_user, map_course_error, map_enrollment_error, map_pending_payment_error,
};
use crate::domain::{
    Checkout, Enrollment, EnrollmentMethod, Error, PaymentConfirmation, PaymentOutcome,
    PendingPayment, UserId, VerificationStatus,
};

/// Ports the payment service depends on.
pub struct PaymentPorts<C, E, R, V, U> {
    pub courses: Arc<C>,
    pub enrollments: Arc<E>,
    pub pending: Arc<R>,
    pub verifier: Arc<V>,
    pub users: Arc<U>,
}

/// Payment service implementing [`PaymentCommand`].
pub struct PaymentService<C, E, R, V, U> {
    ports: PaymentPorts<C, E, R, V, U>,
    currency: String,
    clock: Arc<dyn Clock>,
}

impl<C, E, R, V, U> PaymentService<C, E, R, V, U> {
    /// Build the service charging in `currency` (an ISO code such as `MZN`).
    pub fn new(
        ports: PaymentPorts<C, E, R, V, U>,
        currency: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ports,
            currency: currency.into(),
            clock,
        }
    }
}

fn not_matching_checkout() -> PaymentOutcome {
    PaymentOutcome::not_confirmed("payment does not match a checkout for this course")
}

impl<C, E, R, V, U> PaymentService<C, E, R, V, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    R: PendingPaymentRepository,
    V: PaymentVerifier,
    U: UserRepository,
{
    async fn matching_pending(
        &self,
        user_id: &UserId,
        course_id: Uuid,
        tx_ref: &str,
    ) -> Result<Option<PendingPayment>, Error> {
        let Ok(reference) = tx_ref.trim().parse::<Uuid>() else {
            return Ok(None);
        };
        let pending = self
            .ports
            .pending
            .find_by_reference(reference)
            .await
            .map_err(map_pending_payment_error)?;
        Ok(pending.filter(|pending| &pending.user_id == user_id && pending.course_id == course_id))
    }
}

#[async_trait]
impl<C, E, R, V, U> PaymentCommand for PaymentService<C, E, R, V, U>
where
    C: CourseRepository,
    E: EnrollmentRepository,
    R: PendingPaymentRepository,
    V: PaymentVerifier,
    U: UserRepository,
{
    async fn checkout(&self, user_id: &UserId, course_id: Uuid) -> Result<Checkout, Error> {
        let course = self
            .ports
            .courses
            .find_course(course_id)
            .await
            .map_err(map_course_error)?
            .filter(|course| course.published)
            .ok_or_else(|| Error::not_found(format!("course {course_id} not found")))?;
        if course.is_free {
            return Err(Error::conflict("course is free; no payment is required"));
        }
        let user = load_user(self.ports.users.as_ref(), user_id).await?;
        let enrolled = self
            .ports
            .enrollments
            .is_enrolled(user_id, course_id)
            .await
            .map_err(map_enrollment_error)?;
        if enrolled {
            return Err(Error::conflict("already enrolled in this course"));
        }

        let pending = PendingPayment::mint(
            user_id.clone(),
            course_id,
            course.effective_price(),
            self.currency.as_str(),
            self.clock.utc(),
        );
        self.ports
            .pending
            .create(&pending)
            .await
            .map_err(map_pending_payment_error)?;
        info!(tx_ref = %pending.tx_ref, %course_id, %user_id, "checkout started");

        Ok(Checkout {
            pending,
            customer_email: user.email().to_string(),
            customer_name: user.name().as_ref().to_owned(),
            course_title: course.title,
        })
    }

    async fn confirm(
        &self,
        user_id: &UserId,
        confirmation: PaymentConfirmation,
    ) -> Result<PaymentOutcome, Error> {
        let course_id = confirmation.course_id();
        let verified = match self.ports.verifier.verify(confirmation.transaction_id()).await {
            Ok(verified) => verified,
            Err(error) => {
                warn!(
                    transaction_id = confirmation.transaction_id(),
                    %error,
                    "payment verification failed"
                );
                return Ok(PaymentOutcome::not_confirmed(
                    "payment could not be verified",
                ));
            }
        };
        match verified.status {
            VerificationStatus::Successful => {}
            VerificationStatus::Pending => return Ok(PaymentOutcome::pending()),
            VerificationStatus::Failed => {
                return Ok(PaymentOutcome::not_confirmed("payment was not successful"));
            }
        }

        let Some(pending) = self
            .matching_pending(user_id, course_id, &verified.tx_ref)
            .await?
        else {
            warn!(
                transaction_id = %verified.transaction_id,
                %course_id,
                "verified transaction does not reference a checkout for this user and course"
            );
            return Ok(not_matching_checkout());
        };
        if let Err(mismatch) = verified.settles(&pending) {
            warn!(tx_ref = %pending.tx_ref, %mismatch, "verified transaction does not settle checkout");
            return Ok(PaymentOutcome::not_confirmed(mismatch.to_string()));
        }

        let enrollment = Enrollment {
            user_id: user_id.clone(),
            course_id,
            method: EnrollmentMethod::Payment(verified.payment_type.clone()),
            transaction_id: Some(verified.transaction_id.clone()),
            amount: verified.amount,
            enrolled_at: self.clock.utc(),
        };
        let grant = self
            .ports
            .pending
            .settle(pending.tx_ref, &enrollment)
            .await
            .map_err(map_pending_payment_error)?;
        Ok(match grant {
            EnrollmentGrant::Created => {
                info!(%course_id, %user_id, "enrollment granted after payment");
                PaymentOutcome::granted()
            }
            EnrollmentGrant::AlreadyEnrolled => {
                info!(%course_id, %user_id, "payment replay for an existing enrollment");
                PaymentOutcome::granted()
            }
        })
    }
}

#[cfg(test)]
#[path = "payment_service_tests.rs"]
mod tests;
