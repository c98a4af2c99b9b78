//! Checkout, payment verification, and enrollment values.
//!
//! Checkout mints a [`PendingPayment`] whose reference the browser widget
//! hands to the payment provider. Confirmation only grants an
//! [`Enrollment`] when the provider's verified transaction settles that
//! pending payment for the same user and course.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::Price;
use super::user::UserId;

/// How an enrollment came to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentMethod {
    /// Granted after a verified payment; carries the provider's method name
    /// (`card`, `mobilemoneymz`, ...) when reported.
    Payment(Option<String>),
    /// Seeded or granted without payment.
    Manual,
}

impl EnrollmentMethod {
    /// Label stored alongside the enrollment.
    pub fn label(&self) -> &str {
        match self {
            Self::Payment(Some(kind)) => kind,
            Self::Payment(None) => "payment",
            Self::Manual => "manual",
        }
    }

    /// Rebuild from the stored label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "manual" => Self::Manual,
            "payment" => Self::Payment(None),
            other => Self::Payment(Some(other.to_owned())),
        }
    }
}

/// Granted access to a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub user_id: UserId,
    pub course_id: Uuid,
    pub method: EnrollmentMethod,
    pub transaction_id: Option<String>,
    pub amount: Price,
    pub enrolled_at: DateTime<Utc>,
}

/// A checkout awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    /// Reference handed to the provider as `tx_ref`.
    pub tx_ref: Uuid,
    pub user_id: UserId,
    pub course_id: Uuid,
    pub amount: Price,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl PendingPayment {
    /// Mint a fresh pending payment.
    pub fn mint(
        user_id: UserId,
        course_id: Uuid,
        amount: Price,
        currency: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tx_ref: Uuid::new_v4(),
            user_id,
            course_id,
            amount,
            currency: currency.into(),
            created_at: now,
            confirmed_at: None,
        }
    }
}

/// Checkout details returned to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub pending: PendingPayment,
    pub customer_email: String,
    pub customer_name: String,
    pub course_title: String,
}

/// Provider-reported state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Successful,
    Pending,
    Failed,
}

impl VerificationStatus {
    /// Classify the provider's status string. Anything unrecognised fails.
    pub fn from_provider(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "successful" => Self::Successful,
            "pending" => Self::Pending,
            _ => Self::Failed,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction as reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTransaction {
    pub transaction_id: String,
    pub status: VerificationStatus,
    pub tx_ref: String,
    pub amount: Price,
    pub currency: String,
    pub payment_type: Option<String>,
}

/// Why a successful provider transaction cannot settle a pending payment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementMismatch {
    #[error("transaction reference does not match the checkout")]
    Reference,
    #[error("paid currency {paid} does not match {expected}")]
    Currency { paid: String, expected: String },
    #[error("paid amount {paid} is below {expected}")]
    Amount { paid: Price, expected: Price },
}

impl VerifiedTransaction {
    /// Check this transaction settles `pending`.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use lms_backend::domain::{
    ///     PendingPayment, Price, UserId, VerificationStatus, VerifiedTransaction,
    /// };
    /// use uuid::Uuid;
    ///
    /// let price: Price = "1500".parse().expect("price");
    /// let pending = PendingPayment::mint(UserId::random(), Uuid::new_v4(), price, "MZN", Utc::now());
    /// let verified = VerifiedTransaction {
    ///     transaction_id: "4811".into(),
    ///     status: VerificationStatus::Successful,
    ///     tx_ref: pending.tx_ref.to_string(),
    ///     amount: price,
    ///     currency: "mzn".into(),
    ///     payment_type: Some("card".into()),
    /// };
    /// assert!(verified.settles(&pending).is_ok());
    /// ```
    pub fn settles(&self, pending: &PendingPayment) -> Result<(), SettlementMismatch> {
        let reference_matches = self
            .tx_ref
            .trim()
            .parse::<Uuid>()
            .is_ok_and(|reference| reference == pending.tx_ref);
        if !reference_matches {
            return Err(SettlementMismatch::Reference);
        }
        if !self.currency.trim().eq_ignore_ascii_case(&pending.currency) {
            return Err(SettlementMismatch::Currency {
                paid: self.currency.clone(),
                expected: pending.currency.clone(),
            });
        }
        if self.amount < pending.amount {
            return Err(SettlementMismatch::Amount {
                paid: self.amount,
                expected: pending.amount,
            });
        }
        Ok(())
    }
}

/// Confirmation request after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    transaction_id: String,
    course_id: Uuid,
}

/// Validation failures for confirmation input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentValidationError {
    #[error("transactionId must not be empty")]
    EmptyTransactionId,
}

impl PaymentConfirmation {
    pub fn try_new(
        transaction_id: &str,
        course_id: Uuid,
    ) -> Result<Self, PaymentValidationError> {
        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(PaymentValidationError::EmptyTransactionId);
        }
        Ok(Self {
            transaction_id: transaction_id.to_owned(),
            course_id,
        })
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }
}

/// Result reported to the client after a confirmation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub success: bool,
    pub message: String,
    pub status: VerificationStatus,
}

impl PaymentOutcome {
    /// Also returned when the transaction had already been settled.
    pub fn granted() -> Self {
        Self {
            success: true,
            message: "Payment confirmed and enrollment granted".to_owned(),
            status: VerificationStatus::Successful,
        }
    }

    pub fn pending() -> Self {
        Self {
            success: false,
            message: "Payment is still pending".to_owned(),
            status: VerificationStatus::Pending,
        }
    }

    pub fn not_confirmed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            message: reason.into(),
            status: VerificationStatus::Failed,
        }
    }
}
