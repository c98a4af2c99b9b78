//! Driven port for asking the payment provider about a transaction.

use async_trait::async_trait;

use crate::domain::VerifiedTransaction;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while verifying a transaction.
    ///
    /// Every variant means "not confirmed"; none of them grants access.
    pub enum PaymentVerifierError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "payment verifier transport failed: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } => "payment verifier timeout: {message}",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "payment verifier rejected request with status {status}: {message}",
        /// The provider's body could not be decoded.
        Decode { message: String } => "payment verifier response decode failed: {message}",
        /// No provider credentials are configured.
        NotConfigured => "payment verifier is not configured",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Look up a transaction by the provider's transaction id.
    async fn verify(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedTransaction, PaymentVerifierError>;
}

/// Fixture verifier used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentVerifier;

#[async_trait]
impl PaymentVerifier for FixturePaymentVerifier {
    async fn verify(
        &self,
        _transaction_id: &str,
    ) -> Result<VerifiedTransaction, PaymentVerifierError> {
        Err(PaymentVerifierError::not_configured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_verifier_never_confirms() {
        let result = FixturePaymentVerifier.verify("4811").await;
        assert_eq!(result, Err(PaymentVerifierError::NotConfigured));
    }

    #[rstest]
    fn rejected_error_reports_status() {
        let error = PaymentVerifierError::rejected(401_u16, "invalid authorization key");
        assert_eq!(
            error.to_string(),
            "payment verifier rejected request with status 401: invalid authorization key"
        );
    }
}
