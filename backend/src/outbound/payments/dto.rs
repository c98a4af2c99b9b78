//! DTOs for decoding the provider's transaction verification response.

use serde::Deserialize;

use crate::domain::{Price, VerificationStatus, VerifiedTransaction};

#[derive(Debug, Deserialize)]
pub(super) struct VerifyResponseDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) data: Option<TransactionDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TransactionDto {
    pub(super) id: TransactionIdDto,
    pub(super) status: String,
    pub(super) tx_ref: String,
    pub(super) amount: Price,
    pub(super) currency: String,
    #[serde(default)]
    pub(super) payment_type: Option<String>,
}

/// Numeric on the wire, but tolerated as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum TransactionIdDto {
    Number(u64),
    Text(String),
}

impl VerifyResponseDto {
    pub(super) fn into_domain(self) -> Result<VerifiedTransaction, String> {
        if !self.status.eq_ignore_ascii_case("success") {
            let message = self.message.unwrap_or_default();
            return Err(format!("provider reported {}: {message}", self.status));
        }
        self.data
            .map(TransactionDto::into_domain)
            .ok_or_else(|| "verification response has no data".to_owned())
    }
}

impl TransactionDto {
    fn into_domain(self) -> VerifiedTransaction {
        let transaction_id = match self.id {
            TransactionIdDto::Number(id) => id.to_string(),
            TransactionIdDto::Text(id) => id,
        };
        VerifiedTransaction {
            transaction_id,
            status: VerificationStatus::from_provider(&self.status),
            tx_ref: self.tx_ref,
            amount: self.amount,
            currency: self.currency,
            payment_type: self.payment_type,
        }
    }
}
