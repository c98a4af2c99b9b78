//! Reqwest-backed payment verifier.
//!
//! Calls `GET {base}/v3/transactions/{id}/verify` with the secret key as a
//! bearer token. Transport, status, and decoding failures map onto
//! [`PaymentVerifierError`]; none of them is ever treated as a confirmation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::dto::VerifyResponseDto;
use crate::domain::VerifiedTransaction;
use crate::domain::ports::{PaymentVerifier, PaymentVerifierError};

/// Verifier that asks the provider's REST API about a transaction.
pub struct HttpPaymentVerifier {
    client: Client,
    base_url: Url,
    secret_key: Zeroizing<String>,
}

impl HttpPaymentVerifier {
    /// Build a verifier with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            secret_key: Zeroizing::new(secret_key.into()),
        })
    }

    fn verify_url(&self, transaction_id: &str) -> Result<Url, PaymentVerifierError> {
        verify_url(&self.base_url, transaction_id)
    }
}

fn verify_url(base_url: &Url, transaction_id: &str) -> Result<Url, PaymentVerifierError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| PaymentVerifierError::not_configured())?
        .pop_if_empty()
        .extend(["v3", "transactions", transaction_id, "verify"]);
    Ok(url)
}

#[async_trait]
impl PaymentVerifier for HttpPaymentVerifier {
    async fn verify(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedTransaction, PaymentVerifierError> {
        let url = self.verify_url(transaction_id)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.secret_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let transaction = parse_verification(body.as_ref())?;
        debug!(
            transaction_id = %transaction.transaction_id,
            status = transaction.status.as_str(),
            "payment provider answered"
        );
        Ok(transaction)
    }
}

fn parse_verification(body: &[u8]) -> Result<VerifiedTransaction, PaymentVerifierError> {
    let decoded: VerifyResponseDto = serde_json::from_slice(body).map_err(|error| {
        PaymentVerifierError::decode(format!("invalid verification payload: {error}"))
    })?;
    decoded.into_domain().map_err(PaymentVerifierError::decode)
}

fn map_transport_error(error: reqwest::Error) -> PaymentVerifierError {
    if error.is_timeout() {
        PaymentVerifierError::timeout(error.to_string())
    } else {
        PaymentVerifierError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentVerifierError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PaymentVerifierError::timeout(format!("status {}", status.as_u16()))
        }
        _ => PaymentVerifierError::rejected(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
