//! Payment confirmation after the browser widget reports a charge.
//!
//! ```text
//! POST /api/v1/payments/confirm {"transactionId":"4821937","courseId":"…"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{PaymentConfirmation, PaymentOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_uuid, required};

/// Body for `POST /api/v1/payments/confirm`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    /// Provider transaction id reported by the widget callback.
    pub transaction_id: Option<TransactionId>,
    pub course_id: Option<String>,
}

/// Widgets report the id as a number or a string.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TransactionId {
    Text(String),
    Number(u64),
}

impl TransactionId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub message: String,
    #[schema(example = "successful")]
    pub status: String,
}

impl From<PaymentOutcome> for ConfirmPaymentResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            status: outcome.status.as_str().to_owned(),
        }
    }
}

fn parse_confirmation(payload: ConfirmPaymentRequest) -> ApiResult<PaymentConfirmation> {
    let transaction_id = required(payload.transaction_id, FieldName::new("transactionId"))?;
    let course_field = FieldName::new("courseId");
    let course_id = parse_uuid(&required(payload.course_id, course_field)?, course_field)?;
    PaymentConfirmation::try_new(&transaction_id.into_string(), course_id)
        .map_err(|err| invalid_field(&err))
}

/// Verify a provider transaction and enroll the caller when it settles.
///
/// Unsettled outcomes are reported with `success: false` and a `200`.
#[utoipa::path(
    post,
    path = "/api/v1/payments/confirm",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Verification outcome", body = ConfirmPaymentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "confirmPayment"
)]
#[post("/payments/confirm")]
pub async fn confirm_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ConfirmPaymentRequest>,
) -> ApiResult<web::Json<ConfirmPaymentResponse>> {
    let user_id = session.require_user_id()?;
    let confirmation = parse_confirmation(payload.into_inner())?;
    let outcome = state.payments.confirm(&user_id, confirmation).await?;
    Ok(web::Json(outcome.into()))
}
