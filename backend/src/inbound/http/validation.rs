//! Request validation helpers shared by the HTTP handlers.
//!
//! Every rejection is an `invalid_request` error whose details name the
//! offending JSON field and a stable code, e.g.
//! `{"field": "email", "code": "invalid_email"}`.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    CatalogValidationError, CredentialsValidationError, Error, PaymentValidationError,
    ProgressValidationError, UserValidationError,
};

/// Newtype for JSON field and path parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

/// A domain validation failure that can be pinned to one request field.
pub(crate) trait FieldViolation: std::fmt::Display {
    fn field(&self) -> &'static str;
    fn code(&self) -> &'static str;
}

/// Convert a field-level violation into a `400` error.
pub(crate) fn invalid_field(violation: &impl FieldViolation) -> Error {
    Error::invalid_request(violation.to_string()).with_details(json!({
        "field": violation.field(),
        "code": violation.code(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

fn body_error_code(error: &JsonPayloadError) -> &'static str {
    match error {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "body_too_large"
        }
        JsonPayloadError::ContentType => "unsupported_content_type",
        JsonPayloadError::Deserialize(err) if err.is_data() => "invalid_type",
        _ => "malformed_body",
    }
}

/// Map a JSON extractor failure to an `invalid_request` error with body details.
pub(crate) fn json_body_error(error: &JsonPayloadError) -> Error {
    Error::invalid_request(format!("invalid JSON body: {error}")).with_details(json!({
        "field": "body",
        "code": body_error_code(error),
    }))
}

/// JSON extractor settings that render body failures like every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| json_body_error(&err).into())
}

/// Unwrap a required request field.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        let field = field.as_str();
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "value": value,
            "code": "invalid_uuid",
        }))
    })
}

fn user_value_code(error: &UserValidationError) -> &'static str {
    match error {
        UserValidationError::EmptyName | UserValidationError::EmptyEmail => "empty_field",
        UserValidationError::NameTooLong { .. } => "too_long",
        UserValidationError::InvalidEmail => "invalid_email",
        UserValidationError::NameInvalidCharacters
        | UserValidationError::EmptyId
        | UserValidationError::InvalidId
        | UserValidationError::UnknownRole(_) => "invalid_value",
    }
}

impl FieldViolation for CredentialsValidationError {
    fn field(&self) -> &'static str {
        CredentialsValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Email(inner) | Self::Name(inner) => user_value_code(inner),
            Self::EmptyPassword => "empty_field",
            Self::PasswordTooShort { .. } => "too_short",
        }
    }
}

impl FieldViolation for CatalogValidationError {
    fn field(&self) -> &'static str {
        CatalogValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyField { .. } => "empty_field",
            Self::MissingPrice => "missing_field",
            Self::InvalidPrice => "invalid_price",
            Self::NegativeDuration => "out_of_range",
        }
    }
}

impl FieldViolation for ProgressValidationError {
    fn field(&self) -> &'static str {
        ProgressValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        match self {
            Self::PercentOutOfRange | Self::NegativeSeconds => "out_of_range",
            Self::UnknownStatus(_) => "invalid_value",
        }
    }
}

impl FieldViolation for PaymentValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyTransactionId => "transactionId",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyTransactionId => "empty_field",
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{ErrorCode, LoginCredentials, ProgressObservation, Registration};

    fn details(error: &Error) -> (&str, &str) {
        let details = error.details().expect("details");
        (
            details["field"].as_str().expect("field"),
            details["code"].as_str().expect("code"),
        )
    }

    #[rstest]
    #[case("aluno@", "password", ("email", "invalid_email"))]
    #[case("aluno@teste.com", "", ("password", "empty_field"))]
    fn login_violations_name_their_field(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: (&str, &str),
    ) {
        let violation =
            LoginCredentials::try_from_parts(email, password).expect_err("invalid credentials");
        let error = invalid_field(&violation);
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(details(&error), expected);
    }

    #[rstest]
    fn short_passwords_are_reported() {
        let violation = Registration::try_from_parts("Aluno", "aluno@teste.com", "1234")
            .expect_err("too short");
        assert_eq!(details(&invalid_field(&violation)), ("password", "too_short"));
    }

    #[rstest]
    fn out_of_range_percent_is_reported() {
        let violation = ProgressObservation::try_new(10, 140, None).expect_err("percent");
        assert_eq!(
            details(&invalid_field(&violation)),
            ("progressPercent", "out_of_range")
        );
    }

    #[rstest]
    fn missing_fields_use_a_stable_code() {
        let error = missing_field_error(FieldName::new("courseId"));
        assert_eq!(details(&error), ("courseId", "missing_field"));
        assert_eq!(error.message(), "missing required field: courseId");
    }

    #[rstest]
    #[case("9b2f0a4e-3c0d-4f7e-9a43-2a0c1b6d7e55", true)]
    #[case(" 9b2f0a4e-3c0d-4f7e-9a43-2a0c1b6d7e55 ", true)]
    #[case("course-1", false)]
    fn uuid_parameters_are_validated(#[case] raw: &str, #[case] valid: bool) {
        let parsed = parse_uuid(raw, FieldName::new("id"));
        assert_eq!(parsed.is_ok(), valid);
        if let Err(error) = parsed {
            let value = error.details().and_then(|details| details.get("value"));
            assert_eq!(value, Some(&Value::from(raw)));
        }
    }

    #[rstest]
    fn mistyped_body_values_are_invalid_requests() {
        let source = serde_json::from_str::<u8>("\"forty\"").expect_err("not a number");
        let error = json_body_error(&JsonPayloadError::Deserialize(source));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(details(&error), ("body", "invalid_type"));
    }

    #[rstest]
    fn unparsable_bodies_are_invalid_requests() {
        let source = serde_json::from_str::<Value>("{\"lessonId\":").expect_err("truncated");
        let error = json_body_error(&JsonPayloadError::Deserialize(source));
        assert_eq!(details(&error), ("body", "malformed_body"));
    }
}
