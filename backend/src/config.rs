//! Application settings loaded via OrthoConfig.
//!
//! Every field can come from a CLI flag, a config file, or an `LMS_*`
//! environment variable. Session cookie settings are read separately; see
//! [`crate::inbound::http::session_config`].

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{AdminBootstrap, CredentialsValidationError, Registration};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_VERIFIER_URL: &str = "https://api.flutterwave.com";
const DEFAULT_CURRENCY: &str = "MZN";
const DEFAULT_ADMIN_NAME: &str = "Administrador";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid payment verifier url '{value}': {message}")]
    VerifierUrl { value: String, message: String },
    #[error("payment timeout must be at least one second")]
    ZeroTimeout,
    #[error("admin bootstrap needs both LMS_ADMIN_EMAIL and LMS_ADMIN_PASSWORD")]
    IncompleteAdmin,
    #[error("invalid admin bootstrap account: {0}")]
    InvalidAdmin(CredentialsValidationError),
}

/// Settings for the HTTP server, persistence, payments, and admin bootstrap.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LMS")]
pub struct AppSettings {
    /// PostgreSQL connection string. Fixture ports are used when absent.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// Base URL of the payment provider API.
    pub payment_verifier_url: Option<String>,
    /// Provider secret key used as a bearer token.
    pub payment_secret_key: Option<String>,
    /// Verifier request timeout in seconds.
    #[ortho_config(default = 10)]
    pub payment_timeout_secs: u64,
    /// ISO currency code charged at checkout.
    pub payment_currency: Option<String>,
    /// Email of the admin account created at startup.
    pub admin_email: Option<String>,
    /// Password of the admin account created at startup.
    pub admin_password: Option<String>,
    /// Display name of the admin account created at startup.
    pub admin_name: Option<String>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppSettings")
            .field("database_url", &redact(&self.database_url))
            .field("bind_addr", &self.bind_addr)
            .field("payment_verifier_url", &self.payment_verifier_url)
            .field("payment_secret_key", &redact(&self.payment_secret_key))
            .field("payment_timeout_secs", &self.payment_timeout_secs)
            .field("payment_currency", &self.payment_currency)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &redact(&self.admin_password))
            .field("admin_name", &self.admin_name)
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl AppSettings {
    pub fn database_url(&self) -> Option<&str> {
        non_blank(&self.database_url)
    }

    /// Listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = match self.bind_addr.trim() {
            "" => DEFAULT_BIND_ADDR,
            value => value,
        };
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Provider base URL, defaulting to the public Flutterwave API.
    pub fn payment_verifier_url(&self) -> Result<Url, SettingsError> {
        let value = non_blank(&self.payment_verifier_url).unwrap_or(DEFAULT_VERIFIER_URL);
        let url = Url::parse(value).map_err(|err| SettingsError::VerifierUrl {
            value: value.to_owned(),
            message: err.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(SettingsError::VerifierUrl {
                value: value.to_owned(),
                message: "not a base url".to_owned(),
            });
        }
        Ok(url)
    }

    /// Provider secret. Payments cannot be confirmed without one.
    pub fn payment_secret_key(&self) -> Option<Zeroizing<String>> {
        non_blank(&self.payment_secret_key).map(|key| Zeroizing::new(key.to_owned()))
    }

    pub fn payment_timeout(&self) -> Result<Duration, SettingsError> {
        match self.payment_timeout_secs {
            0 => Err(SettingsError::ZeroTimeout),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Upper-cased currency code, defaulting to `MZN`.
    pub fn payment_currency(&self) -> String {
        non_blank(&self.payment_currency)
            .unwrap_or(DEFAULT_CURRENCY)
            .to_ascii_uppercase()
    }

    /// The admin account to ensure at startup, if one is configured.
    ///
    /// Email and password must be given together; the name defaults to
    /// `Administrador`. The account is validated like a registration.
    pub fn admin_bootstrap(&self) -> Result<Option<AdminBootstrap>, SettingsError> {
        let email = non_blank(&self.admin_email);
        let password = self.admin_password.as_deref().filter(|value| !value.is_empty());
        let (email, password) = match (email, password) {
            (None, None) => return Ok(None),
            (Some(email), Some(password)) => (email, password),
            _ => return Err(SettingsError::IncompleteAdmin),
        };
        let name = non_blank(&self.admin_name).unwrap_or(DEFAULT_ADMIN_NAME);
        let registration = Registration::try_from_parts(name, email, password)
            .map_err(SettingsError::InvalidAdmin)?;
        Ok(Some(AdminBootstrap {
            name: registration.name().clone(),
            email: registration.email().clone(),
            password: Zeroizing::new(registration.password().to_owned()),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 9] = [
        "LMS_DATABASE_URL",
        "LMS_BIND_ADDR",
        "LMS_PAYMENT_VERIFIER_URL",
        "LMS_PAYMENT_SECRET_KEY",
        "LMS_PAYMENT_TIMEOUT_SECS",
        "LMS_PAYMENT_CURRENCY",
        "LMS_ADMIN_EMAIL",
        "LMS_ADMIN_PASSWORD",
        "LMS_ADMIN_NAME",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("lms-backend")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let settings = load_with(&[]);
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.payment_timeout_secs, 10);
        assert!(settings.database_url().is_none());
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.payment_verifier_url().expect("url").as_str(),
            "https://api.flutterwave.com/"
        );
        assert!(settings.payment_secret_key().is_none());
        assert_eq!(settings.payment_timeout(), Ok(Duration::from_secs(10)));
        assert_eq!(settings.payment_currency(), "MZN");
        assert!(matches!(settings.admin_bootstrap(), Ok(None)));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("LMS_DATABASE_URL", "postgres://lms@db/lms"),
            ("LMS_BIND_ADDR", "127.0.0.1:9000"),
            ("LMS_PAYMENT_SECRET_KEY", "FLWSECK_TEST-abc"),
            ("LMS_PAYMENT_TIMEOUT_SECS", "3"),
            ("LMS_PAYMENT_CURRENCY", "usd"),
            ("LMS_ADMIN_EMAIL", "Admin@Teste.com"),
            ("LMS_ADMIN_PASSWORD", "segredo-forte"),
        ]);
        assert_eq!(settings.database_url(), Some("postgres://lms@db/lms"));
        assert_eq!(settings.bind_addr().expect("addr").port(), 9000);
        assert_eq!(
            settings.payment_secret_key().as_deref().map(String::as_str),
            Some("FLWSECK_TEST-abc")
        );
        assert_eq!(settings.payment_timeout(), Ok(Duration::from_secs(3)));
        assert_eq!(settings.payment_currency(), "USD");

        let admin = settings
            .admin_bootstrap()
            .expect("valid bootstrap")
            .expect("configured");
        assert_eq!(admin.email.as_ref(), "admin@teste.com");
        assert_eq!(admin.name.as_ref(), "Administrador");
    }

    #[rstest]
    #[case(&[("LMS_ADMIN_EMAIL", "admin@teste.com")], SettingsError::IncompleteAdmin)]
    #[case(&[("LMS_ADMIN_PASSWORD", "segredo-forte")], SettingsError::IncompleteAdmin)]
    #[case(
        &[("LMS_ADMIN_EMAIL", "admin@teste.com"), ("LMS_ADMIN_PASSWORD", "curta")],
        SettingsError::InvalidAdmin(CredentialsValidationError::PasswordTooShort { min: 8 })
    )]
    fn partial_or_weak_admin_settings_are_rejected(
        #[case] overrides: &[(&str, &str)],
        #[case] expected: SettingsError,
    ) {
        let settings = load_with(overrides);
        assert_eq!(settings.admin_bootstrap().map(|admin| admin.is_some()), Err(expected));
    }

    #[rstest]
    #[case("LMS_BIND_ADDR", "localhost")]
    #[case("LMS_PAYMENT_VERIFIER_URL", "mailto:payments@teste.com")]
    #[case("LMS_PAYMENT_TIMEOUT_SECS", "0")]
    fn malformed_values_are_reported(#[case] name: &str, #[case] value: &str) {
        let settings = load_with(&[(name, value)]);
        let failed = settings.bind_addr().is_err()
            || settings.payment_verifier_url().is_err()
            || settings.payment_timeout().is_err();
        assert!(failed);
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let settings = load_with(&[
            ("LMS_DATABASE_URL", "postgres://lms:hunter2@db/lms"),
            ("LMS_PAYMENT_SECRET_KEY", "FLWSECK_TEST-abc"),
        ]);
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("FLWSECK"));
    }
}
