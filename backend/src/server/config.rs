//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use lms_backend::outbound::persistence::DbPool;
use url::Url;
use zeroize::Zeroizing;

/// Payment provider settings used when a database is attached.
#[derive(Clone)]
pub struct PaymentSettings {
    pub(crate) verifier_url: Url,
    pub(crate) secret_key: Option<Zeroizing<String>>,
    pub(crate) timeout: Duration,
    pub(crate) currency: String,
}

impl PaymentSettings {
    #[must_use]
    pub fn new(
        verifier_url: Url,
        secret_key: Option<Zeroizing<String>>,
        timeout: Duration,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            verifier_url,
            secret_key,
            timeout,
            currency: currency.into(),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) payments: PaymentSettings,
}

impl ServerConfig {
    /// Construct a server configuration without a database.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        payments: PaymentSettings,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            payments,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one, every driving port is served by its fixture.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
