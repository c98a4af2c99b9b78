//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! can be exercised with fixtures or mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CatalogAuthoringCommand, CatalogQuery, FixtureCatalogAuthoringCommand, FixtureCatalogQuery,
    FixtureIdentityCommand, FixturePaymentCommand, FixtureProgressCommand,
    FixtureUserProfileQuery, IdentityCommand, PaymentCommand, ProgressCommand, UserProfileQuery,
};

/// Driving ports used by the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub authoring: Arc<dyn CatalogAuthoringCommand>,
    pub progress: Arc<dyn ProgressCommand>,
    pub payments: Arc<dyn PaymentCommand>,
}

impl HttpState {
    /// State backed entirely by fixture ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use lms_backend::domain::ports::FixtureCatalogQuery;
    /// use lms_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState {
    ///     catalog: Arc::new(FixtureCatalogQuery),
    ///     ..HttpState::fixtures()
    /// };
    /// let _catalog = state.catalog.clone();
    /// ```
    pub fn fixtures() -> Self {
        Self {
            identity: Arc::new(FixtureIdentityCommand),
            profile: Arc::new(FixtureUserProfileQuery),
            catalog: Arc::new(FixtureCatalogQuery),
            authoring: Arc::new(FixtureCatalogAuthoringCommand),
            progress: Arc::new(FixtureProgressCommand),
            payments: Arc::new(FixturePaymentCommand),
        }
    }
}
