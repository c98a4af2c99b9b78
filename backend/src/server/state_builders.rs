//! Builders for the HTTP state from repository adapters or fixtures.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use lms_backend::domain::ports::{
    CatalogAuthoringRepository, CourseRepository, EnrollmentRepository, FixturePaymentVerifier,
    PaymentVerifier, PaymentVerifierError, PendingPaymentRepository, ProgressRepository,
    UserRepository,
};
use lms_backend::domain::{
    CatalogAuthoringService, CatalogService, IdentityService, PaymentPorts, PaymentService,
    ProgressService, VerifiedTransaction,
};
use lms_backend::inbound::http::state::HttpState;
use lms_backend::outbound::payments::HttpPaymentVerifier;
use lms_backend::outbound::persistence::{
    DbPool, DieselCatalogAuthoringRepository, DieselCourseRepository, DieselEnrollmentRepository,
    DieselPendingPaymentRepository, DieselProgressRepository, DieselUserRepository,
};

use super::{PaymentSettings, ServerConfig};

/// Driven ports the domain services are built from.
pub struct Repositories<U, C, A, E, P, R> {
    pub users: Arc<U>,
    pub courses: Arc<C>,
    pub authoring: Arc<A>,
    pub enrollments: Arc<E>,
    pub progress: Arc<P>,
    pub pending: Arc<R>,
}

/// Wire the domain services over `repos` into the HTTP state.
pub fn assemble_http_state<U, C, A, E, P, R, V>(
    repos: Repositories<U, C, A, E, P, R>,
    verifier: Arc<V>,
    currency: &str,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    U: UserRepository + 'static,
    C: CourseRepository + 'static,
    A: CatalogAuthoringRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: ProgressRepository + 'static,
    R: PendingPaymentRepository + 'static,
    V: PaymentVerifier + 'static,
{
    let Repositories {
        users,
        courses,
        authoring,
        enrollments,
        progress,
        pending,
    } = repos;

    let identity = Arc::new(IdentityService::new(users.clone()));
    let catalog = CatalogService::new(
        courses.clone(),
        enrollments.clone(),
        progress.clone(),
        users.clone(),
    );
    let progress = ProgressService::new(
        courses.clone(),
        enrollments.clone(),
        progress,
        users.clone(),
        clock.clone(),
    );
    let authoring = CatalogAuthoringService::new(authoring, users.clone(), clock.clone());
    let payments = PaymentService::new(
        PaymentPorts {
            courses,
            enrollments,
            pending,
            verifier,
            users,
        },
        currency,
        clock,
    );

    HttpState {
        identity: identity.clone(),
        profile: identity,
        catalog: Arc::new(catalog),
        authoring: Arc::new(authoring),
        progress: Arc::new(progress),
        payments: Arc::new(payments),
    }
}

/// The provider verifier when a secret is configured, otherwise one that
/// refuses every confirmation.
enum ConfiguredVerifier {
    Provider(HttpPaymentVerifier),
    Unconfigured(FixturePaymentVerifier),
}

#[async_trait]
impl PaymentVerifier for ConfiguredVerifier {
    async fn verify(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedTransaction, PaymentVerifierError> {
        match self {
            Self::Provider(verifier) => verifier.verify(transaction_id).await,
            Self::Unconfigured(verifier) => verifier.verify(transaction_id).await,
        }
    }
}

fn build_verifier(settings: &PaymentSettings) -> std::io::Result<ConfiguredVerifier> {
    let Some(secret) = settings.secret_key.as_ref() else {
        warn!("payment secret key not configured; payments cannot be confirmed");
        return Ok(ConfiguredVerifier::Unconfigured(FixturePaymentVerifier));
    };
    HttpPaymentVerifier::new(
        settings.verifier_url.clone(),
        secret.as_str(),
        settings.timeout,
    )
    .map(ConfiguredVerifier::Provider)
    .map_err(|err| std::io::Error::other(format!("payment client setup failed: {err}")))
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselUserRepository,
    DieselCourseRepository,
    DieselCatalogAuthoringRepository,
    DieselEnrollmentRepository,
    DieselProgressRepository,
    DieselPendingPaymentRepository,
> {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        courses: Arc::new(DieselCourseRepository::new(pool.clone())),
        authoring: Arc::new(DieselCatalogAuthoringRepository::new(pool.clone())),
        enrollments: Arc::new(DieselEnrollmentRepository::new(pool.clone())),
        progress: Arc::new(DieselProgressRepository::new(pool.clone())),
        pending: Arc::new(DieselPendingPaymentRepository::new(pool.clone())),
    }
}

/// Build the shared HTTP state: Diesel-backed services when a pool is
/// configured, fixture ports otherwise.
///
/// # Errors
///
/// Fails when the payment HTTP client cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let state = match &config.db_pool {
        Some(pool) => assemble_http_state(
            diesel_repositories(pool),
            Arc::new(build_verifier(&config.payments)?),
            &config.payments.currency,
            Arc::new(DefaultClock),
        ),
        None => HttpState::fixtures(),
    };
    Ok(web::Data::new(state))
}
