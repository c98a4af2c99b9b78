//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PaymentVerifier`]) are implemented by the
//! outbound adapters; driving ports (`*Command`, `*Query`) are implemented by
//! the domain services and called by the HTTP adapter. Each ships a
//! `Fixture*` implementation and, under test, a mockall `Mock*`.

mod macros;
pub(crate) use macros::define_port_error;

mod catalog_authoring_command;
mod catalog_authoring_repository;
mod catalog_query;
mod course_repository;
mod enrollment_repository;
mod identity_command;
mod payment_command;
mod payment_verifier;
mod pending_payment_repository;
mod progress_command;
mod progress_repository;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use catalog_authoring_command::MockCatalogAuthoringCommand;
pub use catalog_authoring_command::{CatalogAuthoringCommand, FixtureCatalogAuthoringCommand};
#[cfg(test)]
pub use catalog_authoring_repository::MockCatalogAuthoringRepository;
pub use catalog_authoring_repository::{
    CatalogAuthoringRepository, CatalogAuthoringRepositoryError,
    FixtureCatalogAuthoringRepository,
};
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::{CatalogQuery, FixtureCatalogQuery};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseRepository, CourseRepositoryError, FixtureCourseRepository};
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{
    EnrollmentGrant, EnrollmentRepository, EnrollmentRepositoryError,
    FixtureEnrollmentRepository,
};
#[cfg(test)]
pub use identity_command::MockIdentityCommand;
pub(crate) use identity_command::fixture_student;
pub use identity_command::{FixtureIdentityCommand, IdentityCommand};
#[cfg(test)]
pub use payment_command::MockPaymentCommand;
pub use payment_command::{FixturePaymentCommand, PaymentCommand};
#[cfg(test)]
pub use payment_verifier::MockPaymentVerifier;
pub use payment_verifier::{FixturePaymentVerifier, PaymentVerifier, PaymentVerifierError};
#[cfg(test)]
pub use pending_payment_repository::MockPendingPaymentRepository;
pub use pending_payment_repository::{
    FixturePendingPaymentRepository, PendingPaymentRepository, PendingPaymentRepositoryError,
};
#[cfg(test)]
pub use progress_command::MockProgressCommand;
pub use progress_command::{FixtureProgressCommand, ProgressCommand};
#[cfg(test)]
pub use progress_repository::MockProgressRepository;
pub use progress_repository::{
    FixtureProgressRepository, ProgressRepository, ProgressRepositoryError,
};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::{FixtureUserProfileQuery, UserProfileQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FixtureUserRepository, UserAccount, UserPersistenceError, UserRepository,
};
