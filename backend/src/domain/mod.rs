//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities shared by the HTTP and persistence
//! adapters, plus the services implementing the driving ports. Types here are
//! framework-agnostic; OpenAPI schemas live in the inbound adapter.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and its stable identifier.
//! - User, Role, Capability: identity and the closed role model.
//! - Course, Module, Lesson, Price: the catalog.
//! - LessonProgress and its merge rule; CourseCompletion roll-ups.
//! - PendingPayment, VerifiedTransaction, Enrollment: checkout and payment.
//! - Services implementing the driving ports in [`ports`].

pub mod access;
pub mod auth;
mod authoring_service;
pub mod catalog;
mod catalog_service;
pub mod completion;
pub mod course_detail;
pub mod error;
mod identity_service;
pub mod payment;
mod payment_service;
pub mod ports;
pub mod progress;
mod progress_service;
mod service_support;
#[cfg(test)]
mod service_test_support;
pub mod trace_id;
pub mod user;

pub use self::access::{CourseAccess, Viewer};
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN_LEN, PasswordHash,
    PasswordHashError, Registration,
};
pub use self::authoring_service::CatalogAuthoringService;
pub use self::catalog::{
    CatalogValidationError, Course, CourseDraft, CourseOutline, CourseSummary, Lesson,
    LessonDraft, Module, ModuleDraft, ModuleOutline, Price, next_position,
};
pub use self::catalog_service::CatalogService;
pub use self::completion::CourseCompletion;
pub use self::course_detail::{CourseDetail, LearnerCourse, LessonView, ModuleView};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity_service::{AdminBootstrap, IdentityService};
pub use self::payment::{
    Checkout, Enrollment, EnrollmentMethod, PaymentConfirmation, PaymentOutcome,
    PaymentValidationError, PendingPayment, SettlementMismatch, VerificationStatus,
    VerifiedTransaction,
};
pub use self::payment_service::{PaymentPorts, PaymentService};
pub use self::progress::{
    COMPLETION_THRESHOLD_PERCENT, LessonProgress, ProgressObservation, ProgressStatus,
    ProgressValidationError, RESUME_MIN_SECONDS, apply_report,
};
pub use self::progress_service::ProgressService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Capability, Email, Role, USER_NAME_MAX, User, UserId, UserName, UserValidationError,
};
