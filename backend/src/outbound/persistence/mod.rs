//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Merge and settlement rules live in the domain; adapters only make
//!   them atomic.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database failures map onto each port's error
//!   type; driver text is logged at `debug`, not returned.
//!
//! # Example
//!
//! ```ignore
//! use lms_backend::outbound::persistence::{DbPool, DieselCourseRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/lms")).await?;
//! let courses = DieselCourseRepository::new(pool);
//! ```

mod diesel_catalog_authoring_repository;
mod diesel_course_repository;
mod diesel_enrollment_repository;
pub(crate) mod diesel_error_mapping;
mod diesel_pending_payment_repository;
mod diesel_progress_repository;
mod diesel_user_repository;
mod models;
pub(crate) mod pool;
mod schema;

pub use diesel_catalog_authoring_repository::DieselCatalogAuthoringRepository;
pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_pending_payment_repository::DieselPendingPaymentRepository;
pub use diesel_progress_repository::DieselProgressRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, run_migrations};
