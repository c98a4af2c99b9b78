//! Driving port for reading the signed-in user.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

use super::identity_command::fixture_student;

/// Domain use-case port for reading the current user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;
}

/// Fixture profile query that answers with the seed student's details under
/// the requested id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserProfileQuery;

#[async_trait]
impl UserProfileQuery for FixtureUserProfileQuery {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        let student = fixture_student()?;
        Ok(User::new(
            user_id.clone(),
            student.name().clone(),
            student.email().clone(),
            student.role(),
        ))
    }
}
