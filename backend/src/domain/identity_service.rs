//! Identity service: registration, login, profile reads, and the startup
//! admin bootstrap.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityCommand, UserAccount, UserProfileQuery, UserRepository};
use crate::domain::service_support::map_user_error;
use crate::domain::{
    Email, Error, ErrorCode, LoginCredentials, PasswordHash, PasswordHashError, Registration, Role, User,
    UserId, UserName,
};

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Admin account created at startup when none exists for the email.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub name: UserName,
    pub email: Email,
    pub password: Zeroizing<String>,
}

/// Identity service implementing the account driving ports.
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
}

impl<U> IdentityService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

impl<U> IdentityService<U>
where
    U: UserRepository,
{
    async fn create_account(
        &self,
        name: UserName,
        email: Email,
        password: &str,
        role: Role,
    ) -> Result<User, Error> {
        let password_hash = PasswordHash::generate(password).map_err(map_hash_error)?;
        let account = UserAccount {
            user: User::new(UserId::random(), name, email, role),
            password_hash,
        };
        self.users
            .create(&account)
            .await
            .map_err(map_user_error)?;
        Ok(account.user)
    }

    /// Create the bootstrap admin unless the email is already registered.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, bootstrap: &AdminBootstrap) -> Result<bool, Error> {
        if let Some(existing) = self
            .users
            .find_account_by_email(&bootstrap.email)
            .await
            .map_err(map_user_error)?
        {
            if existing.user.role() != Role::Admin {
                warn!(
                    email = %bootstrap.email,
                    "bootstrap admin email belongs to a non-admin account"
                );
            }
            return Ok(false);
        }

        match self
            .create_account(
                bootstrap.name.clone(),
                bootstrap.email.clone(),
                bootstrap.password.as_str(),
                Role::Admin,
            )
            .await
        {
            Ok(user) => {
                info!(user_id = %user.id(), "bootstrap admin created");
                Ok(true)
            }
            // Another replica won the race.
            Err(error) if error.code() == ErrorCode::Conflict => Ok(false),
            Err(error) => Err(error),
        }
    }
}

#[async_trait]
impl<U> IdentityCommand for IdentityService<U>
where
    U: UserRepository,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        self.create_account(
            registration.name().clone(),
            registration.email().clone(),
            registration.password(),
            Role::Student,
        )
        .await
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let account = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid_credentials)?;
        let matches = account
            .password_hash
            .verify(credentials.password())
            .map_err(map_hash_error)?;
        if matches {
            Ok(account.user)
        } else {
            Err(invalid_credentials())
        }
    }
}

#[async_trait]
impl<U> UserProfileQuery for IdentityService<U>
where
    U: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
