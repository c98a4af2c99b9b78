//! Driving port for registration and login.
//!
//! Inbound adapters call this port to create accounts and check credentials
//! without importing persistence or hashing concerns.

use async_trait::async_trait;

use crate::domain::{Email, Error, LoginCredentials, Registration, Role, User, UserId, UserName};

/// Domain use-case port for account creation and authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityCommand: Send + Sync {
    /// Create a student account.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;

    /// Check credentials and return the matching user.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

pub(crate) const FIXTURE_STUDENT_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
pub(crate) const FIXTURE_STUDENT_EMAIL: &str = "aluno@teste.com";
pub(crate) const FIXTURE_STUDENT_PASSWORD: &str = "password";

pub(crate) fn fixture_student() -> Result<User, Error> {
    let id = UserId::new(FIXTURE_STUDENT_ID)
        .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
    let name = UserName::new("Aluno Teste")
        .map_err(|err| Error::internal(format!("invalid fixture user name: {err}")))?;
    let email = Email::new(FIXTURE_STUDENT_EMAIL)
        .map_err(|err| Error::internal(format!("invalid fixture email: {err}")))?;
    Ok(User::new(id, name, email, Role::Student))
}

/// In-memory identity used when no database is configured.
///
/// `aluno@teste.com` / `password` logs in as a fixed student; registration
/// echoes a fresh student without storing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityCommand;

#[async_trait]
impl IdentityCommand for FixtureIdentityCommand {
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        Ok(User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            Role::Student,
        ))
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        if credentials.email().as_ref() == FIXTURE_STUDENT_EMAIL
            && credentials.password() == FIXTURE_STUDENT_PASSWORD
        {
            fixture_student()
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("aluno@teste.com", "password", true)]
    #[case("ALUNO@teste.com", "password", true)]
    #[case("aluno@teste.com", "wrong", false)]
    #[case("other@teste.com", "password", false)]
    #[tokio::test]
    async fn fixture_login_accepts_only_the_seed_student(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        match (should_succeed, FixtureIdentityCommand.login(&creds).await) {
            (true, Ok(user)) => assert_eq!(user.id().as_ref(), FIXTURE_STUDENT_ID),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(user)) => panic!("expected failure, got success: {user:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_registration_creates_students() {
        let registration =
            Registration::try_from_parts("Nova Aluna", "nova@teste.com", "segredo123")
                .expect("valid registration");
        let user = FixtureIdentityCommand
            .register(&registration)
            .await
            .expect("registered");
        assert_eq!(user.role(), Role::Student);
        assert_eq!(user.email().as_ref(), "nova@teste.com");
    }
}
