//! Tests for the identity service.

use std::sync::Arc;

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockUserRepository, UserPersistenceError};
use crate::domain::service_test_support::user_with_role;

fn make_service(repo: MockUserRepository) -> IdentityService<MockUserRepository> {
    IdentityService::new(Arc::new(repo))
}

fn account_for(user: User, password: &str) -> UserAccount {
    UserAccount {
        user,
        password_hash: PasswordHash::generate(password).expect("hash"),
    }
}

#[rstest]
#[tokio::test]
async fn register_stores_a_hashed_student() {
    let mut repo = MockUserRepository::new();
    repo.expect_create()
        .withf(|account| {
            account.user.role() == Role::Student
                && account.user.email().as_ref() == "nova@teste.com"
                && account.password_hash.as_str() != "segredo123"
                && account.password_hash.verify("segredo123").unwrap_or(false)
        })
        .times(1)
        .return_once(|_| Ok(()));

    let registration = Registration::try_from_parts("Nova Aluna", "Nova@Teste.com", "segredo123")
        .expect("valid registration");
    let user = make_service(repo)
        .register(&registration)
        .await
        .expect("registered");

    assert_eq!(user.role(), Role::Student);
    assert_eq!(user.name().as_ref(), "Nova Aluna");
}

#[rstest]
#[tokio::test]
async fn register_maps_duplicate_email_to_conflict() {
    let mut repo = MockUserRepository::new();
    repo.expect_create()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate_email("nova@teste.com")));

    let registration = Registration::try_from_parts("Nova Aluna", "nova@teste.com", "segredo123")
        .expect("valid registration");
    let error = make_service(repo)
        .register(&registration)
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|details| details.get("field")),
        Some(&json!("email"))
    );
}

#[rstest]
#[tokio::test]
async fn login_returns_user_for_matching_password() {
    let user = user_with_role(Role::Student);
    let expected = user.clone();
    let account = account_for(user, "123456789");
    let mut repo = MockUserRepository::new();
    repo.expect_find_account_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(account)));

    let creds = LoginCredentials::try_from_parts("aluno@teste.com", "123456789").expect("creds");
    let user = make_service(repo).login(&creds).await.expect("login");
    assert_eq!(user, expected);
}

#[rstest]
#[case::unknown_email(None)]
#[case::wrong_password(Some("outra-senha"))]
#[tokio::test]
async fn login_failures_are_indistinguishable(#[case] stored_password: Option<&'static str>) {
    let account = stored_password.map(|password| account_for(user_with_role(Role::Student), password));
    let mut repo = MockUserRepository::new();
    repo.expect_find_account_by_email()
        .times(1)
        .return_once(move |_| Ok(account));

    let creds = LoginCredentials::try_from_parts("aluno@teste.com", "123456789").expect("creds");
    let error = make_service(repo).login(&creds).await.expect_err("rejected");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_failures_map_to_error_codes(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Err(failure));

    let error = make_service(repo)
        .fetch_profile(&UserId::random())
        .await
        .expect_err("failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn fetch_profile_reports_missing_users() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let error = make_service(repo)
        .fetch_profile(&UserId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

fn bootstrap() -> AdminBootstrap {
    AdminBootstrap {
        name: UserName::new("Admin Teste").expect("name"),
        email: Email::new("admin@teste.com").expect("email"),
        password: Zeroizing::new("admin-secret".to_owned()),
    }
}

#[rstest]
#[tokio::test]
async fn ensure_admin_creates_missing_admin() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_account_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_create()
        .withf(|account| account.user.role() == Role::Admin)
        .times(1)
        .return_once(|_| Ok(()));

    let created = make_service(repo)
        .ensure_admin(&bootstrap())
        .await
        .expect("bootstrap");
    assert!(created);
}

#[rstest]
#[tokio::test]
async fn ensure_admin_leaves_existing_accounts_alone() {
    let existing = account_for(user_with_role(Role::Admin), "whatever1");
    let mut repo = MockUserRepository::new();
    repo.expect_find_account_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_create().times(0);

    let created = make_service(repo)
        .ensure_admin(&bootstrap())
        .await
        .expect("bootstrap");
    assert!(!created);
}

#[rstest]
#[tokio::test]
async fn ensure_admin_tolerates_losing_the_insert_race() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_account_by_email()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_create()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate_email("admin@teste.com")));

    let created = make_service(repo)
        .ensure_admin(&bootstrap())
        .await
        .expect("bootstrap");
    assert!(!created);
}
