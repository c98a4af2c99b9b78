//! Registration, login, and logout handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Aluno","email":"aluno@teste.com","password":"password"}
//! POST /api/v1/auth/login {"email":"aluno@teste.com","password":"password"}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{LoginCredentials, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::{FieldName, invalid_field, required};

/// Body for `POST /api/v1/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn parse_registration(payload: RegisterRequest) -> ApiResult<Registration> {
    let name = required(payload.name, FieldName::new("name"))?;
    let email = required(payload.email, FieldName::new("email"))?;
    let password = Zeroizing::new(required(payload.password, FieldName::new("password"))?);
    Registration::try_from_parts(&name, &email, &password).map_err(|err| invalid_field(&err))
}

fn parse_credentials(payload: LoginRequest) -> ApiResult<LoginCredentials> {
    let email = required(payload.email, FieldName::new("email"))?;
    let password = Zeroizing::new(required(payload.password, FieldName::new("password"))?);
    LoginCredentials::try_from_parts(&email, &password).map_err(|err| invalid_field(&err))
}

/// Create a student account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = parse_registration(payload.into_inner())?;
    let user = state.identity.register(&registration).await?;
    info!(user_id = %user.id(), "account registered");
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Check credentials and start a cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Login success",
            headers(("Set-Cookie" = String, description = "Session cookie")),
            body = UserResponse
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials = parse_credentials(payload.into_inner())?;
    let user = state.identity.login(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(user.into()))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{MockIdentityCommand, fixture_student};
    use crate::domain::{Error, Role, User, UserId};
    use crate::inbound::http::test_utils::test_session_middleware;

    async fn post_json(
        identity: MockIdentityCommand,
        uri: &str,
        body: Value,
    ) -> (StatusCode, bool, Value) {
        let state = HttpState {
            identity: Arc::new(identity),
            ..HttpState::fixtures()
        };
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(test_session_middleware())
                .service(
                    web::scope("/api/v1")
                        .service(register)
                        .service(login)
                        .service(logout),
                ),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(uri)
                .set_json(body)
                .to_request(),
        )
        .await;
        let status = res.status();
        let has_cookie = res
            .response()
            .cookies()
            .any(|cookie| cookie.name() == "session");
        let bytes = actix_test::read_body(res).await;
        (
            status,
            has_cookie,
            serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        )
    }

    #[rstest]
    #[case(json!({"email": "aluno@teste.com", "password": "password"}), "name", "missing_field")]
    #[case(json!({"name": "Aluno", "email": "aluno", "password": "password"}), "email", "invalid_email")]
    #[case(json!({"name": "Aluno", "email": "aluno@teste.com", "password": "short"}), "password", "too_short")]
    #[actix_web::test]
    async fn register_rejects_invalid_input(
        #[case] body: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mut identity = MockIdentityCommand::new();
        identity.expect_register().times(0);

        let (status, _, payload) = post_json(identity, "/api/v1/auth/register", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["details"]["field"], field);
        assert_eq!(payload["details"]["code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn register_returns_created_student() {
        let mut identity = MockIdentityCommand::new();
        identity
            .expect_register()
            .withf(|registration| registration.email().as_ref() == "nova@teste.com")
            .return_once(|registration| {
                Ok(User::new(
                    UserId::random(),
                    registration.name().clone(),
                    registration.email().clone(),
                    Role::Student,
                ))
            });

        let (status, has_cookie, payload) = post_json(
            identity,
            "/api/v1/auth/register",
            json!({"name": "Nova", "email": "Nova@Teste.com", "password": "segredo123"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(!has_cookie, "registration does not sign in");
        assert_eq!(payload["role"], "student");
        assert!(payload.get("password").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_emails_conflict() {
        let mut identity = MockIdentityCommand::new();
        identity
            .expect_register()
            .return_once(|_| Err(Error::conflict("email already registered")));

        let (status, _, payload) = post_json(
            identity,
            "/api/v1/auth/register",
            json!({"name": "Aluno", "email": "aluno@teste.com", "password": "password"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(payload["code"], "conflict");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_sets_a_session_cookie() {
        let mut identity = MockIdentityCommand::new();
        identity
            .expect_login()
            .withf(|credentials| credentials.password() == "password")
            .return_once(|_| fixture_student());

        let (status, has_cookie, payload) = post_json(
            identity,
            "/api/v1/auth/login",
            json!({"email": "aluno@teste.com", "password": "password"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(has_cookie);
        assert_eq!(payload["email"], "aluno@teste.com");
    }

    #[rstest]
    #[actix_web::test]
    async fn wrong_credentials_are_unauthorised_without_a_cookie() {
        let mut identity = MockIdentityCommand::new();
        identity
            .expect_login()
            .return_once(|_| Err(Error::unauthorized("invalid credentials")));

        let (status, has_cookie, payload) = post_json(
            identity,
            "/api/v1/auth/login",
            json!({"email": "aluno@teste.com", "password": "wrong-password"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!has_cookie);
        assert_eq!(payload["message"], "invalid credentials");
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_answers_no_content() {
        let mut identity = MockIdentityCommand::new();
        identity.expect_login().times(0);

        let (status, _, payload) =
            post_json(identity, "/api/v1/auth/logout", Value::Null).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(payload, Value::Null);
    }
}
