//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{PaymentSettings, ServerConfig};

use state_builders::build_http_state;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use lms_backend::Trace;
#[cfg(debug_assertions)]
use lms_backend::doc::ApiDoc;
use lms_backend::domain::{AdminBootstrap, IdentityService};
use lms_backend::inbound::http::admin::{
    create_course, create_lesson, create_module, delete_lesson, delete_module, update_course,
};
use lms_backend::inbound::http::auth::{login, logout, register};
use lms_backend::inbound::http::courses::{checkout, course_detail, list_courses, my_courses};
use lms_backend::inbound::http::health::{HealthState, live, ready};
use lms_backend::inbound::http::payments::confirm_payment;
use lms_backend::inbound::http::progress::report_progress;
use lms_backend::inbound::http::state::HttpState;
use lms_backend::inbound::http::users::current_user;
use lms_backend::inbound::http::validation::json_config;
use lms_backend::outbound::persistence::{DbPool, DieselUserRepository};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(list_courses)
        .service(my_courses)
        .service(course_detail)
        .service(checkout)
        .service(report_progress)
        .service(confirm_payment)
        .service(create_course)
        .service(update_course)
        .service(create_module)
        .service(delete_module)
        .service(create_lesson)
        .service(delete_lesson);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Create the configured admin account unless one with that email exists.
///
/// # Errors
/// Returns [`std::io::Error`] when the lookup, hashing, or insert fails.
pub async fn ensure_admin_account(
    pool: &DbPool,
    bootstrap: &AdminBootstrap,
) -> std::io::Result<()> {
    let identity = IdentityService::new(Arc::new(DieselUserRepository::new(pool.clone())));
    let created = identity
        .ensure_admin(bootstrap)
        .await
        .map_err(|err| std::io::Error::other(format!("admin bootstrap failed: {err}")))?;
    if created {
        info!(email = %bootstrap.email.as_ref(), "created admin account");
    } else {
        info!(email = %bootstrap.email.as_ref(), "admin account already present");
    }
    Ok(())
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is bound.
/// - `config`: pre-built [`ServerConfig`] with session, binding, payment,
///   and optional database settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the payment client cannot be built or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        payments: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
