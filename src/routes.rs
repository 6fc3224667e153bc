// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quiz, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (stores, mailer, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/request-code", post(auth::request_code))
        .route("/verify-code", post(auth::verify_code))
        .route("/register", post(auth::register))
        .route("/session/{email}", get(auth::session_step))
        // Protected: logout needs the Bearer token it is ending
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let quiz_routes = Router::new()
        .route("/", get(quiz::get_quiz))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/submit", post(quiz::submit))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let admin_routes = Router::new()
        .route("/statistics", get(admin::statistics))
        .route("/users", get(admin::list_users))
        .route("/results", get(admin::list_results))
        .route("/config", get(admin::get_config).put(admin::update_config))
        .route(
            "/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route("/questions/{id}", put(admin::update_question))
        // Destructive mutations only travel through the confirmation gate
        .route(
            "/deletions",
            post(admin::begin_deletion).delete(admin::cancel_deletion),
        )
        .route("/deletions/ack", post(admin::acknowledge_deletion))
        .route("/deletions/confirm", post(admin::confirm_deletion))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
