// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, quiz},
    services::session::session_middleware,
    state::AppState,
};

/// Assembles the main application router.
///
/// * Public routes: signup and login.
/// * Session-gated routes: test rendering, submission, tab-switch logging,
///   score view and logout.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let public_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    let gated_routes = Router::new()
        .route("/test/{class_level}", get(quiz::test_page))
        .route("/test/{class_level}/{stream}", get(quiz::test_page_with_stream))
        .route("/api/submit_test", post(quiz::submit_test))
        .route("/api/log_tab_switch", post(quiz::log_tab_switch))
        .route("/score", get(quiz::score))
        .route("/logout", get(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(gated_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
