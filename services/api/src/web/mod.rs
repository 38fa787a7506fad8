pub mod auth;
pub mod course;
pub mod rest;
pub mod sign;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Builds the `/dfysign` API router the front-end talks to.
pub fn api_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login/wechat", post(auth::wechat_login_handler))
        .route("/login/password", post(auth::password_login_handler))
        .route("/check", get(auth::check_login_handler));

    let course_routes = Router::new().route("/list", get(course::list_courses_handler));

    let sign_routes = Router::new()
        .route("/submit", post(sign::submit_handler))
        .route("/location", post(sign::location_handler))
        .route("/status", get(sign::status_handler));

    Router::new()
        .nest("/dfysign/auth", auth_routes)
        .nest("/dfysign/course", course_routes)
        .nest("/dfysign/sign", sign_routes)
        .with_state(state)
}
