//! services/api/src/web/auth.rs
//!
//! Endpoints that establish and probe the portal session.

use crate::web::rest::{
    bad_request, port_failure, to_course_responses, CourseResponse, MessageResponse,
};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkin_core::domain::Course;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct WechatLoginRequest {
    /// The redirect link copied from WeChat, containing `code=...`.
    pub link: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PasswordLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub courses: Vec<CourseResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginCheckResponse {
    pub success: bool,
    pub logged: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /dfysign/auth/login/wechat - Login with a WeChat redirect link
#[utoipa::path(
    post,
    path = "/dfysign/auth/login/wechat",
    request_body = WechatLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid link or rejected login", body = MessageResponse),
        (status = 500, description = "Portal unreachable or unreadable", body = MessageResponse)
    )
)]
pub async fn wechat_login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WechatLoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return bad_request();
    };

    let _session = state.lock_session().await;
    if let Err(e) = state.portal.login_with_link(&req.link).await {
        return port_failure(&e, StatusCode::BAD_REQUEST, "Login failed");
    }
    info!("Logged in with WeChat link");

    match state.portal.list_courses().await {
        Ok(courses) => logged_in(courses),
        Err(e) => port_failure(&e, StatusCode::BAD_REQUEST, "Failed to fetch course list"),
    }
}

/// POST /dfysign/auth/login/password - Login with portal username and password
#[utoipa::path(
    post,
    path = "/dfysign/auth/login/password",
    request_body = PasswordLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Credentials rejected by the portal", body = MessageResponse),
        (status = 500, description = "Portal unreachable or unreadable", body = MessageResponse)
    )
)]
pub async fn password_login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PasswordLoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return bad_request();
    };

    let _session = state.lock_session().await;
    if let Err(e) = state
        .portal
        .login_with_password(&req.username, &req.password)
        .await
    {
        return port_failure(&e, StatusCode::BAD_REQUEST, "Login failed");
    }
    info!("Logged in with password");

    match state.portal.list_courses().await {
        Ok(courses) => logged_in(courses),
        Err(e) => port_failure(&e, StatusCode::BAD_REQUEST, "Failed to fetch course list"),
    }
}

/// GET /dfysign/auth/check - Whether the portal session is still logged in
///
/// Never fails: a probe that cannot be read counts as logged out.
#[utoipa::path(
    get,
    path = "/dfysign/auth/check",
    responses(
        (status = 200, description = "Login state", body = LoginCheckResponse)
    )
)]
pub async fn check_login_handler(State(state): State<Arc<AppState>>) -> Response {
    let _session = state.lock_session().await;
    let logged = state.portal.is_logged_in().await.unwrap_or_else(|e| {
        debug!("Login probe failed, reporting logged out: {}", e);
        false
    });

    Json(LoginCheckResponse {
        success: true,
        logged,
    })
    .into_response()
}

fn logged_in(courses: Vec<Course>) -> Response {
    Json(LoginResponse {
        success: true,
        message: "登录成功".to_string(),
        courses: to_course_responses(courses),
    })
    .into_response()
}
