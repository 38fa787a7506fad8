//! services/api/src/web/course.rs
//!
//! Course list endpoint.

use crate::web::rest::{port_failure, to_course_responses, CourseResponse, MessageResponse};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct CourseListResponse {
    pub success: bool,
    pub courses: Vec<CourseResponse>,
}

/// GET /dfysign/course/list - Courses the logged-in student is enrolled in
#[utoipa::path(
    get,
    path = "/dfysign/course/list",
    responses(
        (status = 200, description = "Enrolled courses", body = CourseListResponse),
        (status = 500, description = "Portal unreachable, or the session is gone", body = MessageResponse)
    )
)]
pub async fn list_courses_handler(State(state): State<Arc<AppState>>) -> Response {
    let _session = state.lock_session().await;
    match state.portal.list_courses().await {
        Ok(courses) => Json(CourseListResponse {
            success: true,
            courses: to_course_responses(courses),
        })
        .into_response(),
        Err(e) => port_failure(
            &e,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch course list",
        ),
    }
}
