//! services/api/src/web/rest.rs
//!
//! Contains the shared response payloads, the mapping from port errors to HTTP
//! responses, and the master definition for the OpenAPI specification.

use crate::web::{auth, course, sign};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use checkin_core::domain::{CheckInResult, Course};
use checkin_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::wechat_login_handler,
        auth::password_login_handler,
        auth::check_login_handler,
        course::list_courses_handler,
        sign::submit_handler,
        sign::location_handler,
        sign::status_handler,
    ),
    components(
        schemas(
            MessageResponse,
            CourseResponse,
            auth::WechatLoginRequest,
            auth::PasswordLoginRequest,
            auth::LoginResponse,
            auth::LoginCheckResponse,
            course::CourseListResponse,
            sign::SignRequest,
            sign::LocationSignRequest,
            sign::StatusResponse,
            sign::CheckInStatusData,
        )
    ),
    tags(
        (name = "Check-in Assistant API", description = "Login, course list, and check-in endpoints backed by the attendance portal.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Response Structs
//=========================================================================================

/// A success flag with a human-readable message.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl From<CheckInResult> for MessageResponse {
    fn from(result: CheckInResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
        }
    }
}

/// A course, keyed by the portal's own field names so the front-end reads it unchanged.
#[derive(Serialize, ToSchema)]
pub struct CourseResponse {
    #[serde(rename = "TermID")]
    pub term_id: String,
    #[serde(rename = "TermName")]
    pub term_name: String,
    #[serde(rename = "TermStatus")]
    pub term_status: String,
    #[serde(rename = "CourseID")]
    pub course_id: String,
    #[serde(rename = "CourseName")]
    pub course_name: String,
    #[serde(rename = "BackgroundColor")]
    pub background_color: String,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "IsCanel")]
    pub is_cancelled: String,
    #[serde(rename = "CreaterID")]
    pub creator_id: String,
    #[serde(rename = "CreaterDate")]
    pub created_date: String,
    #[serde(rename = "UpdaterDate")]
    pub updated_date: String,
    #[serde(rename = "TClassID")]
    pub class_id: String,
    #[serde(rename = "ClassName")]
    pub class_name: String,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            term_id: course.term_id,
            term_name: course.term_name,
            term_status: course.term_status,
            course_id: course.course_id,
            course_name: course.course_name,
            background_color: course.background_color,
            color: course.color,
            is_cancelled: course.is_cancelled,
            creator_id: course.creator_id,
            created_date: course.created_date,
            updated_date: course.updated_date,
            class_id: course.class_id,
            class_name: course.class_name,
        }
    }
}

pub fn to_course_responses(courses: Vec<Course>) -> Vec<CourseResponse> {
    courses.into_iter().map(CourseResponse::from).collect()
}

//=========================================================================================
// Error Rendering
//=========================================================================================

/// A `{success: false, message}` body with the given status.
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = MessageResponse {
        success: false,
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

/// Renders the rejection of a request body that did not deserialize.
pub fn bad_request() -> Response {
    failure(StatusCode::BAD_REQUEST, "Invalid request parameters")
}

/// Renders a port error. Faults become 500; expected negative outcomes use
/// `negative_status` so the front-end can tell them apart.
pub fn port_failure(err: &PortError, negative_status: StatusCode, context: &str) -> Response {
    if err.is_fault() {
        error!("{}: {:?}", context, err);
        failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{}: {}", context, err),
        )
    } else {
        failure(negative_status, err.to_string())
    }
}
