//! services/api/src/web/sign.rs
//!
//! Check-in endpoints: code or QR submission, location submission, and the
//! per-class status probe the front-end polls.

use crate::web::rest::{bad_request, failure, port_failure, MessageResponse};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use checkin_core::domain::CheckInStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignRequest {
    /// A four-byte numeric code, or the check-in id to confirm as a QR token.
    pub sign_code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LocationSignRequest {
    pub longitude: String,
    pub latitude: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// The class to probe.
    pub class_id: Option<String>,
}

/// The active check-in, keyed by the portal's hidden-field ids.
#[derive(Serialize, ToSchema)]
pub struct CheckInStatusData {
    #[serde(rename = "HFSeconds")]
    pub seconds: String,
    #[serde(rename = "HFChecktype")]
    pub check_type: String,
    #[serde(rename = "HFCheckInID")]
    pub check_in_id: String,
    #[serde(rename = "HFClassID")]
    pub class_id: String,
    #[serde(rename = "HFCheckCodeKey")]
    pub code_key: String,
    #[serde(rename = "HFRoomLongitude")]
    pub room_longitude: String,
    #[serde(rename = "HFRoomLatitude")]
    pub room_latitude: String,
}

impl From<CheckInStatus> for CheckInStatusData {
    fn from(status: CheckInStatus) -> Self {
        Self {
            seconds: status.seconds,
            check_type: status.check_type,
            check_in_id: status.check_in_id,
            class_id: status.class_id,
            code_key: status.code_key,
            room_longitude: status.room_longitude,
            room_latitude: status.room_latitude,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub data: CheckInStatusData,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /dfysign/sign/submit - Submit a numeric code or confirm a QR token
#[utoipa::path(
    post,
    path = "/dfysign/sign/submit",
    request_body = SignRequest,
    responses(
        (status = 200, description = "Portal verdict on the check-in", body = MessageResponse),
        (status = 400, description = "Invalid request", body = MessageResponse),
        (status = 500, description = "Portal unreachable, unreadable, or session expired", body = MessageResponse)
    )
)]
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return bad_request();
    };

    let _session = state.lock_session().await;
    match state.portal.check_in(&req.sign_code).await {
        Ok(result) => Json(MessageResponse::from(result)).into_response(),
        Err(e) => port_failure(&e, StatusCode::OK, "Check-in failed"),
    }
}

/// POST /dfysign/sign/location - Submit a location check-in
#[utoipa::path(
    post,
    path = "/dfysign/sign/location",
    request_body = LocationSignRequest,
    responses(
        (status = 200, description = "Portal verdict on the check-in", body = MessageResponse),
        (status = 400, description = "Invalid request", body = MessageResponse),
        (status = 500, description = "Portal unreachable, unreadable, or session expired", body = MessageResponse)
    )
)]
pub async fn location_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LocationSignRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return bad_request();
    };

    let _session = state.lock_session().await;
    match state
        .portal
        .check_in_location(&req.longitude, &req.latitude)
        .await
    {
        Ok(result) => Json(MessageResponse::from(result)).into_response(),
        Err(e) => port_failure(&e, StatusCode::OK, "Location check-in failed"),
    }
}

/// GET /dfysign/sign/status - The active check-in for a class, if any
#[utoipa::path(
    get,
    path = "/dfysign/sign/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Active check-in, or `success: false` when none is running", body = StatusResponse),
        (status = 400, description = "Missing class_id", body = MessageResponse),
        (status = 500, description = "Portal unreachable", body = MessageResponse)
    )
)]
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let Some(class_id) = query.class_id.filter(|id| !id.is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "class_id is required");
    };

    let _session = state.lock_session().await;
    match state.portal.check_in_status(&class_id).await {
        Ok(status) => {
            info!(class_id = %class_id, check_in_id = %status.check_in_id, "Active check-in found");
            Json(StatusResponse {
                success: true,
                data: status.into(),
            })
            .into_response()
        }
        Err(e) => port_failure(&e, StatusCode::OK, "Failed to read check-in status"),
    }
}
