//! crates/checkin_core/src/ports.rs
//!
//! Defines the service contract (trait) between the web boundary and the
//! portal client. The boundary only ever talks to `PortalService`, so the
//! concrete HTTP client can be swapped for a fake in tests.

use async_trait::async_trait;
use crate::domain::{CheckInResult, CheckInStatus, Course};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// Every way a portal operation can end without the value it was asked for.
///
/// Only the faults (see [`PortError::is_fault`]) mean something went wrong.
/// The remaining variants are legitimate negative outcomes the boundary
/// renders distinctly from faults.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Network or TLS failure talking to the portal.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The portal answered with a body that does not have the expected JSON shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// An expected HTML element or attribute was absent from a portal page.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// The course list did not parse as an array. `body` is the raw portal text.
    #[error("Failed to parse course list: {reason}, raw response: {body}")]
    CourseListParse { reason: String, body: String },

    /// The login link did not carry an authorization code.
    #[error("Invalid login link")]
    InvalidLink,

    /// The portal refused the credentials; carries the portal's own message.
    #[error("{0}")]
    AuthFailed(String),

    /// The class has no check-in event running.
    #[error("No active check-in")]
    NoActiveCheckIn,

    /// QR confirmation needs a session established through the login link.
    #[error("QR check-in requires a session established through the login link")]
    UnsupportedFlow,
}

impl PortError {
    /// True for genuine faults; false for expected negative outcomes.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            PortError::Transport(_)
                | PortError::MalformedResponse(_)
                | PortError::FieldNotFound(_)
                | PortError::CourseListParse { .. }
        )
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Port (Trait)
//=========================================================================================

/// One authenticated session against the portal.
///
/// Implementations share a single cookie store across every call, so calls on
/// one instance must be serialized by the caller.
#[async_trait]
pub trait PortalService: Send + Sync {
    // --- Session ---

    /// Logs in by exchanging the authorization code embedded in a redirect link.
    async fn login_with_link(&self, link: &str) -> PortResult<()>;

    /// Logs in with a username and password form post.
    async fn login_with_password(&self, username: &str, password: &str) -> PortResult<()>;

    /// Asks the portal whether the current session is logged in.
    async fn is_logged_in(&self) -> PortResult<bool>;

    // --- Queries ---

    async fn list_courses(&self) -> PortResult<Vec<Course>>;

    /// Scrapes the student's internal identifier from the profile page.
    async fn user_id(&self) -> PortResult<String>;

    async fn check_in_status(&self, class_id: &str) -> PortResult<CheckInStatus>;

    // --- Check-in ---

    /// Submits a numeric code (four bytes) or confirms a QR token (any other length).
    async fn check_in(&self, code: &str) -> PortResult<CheckInResult>;

    async fn check_in_location(&self, longitude: &str, latitude: &str)
        -> PortResult<CheckInResult>;
}
