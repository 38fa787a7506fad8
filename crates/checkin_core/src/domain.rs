//! crates/checkin_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of the portal's wire format; adapters map
//! portal records onto them.

/// The byte length of a numeric check-in code. Any other length is a QR token.
pub const NUMERIC_CODE_LEN: usize = 4;

/// One term/class/course triple the student is enrolled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Course {
    pub term_id: String,
    pub term_name: String,
    pub term_status: String,
    pub course_id: String,
    pub course_name: String,
    pub background_color: String,
    pub color: String,
    pub is_cancelled: String,
    pub creator_id: String,
    pub created_date: String,
    pub updated_date: String,
    pub class_id: String,
    pub class_name: String,
}

/// The protocol an active check-in event expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInKind {
    /// A short numeric code typed by the student.
    Code,
    /// A token carried by the QR code shown in class.
    QrCode,
    /// The student's GPS position near the room.
    Location,
    Unknown,
}

impl CheckInKind {
    /// Maps the portal's check-type marker onto a kind.
    pub fn from_marker(marker: &str) -> Self {
        match marker.trim() {
            "1" => CheckInKind::Code,
            "2" => CheckInKind::QrCode,
            "3" => CheckInKind::Location,
            _ => CheckInKind::Unknown,
        }
    }
}

/// A snapshot of the active check-in event for one class.
///
/// Every field is copied verbatim from the portal's status page. A field the
/// page did not carry is left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInStatus {
    /// Countdown seconds remaining, as the portal renders them.
    pub seconds: String,
    /// Raw check-type marker; see [`CheckInStatus::kind`].
    pub check_type: String,
    pub check_in_id: String,
    pub class_id: String,
    pub code_key: String,
    pub room_longitude: String,
    pub room_latitude: String,
}

impl CheckInStatus {
    pub fn kind(&self) -> CheckInKind {
        CheckInKind::from_marker(&self.check_type)
    }

    /// The countdown as a number, if the portal rendered one.
    pub fn seconds_remaining(&self) -> Option<u64> {
        self.seconds.trim().parse().ok()
    }
}

/// The outcome of a submitted check-in: a success flag and the portal's own message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInResult {
    pub success: bool,
    pub message: String,
}

impl CheckInResult {
    pub fn new(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
        }
    }
}

/// Returns true when `code` should be submitted as a numeric code rather than
/// confirmed as a QR token.
///
/// The length is counted in bytes. Full-width digits typed through an IME are
/// therefore confirmed as a QR token.
pub fn is_numeric_code(code: &str) -> bool {
    code.len() == NUMERIC_CODE_LEN
}
