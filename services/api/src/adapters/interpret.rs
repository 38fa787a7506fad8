//! services/api/src/adapters/interpret.rs
//!
//! Turns raw portal responses into domain values. The portal answers either
//! with a JSON envelope carrying a message, a bare JSON array, or a
//! server-rendered page whose useful values sit in hidden inputs. Every
//! element-id lookup against portal markup lives in this module.

use checkin_core::domain::{CheckInStatus, Course};
use checkin_core::ports::{PortError, PortResult};
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Message the password login returns on success.
pub const LOGIN_SUCCESS: &str = "登录成功";
/// Message the code and location check-ins return on success.
pub const CHECK_IN_SUCCESS: &str = "签到成功！";
/// Fragment the QR confirmation page contains on success.
pub const QR_CHECK_IN_SUCCESS: &str = "签到成功";

/// Envelope key used by login and check-in calls.
pub const KEY_MSGBOX: &str = "msgbox";
/// Envelope key used by the login-status probe.
pub const KEY_MSG: &str = "msg";

/// Marker the status page only carries while a check-in is running.
pub const ACTIVE_CHECK_IN_MARKER: &str = "HFChecktype";

const ID_USER: &str = "hidUID";
const ID_SECONDS: &str = "HFSeconds";
const ID_CHECK_TYPE: &str = "HFChecktype";
const ID_CHECK_IN: &str = "HFCheckInID";
const ID_CLASS: &str = "HFClassID";
const ID_CODE_KEY: &str = "HFCheckCodeKey";
const ID_ROOM_LONGITUDE: &str = "HFRoomLongitude";
const ID_ROOM_LATITUDE: &str = "HFRoomLatitude";
const ID_QR_RESULT: &str = "DivOK";

//=========================================================================================
// JSON Envelopes
//=========================================================================================

/// A JSON object wrapping a human-readable message under a fixed key.
#[derive(Debug)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    pub fn parse(body: &str) -> PortResult<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            PortError::MalformedResponse(format!("{}, raw response: {}", e, body))
        })?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(PortError::MalformedResponse(format!(
                "expected a JSON object, got: {}",
                other
            ))),
        }
    }

    /// The message stored under `key`. Absent or non-string values are faults.
    pub fn message(&self, key: &str) -> PortResult<&str> {
        match self.fields.get(key) {
            Some(Value::String(message)) => Ok(message.as_str()),
            Some(other) => Err(PortError::MalformedResponse(format!(
                "`{}` is not a string: {}",
                key, other
            ))),
            None => Err(PortError::MalformedResponse(format!(
                "`{}` is missing from the response",
                key
            ))),
        }
    }
}

/// Shorthand for parsing an envelope and reading one message.
pub fn envelope_message(body: &str, key: &str) -> PortResult<String> {
    Envelope::parse(body)?.message(key).map(str::to_owned)
}

//=========================================================================================
// Course Records
//=========================================================================================

/// A course exactly as the portal serializes it. Missing keys read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CourseRecord {
    #[serde(rename = "TermID")]
    term_id: String,
    #[serde(rename = "TermName")]
    term_name: String,
    #[serde(rename = "TermStatus")]
    term_status: String,
    #[serde(rename = "CourseID")]
    course_id: String,
    #[serde(rename = "CourseName")]
    course_name: String,
    #[serde(rename = "BackgroundColor")]
    background_color: String,
    #[serde(rename = "Color")]
    color: String,
    #[serde(rename = "IsCanel")]
    is_cancelled: String,
    #[serde(rename = "CreaterID")]
    creator_id: String,
    #[serde(rename = "CreaterDate")]
    created_date: String,
    #[serde(rename = "UpdaterDate")]
    updated_date: String,
    #[serde(rename = "TClassID")]
    class_id: String,
    #[serde(rename = "ClassName")]
    class_name: String,
}

impl CourseRecord {
    fn to_domain(self) -> Course {
        Course {
            term_id: self.term_id,
            term_name: self.term_name,
            term_status: self.term_status,
            course_id: self.course_id,
            course_name: self.course_name,
            background_color: self.background_color,
            color: self.color,
            is_cancelled: self.is_cancelled,
            creator_id: self.creator_id,
            created_date: self.created_date,
            updated_date: self.updated_date,
            class_id: self.class_id,
            class_name: self.class_name,
        }
    }
}

/// Parses the course-list array, keeping portal order.
///
/// The portal answers with an error envelope instead of an array when the
/// session is gone, so the raw body travels with the error.
pub fn parse_courses(body: &str) -> PortResult<Vec<Course>> {
    let records: Vec<CourseRecord> =
        serde_json::from_str(body).map_err(|e| PortError::CourseListParse {
            reason: e.to_string(),
            body: body.to_string(),
        })?;
    Ok(records.into_iter().map(CourseRecord::to_domain).collect())
}

//=========================================================================================
// HTML Pages
//=========================================================================================

struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    fn parse(body: &str) -> Self {
        Self {
            document: Html::parse_document(body),
        }
    }

    /// The `value` attribute of the element with the given id.
    fn input_value(&self, id: &str) -> Option<String> {
        let selector = Selector::parse(&format!("#{}", id)).ok()?;
        self.document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("value"))
            .map(str::to_owned)
    }

    fn require_input_value(&self, id: &str) -> PortResult<String> {
        self.input_value(id)
            .ok_or_else(|| PortError::FieldNotFound(id.to_string()))
    }

    /// The text content of every element with the given id, joined and kept
    /// verbatim. Empty if there is none.
    fn text_of(&self, id: &str) -> String {
        let Ok(selector) = Selector::parse(&format!("#{}", id)) else {
            return String::new();
        };
        self.document
            .select(&selector)
            .flat_map(|element| element.text())
            .collect()
    }
}

/// Reads the student's internal identifier from the profile page.
pub fn parse_user_id(body: &str) -> PortResult<String> {
    HtmlPage::parse(body).require_input_value(ID_USER)
}

/// Reads the result text of the QR confirmation page. Empty when the page has none.
pub fn parse_qr_confirmation(body: &str) -> String {
    HtmlPage::parse(body).text_of(ID_QR_RESULT)
}

/// Reads the active check-in from a class status page.
///
/// A page without the check-type marker means nothing is running. Individual
/// hidden fields that are missing read as empty.
pub fn parse_check_in_status(body: &str) -> PortResult<CheckInStatus> {
    if !body.contains(ACTIVE_CHECK_IN_MARKER) {
        return Err(PortError::NoActiveCheckIn);
    }

    let page = HtmlPage::parse(body);
    let field = |id: &str| page.input_value(id).unwrap_or_default();

    Ok(CheckInStatus {
        seconds: field(ID_SECONDS),
        check_type: field(ID_CHECK_TYPE),
        check_in_id: field(ID_CHECK_IN),
        class_id: field(ID_CLASS),
        code_key: field(ID_CODE_KEY),
        room_longitude: field(ID_ROOM_LONGITUDE),
        room_latitude: field(ID_ROOM_LATITUDE),
    })
}
