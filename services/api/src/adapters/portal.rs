//! services/api/src/adapters/portal.rs
//!
//! This module contains the portal adapter, the concrete implementation of the
//! `PortalService` port from the `core` crate. It keeps one cookie-bearing HTTP
//! client for the life of the adapter and drives the login, query, and
//! check-in flows against the portal.

use crate::adapters::interpret::{
    self, CHECK_IN_SUCCESS, KEY_MSG, KEY_MSGBOX, LOGIN_SUCCESS, QR_CHECK_IN_SUCCESS,
};
use crate::adapters::jitter::Jitter;
use async_trait::async_trait;
use checkin_core::domain::{is_numeric_code, CheckInResult, CheckInStatus, Course};
use checkin_core::ports::{PortError, PortResult, PortalService};
use regex::Regex;
use reqwest::{header, Client, Method};
use std::sync::LazyLock;
use tracing::{debug, info};

/// The portal's production host.
pub const DEFAULT_HOST: &str = "https://www.duifene.com";

/// The WeChat in-app browser on iPhone; the portal serves its mobile pages to it.
pub const USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 MicroMessenger/8.0.40(0x1800282a) NetType/WIFI Language/zh_CN";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

// Portal paths, relative to the host.
const PATH_LINK_LOGIN: &str = "/P.aspx";
const PATH_LOGIN_INFO: &str = "/AppCode/LoginInfo.ashx";
const PATH_APP_GATE: &str = "/AppGate.aspx";
const PATH_COURSE_INFO: &str = "/_UserCenter/CourseInfo.ashx";
const PATH_STUDENT_CENTER: &str = "/_UserCenter/PC/CenterStudent.aspx";
const PATH_PROFILE: &str = "/_UserCenter/MB/index.aspx";
const PATH_CHECK_IN: &str = "/_CheckIn/CheckIn.ashx";
const PATH_CHECK_IN_STUDENT: &str = "/_CheckIn/MB/CheckInStudent.aspx?moduleid=16&pasd=";
const PATH_QR_CHECK_OK: &str = "/_CheckIn/MB/QrCodeCheckOK.aspx";
const PATH_ROOM_CHECK_IN: &str = "/_CheckIn/CheckInRoomHandler.ashx";
const PATH_CLASS_STATUS: &str = "/_CheckIn/MB/TeachCheckIn.aspx";

/// Matches the 32-character authorization code carried by a redirect link.
const AUTH_CODE_PATTERN: &str = r"code=(\S{32})";

//=========================================================================================
// Login Link Parsing
//=========================================================================================

static AUTH_CODE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(AUTH_CODE_PATTERN).ok());

/// Finds the authorization code inside an arbitrary pasted redirect link.
pub fn extract_auth_code(link: &str) -> Option<&str> {
    AUTH_CODE
        .as_ref()?
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str())
}

//=========================================================================================
// Request Options
//=========================================================================================

/// Extra headers and an optional form body for one portal call.
#[derive(Debug, Default)]
struct RequestOptions {
    headers: Vec<(header::HeaderName, String)>,
    body: Option<String>,
}

impl RequestOptions {
    fn referer(referer: String) -> Self {
        Self {
            headers: vec![(header::REFERER, referer)],
            body: None,
        }
    }

    /// A form-encoded POST body. Values are placed as given, without escaping.
    fn form(referer: String, body: String) -> Self {
        Self {
            headers: vec![
                (header::CONTENT_TYPE, FORM_CONTENT_TYPE.to_string()),
                (header::REFERER, referer),
            ],
            body: Some(body),
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `PortalService` port over HTTPS.
///
/// The cookie store inside `client` is the session. Nothing else is tracked.
pub struct PortalAdapter {
    client: Client,
    host: String,
    jitter: Jitter,
}

impl PortalAdapter {
    /// Creates a new `PortalAdapter` against `host` with an entropy-seeded jitter.
    pub fn new(host: impl Into<String>) -> PortResult<Self> {
        Self::with_jitter(host, Jitter::from_entropy())
    }

    /// Creates a new `PortalAdapter` with a caller-supplied jitter source.
    pub fn with_jitter(host: impl Into<String>, jitter: Jitter) -> PortResult<Self> {
        // The portal's certificate chain does not always verify; this client
        // only ever talks to that one host.
        let client = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PortError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            jitter,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Sends one request and returns the response body as text.
    ///
    /// The status code is not inspected; the portal signals failures in the body.
    async fn send(&self, method: Method, url: &str, opts: Option<RequestOptions>) -> PortResult<String> {
        let target = url.split('?').next().unwrap_or(url);
        debug!(%method, target, "portal request");
        let mut request = self.client.request(method, url);

        if let Some(opts) = opts {
            for (name, value) in opts.headers {
                request = request.header(name, value);
            }
            if let Some(body) = opts.body {
                request = request.body(body);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        debug!(status = %response.status(), "portal response");

        response
            .text()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))
    }

    async fn submit_code(&self, user_id: &str, code: &str) -> PortResult<CheckInResult> {
        let body = format!(
            "action=studentcheckin&studentid={}&checkincode={}",
            user_id, code
        );
        let text = self
            .send(
                Method::POST,
                &self.url(PATH_CHECK_IN),
                Some(RequestOptions::form(self.url(PATH_CHECK_IN_STUDENT), body)),
            )
            .await?;

        let message = interpret::envelope_message(&text, KEY_MSGBOX)?;
        Ok(CheckInResult::new(message == CHECK_IN_SUCCESS, message))
    }

    async fn confirm_qr(&self, token: &str) -> PortResult<CheckInResult> {
        let url = format!("{}?state={}", self.url(PATH_QR_CHECK_OK), token);
        let text = self.send(Method::GET, &url, None).await?;

        let message = interpret::parse_qr_confirmation(&text);
        if message.is_empty() {
            return Err(PortError::UnsupportedFlow);
        }
        Ok(CheckInResult::new(message.contains(QR_CHECK_IN_SUCCESS), message))
    }
}

//=========================================================================================
// `PortalService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PortalService for PortalAdapter {
    /// Exchanges the link's authorization code for a session cookie.
    ///
    /// Success is not verified here; a later course-list or status call reveals
    /// a code the portal did not accept.
    async fn login_with_link(&self, link: &str) -> PortResult<()> {
        let code = extract_auth_code(link).ok_or(PortError::InvalidLink)?;

        let url = format!(
            "{}?authtype=1&code={}&state=1",
            self.url(PATH_LINK_LOGIN),
            code
        );
        self.send(Method::GET, &url, None).await?;
        info!("Link login exchanged");
        Ok(())
    }

    async fn login_with_password(&self, username: &str, password: &str) -> PortResult<()> {
        // Credentials go out unescaped, matching the portal's own login page.
        let body = format!(
            "action=loginmb&loginname={}&password={}",
            username, password
        );
        let text = self
            .send(
                Method::POST,
                &self.url(PATH_LOGIN_INFO),
                Some(RequestOptions::form(self.url(PATH_APP_GATE), body)),
            )
            .await?;

        let message = interpret::envelope_message(&text, KEY_MSGBOX)?;
        if message != LOGIN_SUCCESS {
            info!(%message, "Password login refused");
            return Err(PortError::AuthFailed(message));
        }
        Ok(())
    }

    async fn is_logged_in(&self) -> PortResult<bool> {
        let url = format!("{}?Action=checklogin", self.url(PATH_LOGIN_INFO));
        let mut opts = RequestOptions::referer(self.url(PATH_STUDENT_CENTER));
        opts.headers
            .push((header::CONTENT_TYPE, FORM_CONTENT_TYPE.to_string()));

        let text = self.send(Method::GET, &url, Some(opts)).await?;
        let message = interpret::envelope_message(&text, KEY_MSG)?;
        Ok(message == "1")
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let text = self
            .send(
                Method::POST,
                &self.url(PATH_COURSE_INFO),
                Some(RequestOptions::form(
                    self.url(PATH_STUDENT_CENTER),
                    "action=getstudentcourse&classtypeid=2".to_string(),
                )),
            )
            .await?;
        interpret::parse_courses(&text)
    }

    async fn user_id(&self) -> PortResult<String> {
        let text = self.send(Method::GET, &self.url(PATH_PROFILE), None).await?;
        interpret::parse_user_id(&text)
    }

    async fn check_in_status(&self, class_id: &str) -> PortResult<CheckInStatus> {
        let url = format!(
            "{}?classid={}&temps=0&checktype=1&isrefresh=0&timeinterval=0&roomid=0&match=",
            self.url(PATH_CLASS_STATUS),
            class_id
        );
        let text = self.send(Method::GET, &url, None).await?;
        interpret::parse_check_in_status(&text)
    }

    async fn check_in(&self, code: &str) -> PortResult<CheckInResult> {
        let user_id = self.user_id().await?;

        let result = if is_numeric_code(code) {
            self.submit_code(&user_id, code).await?
        } else {
            self.confirm_qr(code).await?
        };
        info!(success = result.success, message = %result.message, "Check-in submitted");
        Ok(result)
    }

    async fn check_in_location(
        &self,
        longitude: &str,
        latitude: &str,
    ) -> PortResult<CheckInResult> {
        let user_id = self.user_id().await?;

        let longitude = self.jitter.apply(longitude);
        let latitude = self.jitter.apply(latitude);
        debug!(%longitude, %latitude, "Jittered location");

        let body = format!(
            "action=signin&sid={}&longitude={}&latitude={}",
            user_id, longitude, latitude
        );
        let text = self
            .send(
                Method::POST,
                &self.url(PATH_ROOM_CHECK_IN),
                Some(RequestOptions::form(self.url(PATH_CHECK_IN_STUDENT), body)),
            )
            .await?;

        let message = interpret::envelope_message(&text, KEY_MSGBOX)?;
        let result = CheckInResult::new(message == CHECK_IN_SUCCESS, message);
        info!(success = result.success, message = %result.message, "Location check-in submitted");
        Ok(result)
    }
}
