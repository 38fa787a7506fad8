//! A scripted stand-in for the portal, served on a loopback port.
//!
//! Each test registers a reply per path and afterwards inspects every request
//! the adapter sent.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const PROFILE_PATH: &str = "/_UserCenter/MB/index.aspx";
pub const LOGIN_INFO_PATH: &str = "/AppCode/LoginInfo.ashx";
pub const LINK_LOGIN_PATH: &str = "/P.aspx";
pub const COURSE_INFO_PATH: &str = "/_UserCenter/CourseInfo.ashx";
pub const CHECK_IN_PATH: &str = "/_CheckIn/CheckIn.ashx";
pub const QR_CHECK_OK_PATH: &str = "/_CheckIn/MB/QrCodeCheckOK.aspx";
pub const ROOM_CHECK_IN_PATH: &str = "/_CheckIn/CheckInRoomHandler.ashx";
pub const CLASS_STATUS_PATH: &str = "/_CheckIn/MB/TeachCheckIn.aspx";

pub const STUDENT_ID: &str = "8812345";

/// One request as the portal received it.
#[derive(Clone, Debug)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub user_agent: String,
    pub referer: String,
    pub content_type: String,
    pub cookie: String,
    pub body: String,
}

impl Seen {
    /// Splits a form body into its `key=value` pairs, in order.
    pub fn form(&self) -> Vec<(String, String)> {
        self.body
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn form_value(&self, key: &str) -> Option<String> {
        self.form()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

#[derive(Clone)]
struct Reply {
    body: String,
    set_cookie: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockPortal {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockPortal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, path: &str, body: &str) -> &Self {
        self.insert(path, body, None)
    }

    pub fn reply_with_cookie(&self, path: &str, body: &str, cookie: &str) -> &Self {
        self.insert(path, body, Some(cookie.to_string()))
    }

    fn insert(&self, path: &str, body: &str, set_cookie: Option<String>) -> &Self {
        self.replies.lock().unwrap().insert(
            path.to_string(),
            Reply {
                body: body.to_string(),
                set_cookie,
            },
        );
        self
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn seen_at(&self, path: &str) -> Vec<Seen> {
        self.seen().into_iter().filter(|s| s.path == path).collect()
    }

    /// Serves the mock on a free loopback port and returns its base URL.
    pub async fn start(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn handle(
    State(mock): State<MockPortal>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };

    mock.seen.lock().unwrap().push(Seen {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or("").to_string(),
        user_agent: header_text(header::USER_AGENT),
        referer: header_text(header::REFERER),
        content_type: header_text(header::CONTENT_TYPE),
        cookie: header_text(header::COOKIE),
        body,
    });

    let reply = mock.replies.lock().unwrap().get(uri.path()).cloned();
    match reply {
        Some(reply) => {
            let mut response = Response::new(Body::from(reply.body));
            if let Some(cookie) = reply.set_cookie {
                response
                    .headers_mut()
                    .insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());
            }
            response
        }
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// The profile page carrying the student's internal id.
pub fn profile_page() -> String {
    format!(
        r#"<html><body><form><input type="hidden" name="hidUID" id="hidUID" value="{}" /></form></body></html>"#,
        STUDENT_ID
    )
}

/// A class status page with the given hidden inputs.
pub fn status_page(inputs: &[(&str, &str)]) -> String {
    let fields: String = inputs
        .iter()
        .map(|(id, value)| format!(r#"<input type="hidden" name="{id}" id="{id}" value="{value}" />"#))
        .collect();
    format!("<html><body><form id=\"form1\">{fields}</form></body></html>")
}

/// Returns a loopback URL nothing is listening on.
pub async fn closed_host() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
