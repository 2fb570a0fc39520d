use crate::common::Responder;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response};
use std::fmt::Write;

/// Path the echo responder is mounted at by [`create_server`](super::create_server)
pub const ECHO_PATH: &str = "/";

/// Path the version responder is mounted at by [`create_server`](super::create_server)
pub const VERSION_PATH: &str = "/version";

/// Content type sent by the version responder
///
/// Existing clients match this string byte for byte, including "chatset".
pub const VERSION_CONTENT_TYPE: &str = "application/json; chatset=utf-8";

/// Renders the request target and headers as plain text
///
/// ```text
/// URL: /
/// Header:
/// accept -> "text/plain"; "*/*"
/// host -> "localhost"
/// ```
///
/// Header names are sorted; values keep the order they arrived in.
pub fn format_echo_body<B>(request: &Request<B>) -> String {
    let headers = request.headers();
    let mut body = format!("URL: {}\nHeader:\n", request.uri());

    let mut names: Vec<&str> = headers.keys().map(|name| name.as_str()).collect();
    names.sort_unstable();

    for name in names {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| format!("\"{}\"", String::from_utf8_lossy(value.as_bytes())))
            .collect::<Vec<_>>()
            .join("; ");
        // Writing into a String cannot fail.
        let _ = writeln!(body, "{name} -> {values}");
    }

    body
}

/// Echoes the request target and headers back as the response body
pub fn echo(request: &Request<Bytes>) -> Response<Bytes> {
    Response::new(Bytes::from(format_echo_body(request)))
}

/// Responds to every request with the version it was built with
#[derive(Debug, Clone)]
pub struct VersionResponder {
    version: String,
    body: Bytes,
}

impl VersionResponder {
    /// Captures `version` and pre-renders the JSON body
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        let body = Bytes::from(serde_json::json!({ "version": version }).to_string());
        Self { version, body }
    }

    /// The version string this responder reports
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Responder for VersionResponder {
    fn respond(&self, _request: &Request<Bytes>) -> Response<Bytes> {
        let mut response = Response::new(self.body.clone());
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(VERSION_CONTENT_TYPE));
        response
    }
}

/// Builds the version responder for `version`
pub fn version(version: impl Into<String>) -> VersionResponder {
    VersionResponder::new(version)
}
