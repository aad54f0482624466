//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and classifies `HttpResponse` values; whoever executes the call
//! (a `Transport` in this crate, or the mobile host across the FFI) only
//! moves bytes. All fields are owned so values cross FFI boundaries without
//! lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outgoing call. Built per operation and dropped once executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Pre-serialized JSON text.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase as reported by the transport. May be empty.
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Shorthand for a response carrying a JSON body.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.into(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The reported reason phrase, or the canonical one for the status code.
    pub fn status_text(&self) -> &str {
        if !self.status_text.is_empty() {
            return &self.status_text;
        }
        http::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let resp = HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            body: String::new(),
        };
        assert_eq!(resp.content_type(), Some("text/html"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("text/html"));
        assert!(resp.header("accept").is_none());
    }

    #[test]
    fn status_text_falls_back_to_canonical_reason() {
        let resp = HttpResponse::json(503, "{}");
        assert_eq!(resp.status_text(), "Service Unavailable");

        let resp = HttpResponse {
            status_text: "Nope".to_string(),
            ..HttpResponse::json(503, "{}")
        };
        assert_eq!(resp.status_text(), "Nope");
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(HttpResponse::json(200, "").is_success());
        assert!(HttpResponse::json(201, "").is_success());
        assert!(!HttpResponse::json(302, "").is_success());
        assert!(!HttpResponse::json(404, "").is_success());
    }
}
