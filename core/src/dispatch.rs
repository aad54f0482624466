//! Request dispatcher and response classifier.
//!
//! # Design
//! `Dispatcher` turns a relative path plus `RequestOptions` into a full
//! `HttpRequest`, and turns an `HttpResponse` into either the parsed JSON
//! body or a classified `ApiError`. `execute` and `dispatch` add the actual
//! round-trip through a `Transport`; `build` and `classify` stay free of I/O
//! so the FFI host can run the call itself.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{snippet, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

const JSON: &str = "application/json";

/// Headers attached to every request unless the caller overrides them.
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [("Content-Type", JSON), ("Accept", JSON)];

/// Caller-supplied part of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::new(HttpMethod::Get, None)
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, Some(body.into()))
    }

    pub fn put(body: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, Some(body.into()))
    }

    /// Serialize `payload` as the JSON body.
    pub fn json<T: Serialize>(method: HttpMethod, payload: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self::new(method, Some(body)))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn new(method: HttpMethod, body: Option<String>) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body,
        }
    }
}

/// Builds requests against one base URL and classifies their responses.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    base_url: String,
}

impl Dispatcher {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Resolve `path` and merge the default headers with the caller's.
    /// A caller header replaces a default of the same name in place.
    pub fn build(&self, path: &str, options: RequestOptions) -> HttpRequest {
        let mut headers: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (name, value) in options.headers {
            match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
                Some(existing) => existing.1 = value,
                None => headers.push((name, value)),
            }
        }
        HttpRequest {
            method: options.method,
            url: self.url(path),
            headers,
            body: options.body,
        }
    }

    /// Interpret a response: content type first, then JSON parse, then status.
    pub fn classify(&self, response: &HttpResponse) -> Result<Value, ApiError> {
        let is_json = response
            .content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON));
        if !is_json {
            return Err(ApiError::ServerResponseNotJson {
                status: response.status,
                status_text: response.status_text().to_string(),
                snippet: snippet(&response.body),
            });
        }

        let body: Value =
            serde_json::from_str(&response.body).map_err(|_| ApiError::ServerResponseInvalid {
                status: response.status,
                status_text: response.status_text().to_string(),
                snippet: snippet(&response.body),
            })?;

        if !response.is_success() {
            let message = error_field(&body, "message")
                .or_else(|| error_field(&body, "error"))
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "request failed with status {} {}",
                        response.status,
                        response.status_text()
                    )
                });
            return Err(ApiError::RequestFailed {
                status: response.status,
                message,
            });
        }

        Ok(body)
    }

    /// Run `request` through `transport`, classifying transport failures.
    pub fn execute<T: Transport>(
        &self,
        transport: &T,
        request: &HttpRequest,
    ) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "dispatching request");
        transport.execute(request).map_err(|e| {
            let err = ApiError::from_transport(&request.url, e);
            warn!(method = %request.method, url = %request.url, error = %err, "request did not complete");
            err
        })
    }

    /// Build, execute and classify in one step.
    pub fn dispatch<T: Transport>(
        &self,
        transport: &T,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let request = self.build(path, options);
        let response = self.execute(transport, &request)?;
        self.classify(&response).inspect_err(|err| {
            warn!(url = %request.url, status = response.status, error = %err, "request failed");
        })
    }
}

fn error_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
