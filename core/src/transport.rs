//! Execution of `HttpRequest`s.
//!
//! The core never requires a particular HTTP stack. Anything that can turn
//! an `HttpRequest` into an `HttpResponse` implements `Transport`; a
//! blocking `ureq` implementation ships behind the `blocking` feature.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Error statuses are not failures here: a 4xx/5xx answer is returned as an
/// `HttpResponse`. `Err` means no response was received.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "blocking")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "blocking")]
mod blocking {
    use std::io;
    use std::time::Duration;

    use ureq::typestate::{WithBody, WithoutBody};
    use ureq::{Agent, RequestBuilder};

    use super::Transport;
    use crate::config::ClientConfig;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a `ureq` agent.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl UreqTransport {
        pub fn new(timeout: Duration) -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self { agent }
        }

        pub fn from_config(config: &ClientConfig) -> Self {
            Self::new(config.timeout)
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = request.url.as_str();
            let body = request.body.as_deref();
            let result = match request.method {
                HttpMethod::Get => without_body(self.agent.get(url), request).call(),
                HttpMethod::Delete => without_body(self.agent.delete(url), request).call(),
                HttpMethod::Post => send(with_body(self.agent.post(url), request), body),
                HttpMethod::Put => send(with_body(self.agent.put(url), request), body),
                HttpMethod::Patch => send(with_body(self.agent.patch(url), request), body),
            };
            let mut response = result.map_err(classify)?;

            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        v.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            // Undecodable bytes are left for the classifier to report.
            let bytes = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| TransportError::Other(format!("failed to read response body: {e}")))?;
            let body = String::from_utf8_lossy(&bytes).into_owned();

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
            })
        }
    }

    fn without_body(
        mut builder: RequestBuilder<WithoutBody>,
        request: &HttpRequest,
    ) -> RequestBuilder<WithoutBody> {
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn with_body(
        mut builder: RequestBuilder<WithBody>,
        request: &HttpRequest,
    ) -> RequestBuilder<WithBody> {
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send(
        builder: RequestBuilder<WithBody>,
        body: Option<&str>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    fn classify(err: ureq::Error) -> TransportError {
        let unreachable = match &err {
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => true,
            ureq::Error::Io(io) => matches!(
                io.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::AddrNotAvailable
            ),
            _ => false,
        };
        if unreachable {
            TransportError::Unreachable(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}
