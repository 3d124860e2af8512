//! The I/O seam between request building and response parsing.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and reports either a response (any
//! status) or a failure that prevented a status from arriving. `UreqTransport`
//! is the default implementation; callers that need their own timeouts, proxy
//! or TLS setup hand in a configured `ureq::Agent`.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpRequest, HttpResponse};

/// Executes a single HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with no overall timeout that returns 4xx/5xx as data.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Agent that gives up on any single request after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent as-is.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url();
        let mut response = match self.agent.get(&url).call() {
            Ok(response) => response,
            // A caller-supplied agent may still treat statuses as errors.
            Err(ureq::Error::StatusCode(status)) => {
                debug!(operation = %request.operation, status, "status reported as error by agent");
                return Ok(HttpResponse::new(status, Vec::new()));
            }
            Err(err) => return Err(classify(err)),
        };

        // Bytes, not text: a body that is not UTF-8 is the decoder's problem.
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|err| TransportError::with_source(TransportErrorKind::Io, err))?;

        Ok(HttpResponse::new(status, body))
    }
}

fn classify(err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound => TransportErrorKind::Dns,
        ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(_) => TransportErrorKind::Io,
        _ => TransportErrorKind::Other,
    };
    TransportError::with_source(kind, err)
}
