//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `PetfinderClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network; a `Transport` executes the round-trip in between. Every upstream
//! operation is a GET, so a request is just a path and its query pairs.

use std::fmt;

use url::form_urlencoded;

/// A GET request described as plain data.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Upstream operation name, e.g. `pet.find`.
    pub operation: String,
    /// Base URL joined with the operation name.
    pub path: String,
    /// Query pairs in the order they are sent.
    pub query: Vec<(String, String)>,
}

impl HttpRequest {
    /// Full URL with the percent-encoded query string appended.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{query}", self.path)
    }

    /// First value of the named query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

// The API key rides in the query; keep it out of logs and panic messages.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<(&str, &str)> = self
            .query
            .iter()
            .map(|(k, v)| {
                if k == "key" {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("operation", &self.operation)
            .field("path", &self.path)
            .field("query", &query)
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// Any status counts as a completed round-trip; interpreting the body is the
/// decoder's job. The body is kept as raw bytes so that malformed text is
/// reported by the decoder rather than by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }
}
