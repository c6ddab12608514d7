//! HTTP transport types and the injection point for the network round-trip.
//!
//! # Design
//! Requests and responses are plain data. `Api` builds `HttpRequest` values
//! without touching the network; a `Transport` executes them and hands back
//! an `HttpResponse`. The client never speaks HTTP itself, so tests swap in a
//! closure and production code uses `UreqTransport` (or anything else that
//! implements the trait).
//!
//! `path` is the complete URL including the rendered query string, and `body`
//! is an already encoded `application/x-www-form-urlencoded` payload. The
//! service expects bracketed id lists verbatim, so the transport must send
//! both exactly as given.

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// `reason` is the status description used as the error text when `status`
/// is outside 2xx.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    /// A 200 response carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one blocking request/response round-trip.
///
/// Implementations must return non-2xx responses as `Ok` so the client can
/// report the status line; `Err` is reserved for failures where no response
/// arrived at all.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transports() {
        let transport = |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::ok(req.path.clone()))
        };
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: "https://todoist.com/API/getProjects".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let resp = transport.execute(&req).unwrap();
        assert_eq!(resp.body, "https://todoist.com/API/getProjects");
    }

    #[test]
    fn success_range_is_2xx() {
        let mut resp = HttpResponse::ok("");
        assert!(resp.is_success());
        resp.status = 204;
        assert!(resp.is_success());
        resp.status = 301;
        assert!(!resp.is_success());
        resp.status = 500;
        assert!(!resp.is_success());
    }
}
