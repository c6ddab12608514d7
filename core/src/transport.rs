//! Default blocking transport backed by `ureq`.

use crate::config::TransportOptions;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// `Transport` implementation over a `ureq::Agent`.
///
/// Status codes are returned as data (`http_status_as_error(false)`), leaving
/// status interpretation to the client. Request headers, including the form
/// content type set by `Api`, are forwarded unchanged.
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: Option<String>,
}

impl UreqTransport {
    pub fn new(options: &TransportOptions) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(options.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: options.user_agent.clone(),
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut headers = req.headers.clone();
        if let Some(ua) = &self.user_agent {
            headers.push(("user-agent".to_string(), ua.clone()));
        }

        let result = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&req.path);
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&req.path);
                for (key, value) in &headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match &req.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
