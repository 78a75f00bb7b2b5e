use tracing::error;

use crate::errors::ParseError;
use crate::http::{parse_status_code, reason_phrase, StatusCode};

use super::{
    parse_body, parse_header_block, parse_start_line, serialize, split_start_line, Headers,
    DEFAULT_VERSION,
};

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    version: String,
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    keep_alive: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            status: StatusCode::OK,
            headers: Headers::new(),
            body: Vec::new(),
            keep_alive: false,
        }
    }
}

impl Response {
    /// Parse raw response bytes.
    ///
    /// Stages run strictly in order: start line, headers, keep-alive,
    /// body. Each failure is logged with its reason before returning.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let (start_line, line_end) = parse_start_line(raw)?;
        let (version, code, _reason) = split_start_line(&start_line)?;
        let Some(status) = parse_status_code(code) else {
            error!("Invalid status code: {}", code);
            return Err(ParseError::InvalidStatusCode(code.to_string()));
        };

        let (headers, body_start) = parse_header_block(raw, line_end)?;
        let keep_alive = connection_keep_alive(&headers);
        let body = parse_body(raw, body_start, &headers)?;

        Ok(Self {
            version: version.to_string(),
            status,
            headers,
            body,
            keep_alive,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True only when the server sent `Connection: keep-alive`.
    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets a header and re-derives keep-alive when it is `Connection`.
    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.set(key, value);
        self.keep_alive = connection_keep_alive(&self.headers);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// `VERSION CODE REASON`
    pub fn status_line(&self) -> String {
        format!(
            "{} {} {}",
            self.version,
            self.status.as_u16(),
            reason_phrase(self.status)
        )
    }

    /// Wire form: status line, headers, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize(&self.status_line(), &self.headers, &self.body)
    }
}

/// HTTP/1.1's implicit keep-alive is not assumed; only an explicit header counts.
fn connection_keep_alive(headers: &Headers) -> bool {
    headers
        .get("connection")
        .map(|value| value.trim().eq_ignore_ascii_case("keep-alive"))
        .unwrap_or(false)
}
