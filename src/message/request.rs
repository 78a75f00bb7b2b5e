use crate::errors::ParseError;
use crate::http::Method;

use super::{
    parse_body, parse_header_block, parse_start_line, serialize, split_start_line, Headers,
    DEFAULT_VERSION,
};

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    uri: String,
    version: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::Get,
            uri: String::from("/"),
            version: DEFAULT_VERSION.to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }
}

impl Request {
    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> &str {
        &self.version
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

    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    pub fn set_uri(&mut self, uri: &str) -> &mut Self {
        self.uri = uri.to_string();
        self
    }

    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.set(key, value);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// `METHOD URI VERSION`
    pub fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.uri, self.version)
    }

    /// Wire form: request line, headers, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize(&self.request_line(), &self.headers, &self.body)
    }

    /// Parse a raw request, as a server would receive it.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let (start_line, line_end) = parse_start_line(raw)?;
        let (method, uri, version) = split_start_line(&start_line)?;
        let version = if version.is_empty() { DEFAULT_VERSION } else { version };
        let method: Method = method.parse().unwrap_or(Method::Invalid);
        let (headers, body_start) = parse_header_block(raw, line_end)?;
        let body = parse_body(raw, body_start, &headers)?;

        Ok(Self {
            method,
            uri: uri.to_string(),
            version: version.to_string(),
            headers,
            body,
        })
    }
}
