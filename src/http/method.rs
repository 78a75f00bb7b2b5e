//! HTTP method tokens

use std::fmt;
use std::str::FromStr;

/// Request method. Anything outside the standard token set is `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
    Invalid,
}

/// All standard HTTP methods
pub const STANDARD_METHODS: &[Method] = &[
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Delete,
    Method::Head,
    Method::Options,
    Method::Trace,
    Method::Connect,
];

impl Method {
    /// Wire token for the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    /// Tokens are case-sensitive; unknown tokens map to [`Method::Invalid`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(STANDARD_METHODS
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .unwrap_or(Method::Invalid))
    }
}
