//! HTTP message model
//!
//! [`Request`] and [`Response`] are independent structs that share the
//! [`Headers`] map and the framing helpers below. Start lines are always
//! derived from the structured fields, never stored.

mod headers;
mod request;
mod response;

pub use headers::Headers;
pub use request::Request;
pub use response::Response;

use tracing::error;

use crate::errors::ParseError;
use crate::net::connection::{find_subsequence, HEADER_DELIMITER};

/// Default protocol version for new messages.
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

const CRLF: &[u8] = b"\r\n";

/// Extract the start line; returns it with the offset of its terminator.
fn parse_start_line(raw: &[u8]) -> Result<(String, usize), ParseError> {
    let Some(line_end) = find_subsequence(raw, CRLF) else {
        error!("Malformed message: missing start line end.");
        return Err(ParseError::MissingStartLineTerminator);
    };
    Ok((String::from_utf8_lossy(&raw[..line_end]).into_owned(), line_end))
}

/// Parse the header block following the start line.
///
/// Returns the headers and the offset at which the body begins.
fn parse_header_block(raw: &[u8], line_end: usize) -> Result<(Headers, usize), ParseError> {
    let Some(head_end) = find_subsequence(&raw[line_end..], HEADER_DELIMITER)
        .map(|pos| pos + line_end)
    else {
        error!("Malformed message: missing headers end.");
        return Err(ParseError::MissingHeaderDelimiter);
    };

    let headers = if head_end > line_end {
        Headers::parse_block(&String::from_utf8_lossy(&raw[line_end + CRLF.len()..head_end]))
    } else {
        Headers::new()
    };
    Ok((headers, head_end + HEADER_DELIMITER.len()))
}

/// Split a start line into its first two fields and the (possibly empty) rest.
fn split_start_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next()) {
        (Some(first), Some(second)) if !first.is_empty() && !second.is_empty() => {
            Ok((first, second, parts.next().unwrap_or("")))
        }
        _ => {
            error!("Malformed start line: {}", line);
            Err(ParseError::MalformedStartLine(line.to_string()))
        }
    }
}

/// Extract the body starting at `body_start`, bounded by `Content-Length`.
///
/// The body is only taken when `Content-Length` is declared; otherwise, or
/// when nothing follows the head, it is empty.
fn parse_body(raw: &[u8], body_start: usize, headers: &Headers) -> Result<Vec<u8>, ParseError> {
    if body_start >= raw.len() {
        return Ok(Vec::new());
    }
    let available = &raw[body_start..];

    let Some(value) = headers.get("content-length") else {
        return Ok(Vec::new());
    };
    let expected: usize = value.trim().parse().map_err(|_| {
        error!("Invalid Content-Length header: {}", value);
        ParseError::InvalidContentLength(value.to_string())
    })?;

    if available.len() < expected {
        error!(
            expected,
            available = available.len(),
            "Incomplete body received."
        );
        return Err(ParseError::TruncatedBody {
            expected,
            available: available.len(),
        });
    }
    Ok(available[..expected].to_vec())
}

/// Serialize a start line, headers and body into wire bytes.
fn serialize(start_line: &str, headers: &Headers, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(start_line.len() + body.len() + 64);
    out.extend_from_slice(start_line.as_bytes());
    out.extend_from_slice(CRLF);
    headers.write_to(&mut out);
    out.extend_from_slice(CRLF);
    out.extend_from_slice(body);
    out
}
