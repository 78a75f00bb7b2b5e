//! Status code lookup
//!
//! Only registered codes (those with a canonical reason phrase) are accepted.

pub use ::http::StatusCode;

/// Parse the numeric status field of a start line.
///
/// Returns `None` for anything that is not a three-digit registered code.
pub fn parse_status_code(field: &str) -> Option<StatusCode> {
    if field.len() != 3 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let code = StatusCode::from_bytes(field.as_bytes()).ok()?;
    code.canonical_reason().map(|_| code)
}

/// Reason phrase for a status code, or `"Unknown"`.
pub fn reason_phrase(code: StatusCode) -> &'static str {
    code.canonical_reason().unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registered_codes() {
        assert_eq!(parse_status_code("200"), Some(StatusCode::OK));
        assert_eq!(parse_status_code("404"), Some(StatusCode::NOT_FOUND));
        assert_eq!(parse_status_code("418"), Some(StatusCode::IM_A_TEAPOT));
    }

    #[test]
    fn test_reject_unparsable_or_unknown() {
        assert_eq!(parse_status_code("abc"), None);
        assert_eq!(parse_status_code(""), None);
        assert_eq!(parse_status_code("2000"), None);
        assert_eq!(parse_status_code("+20"), None);
        assert_eq!(parse_status_code("299"), None);
        assert_eq!(parse_status_code("999"), None);
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(StatusCode::OK), "OK");
        assert_eq!(reason_phrase(StatusCode::INTERNAL_SERVER_ERROR), "Internal Server Error");
    }
}
