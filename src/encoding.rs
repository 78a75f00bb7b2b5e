//! Form body encoding
//!
//! Values typed into the POST prompt are percent-encoded before being
//! placed in an `application/x-www-form-urlencoded` body. Space and every
//! ASCII punctuation character are escaped; letters and digits pass through.

use mime::Mime;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Form field the server reads comments from.
pub const FORM_FIELD: &str = "comment";

/// Content type of menu POST bodies.
pub fn form_content_type() -> Mime {
    mime::APPLICATION_WWW_FORM_URLENCODED
}

/// Percent-encode a single form value.
pub fn encode_form_value(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Build a `field=value` form body with the value encoded.
pub fn form_body(field: &str, value: &str) -> String {
    format!("{}={}", field, encode_form_value(value))
}
