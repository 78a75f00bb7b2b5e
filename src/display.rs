//! Terminal rendering of requests and responses
//!
//! Messages are framed by separator banners:
//!
//! ```text
//! ===== HTTP REQUEST =====
//! GET / HTTP/1.1
//! ------- Headers --------
//! host: 127.0.0.1:60001
//! --------- Body ---------
//!
//! ========================
//! ```

use console::style;

use crate::message::{Headers, Request, Response};

/// Width of every banner line.
pub const LINE_WIDTH: usize = 24;

/// 256-colour palette indices.
mod colors {
    pub const GREY: u8 = 102;
    pub const AQUA: u8 = 109;
    pub const ORANGE: u8 = 208;
    pub const RED: u8 = 167;
    pub const BLUE: u8 = 68;
    pub const PINK: u8 = 176;
    pub const GREEN: u8 = 71;
    pub const YELLOW: u8 = 185;
}

/// A line of `fill` with `title` centred in it.
///
/// An empty title gives a plain rule. The title is surrounded by one space
/// on each side; when the padding is odd the extra fill goes on the right.
pub fn separator(title: &str, fill: char, width: usize) -> String {
    if title.is_empty() {
        return fill.to_string().repeat(width);
    }
    let total = width.saturating_sub(title.chars().count() + 2);
    let left = total / 2;
    let right = total - left;
    format!(
        "{} {} {}",
        fill.to_string().repeat(left),
        title,
        fill.to_string().repeat(right)
    )
}

fn paint(text: &str, color: u8, bold: bool, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }
    let styled = style(text).color256(color).force_styling(true);
    if bold {
        styled.bold().to_string()
    } else {
        styled.to_string()
    }
}

fn status_color(code: u16) -> u8 {
    match code {
        200..=299 => colors::GREEN,
        300..=399 => colors::YELLOW,
        400..=499 => colors::ORANGE,
        500..=599 => colors::RED,
        _ => colors::AQUA,
    }
}

fn render(
    title: &str,
    start_line: String,
    headers: &Headers,
    body: &[u8],
    colored: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&separator(title, '=', LINE_WIDTH));
    out.push('\n');
    out.push_str(&start_line);
    out.push('\n');
    out.push_str(&paint(&separator("Headers", '-', LINE_WIDTH), colors::GREY, false, colored));
    out.push('\n');

    let mut pairs: Vec<(&str, &str)> = headers.iter().collect();
    pairs.sort_unstable();
    for (key, value) in pairs {
        out.push_str(&paint(key, colors::PINK, false, colored));
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }

    out.push_str(&paint(&separator("Body", '-', LINE_WIDTH), colors::GREY, false, colored));
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(body));
    out.push('\n');
    out.push_str(&separator("", '=', LINE_WIDTH));
    out.push('\n');
    out
}

/// Render a request; `colored` enables ANSI styling.
pub fn render_request(request: &Request, colored: bool) -> String {
    let start_line = format!(
        "{} {} {}",
        paint(request.method().as_str(), colors::BLUE, true, colored),
        request.uri(),
        request.version()
    );
    render("HTTP REQUEST", start_line, request.headers(), request.body(), colored)
}

/// Render a response; the status is coloured by class.
pub fn render_response(response: &Response, colored: bool) -> String {
    let code = response.status().as_u16();
    let start_line = if colored {
        paint(&response.status_line(), status_color(code), true, true)
    } else {
        response.status_line()
    };
    render("HTTP RESPONSE", start_line, response.headers(), response.body(), colored)
}
