//! Case-insensitive header map

use std::collections::HashMap;

/// Header fields of an HTTP message.
///
/// Keys are stored lowercased, so every lookup is case-insensitive and a
/// second `set` of the same name (in any case) replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.map.insert(key.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(&key.to_ascii_lowercase())
    }

    /// Remove a header; returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.map.remove(&key.to_ascii_lowercase()).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Parse a raw header block (lines separated by CRLF, no trailing blank line).
    ///
    /// Each line is split at its first colon; leading spaces are stripped
    /// from the value. Lines without a colon are ignored.
    pub(crate) fn parse_block(block: &str) -> Self {
        let mut headers = Self::new();
        for line in block.split("\r\n") {
            if line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.set(key, value.trim_start_matches(' '));
            }
        }
        headers
    }

    /// Append `Key: Value\r\n` for every header.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        for (key, value) in self.iter() {
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
    }
}
