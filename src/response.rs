//! The response boundary: two headers, a blank line, then the raw file.
//!
//! [`ResponseHeaders::write_cgi`] writes the CGI-style header block used when
//! the image is streamed to stdout. [`ResponseHeaders::header_map`] hands the
//! same two headers to an embedding HTTP stack.

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub content_type: &'static str,
    pub content_length: u64,
}

impl ResponseHeaders {
    pub fn new(content_type: &'static str, content_length: u64) -> Self {
        Self {
            content_type,
            content_length,
        }
    }

    pub fn header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(self.content_length));
        headers
    }

    /// Write `Content-Type` then `Content-Length`, then the blank line that
    /// ends the header block.
    pub fn write_cgi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let headers = self.header_map();
        for name in [CONTENT_TYPE, CONTENT_LENGTH] {
            let Some(value) = headers.get(&name) else {
                continue;
            };
            let value = value
                .to_str()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            write!(out, "{}: {}\r\n", title_case(&name), value)?;
        }
        out.write_all(b"\r\n")
    }
}

/// `content-type` → `Content-Type`.
fn title_case(name: &HeaderName) -> String {
    name.as_str()
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
