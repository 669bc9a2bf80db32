//! Body decoding — turns raw payloads into structured `BodyValue`s.
//!
//! Decoding never fails: unparseable JSON degrades to raw text, unreadable
//! bodies degrade to absent, and recognized binary content types are
//! replaced by a marker without touching the payload.

use webtrail_core::BodyValue;

/// Content-type fragments treated as binary. Matched case-insensitively as
/// substrings, so parameters ("image/png; charset=binary") still hit.
const BINARY_CONTENT_TYPES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "font/",
    "application/font",
    "application/x-font",
];

/// Lazily readable response payload. Reading may fail when the transport
/// has already discarded the body (redirects, closed streams, aborts).
pub trait ResponseBody {
    fn text(&mut self) -> std::io::Result<String>;
}

/// Response body already held in memory, as delivered by the ingest API.
/// `None` models a body the observer could not retrieve.
pub struct InlineBody(Option<String>);

impl InlineBody {
    pub fn new(body: Option<String>) -> Self {
        Self(body)
    }
}

impl ResponseBody for InlineBody {
    fn text(&mut self) -> std::io::Result<String> {
        self.0.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "response body unavailable")
        })
    }
}

/// Check if a content type indicates binary data.
pub fn is_binary_content_type(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    BINARY_CONTENT_TYPES.iter().any(|bt| ct.contains(bt))
}

/// Decode an outgoing request body: absent, parsed JSON, or raw text.
pub fn decode_request_body(raw: Option<&str>) -> BodyValue {
    match raw {
        None => BodyValue::Absent,
        Some(text) => match serde_json::from_str(text) {
            Ok(value) => BodyValue::Json(value),
            Err(_) => BodyValue::Text(text.to_string()),
        },
    }
}

/// Decode a response body based on its declared content type.
///
/// Binary content types short-circuit to the marker without reading the
/// body. Text bodies are JSON-parsed when the content type says so or the
/// text looks like JSON; otherwise they round-trip as raw text. A body
/// that cannot be read at all decodes to absent.
pub fn decode_response_body(content_type: &str, body: &mut dyn ResponseBody) -> BodyValue {
    if is_binary_content_type(content_type) {
        return BodyValue::Binary;
    }

    let text = match body.text() {
        Ok(text) => text,
        Err(_) => return BodyValue::Absent,
    };

    if content_type.to_ascii_lowercase().contains("application/json")
        || text.starts_with('{')
        || text.starts_with('[')
    {
        if let Ok(value) = serde_json::from_str(&text) {
            return BodyValue::Json(value);
        }
    }

    BodyValue::Text(text)
}
