//! Compact request snapshot sent to the resolution engine.
//!
//! The snapshot is a JSON object holding at most two entries:
//! `content-type` (when the request declares one) and the configured
//! selection header (first occurrence, name matched case-insensitively).
//! Values are copied as text and escaped by the encoder. JSON strings are
//! UTF-8, so bytes that are not (obs-text) become U+FFFD.

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::context::extractor::RoutingTarget;

/// The allow-listed headers found on one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSubset {
    pub content_type: Option<String>,
    pub selected: Option<(HeaderName, String)>,
}

impl HeaderSubset {
    /// Pick `content-type` and `selection_header` out of `headers`.
    pub fn capture(headers: &HeaderMap, selection_header: &HeaderName) -> Self {
        Self {
            content_type: headers.get(CONTENT_TYPE).map(header_text),
            // HeaderMap keeps names lowercased and returns the first value.
            selected: headers
                .get(selection_header)
                .map(|value| (selection_header.clone(), header_text(value))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content_type.is_none() && self.selected.is_none()
    }

    /// Encode as a JSON object; always `{...}`, `{}` when empty.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// UTF-8 normalized header text; invalid sequences become U+FFFD.
fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

impl Serialize for HeaderSubset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(self.content_type.is_some()) + usize::from(self.selected.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(content_type) = &self.content_type {
            map.serialize_entry(CONTENT_TYPE.as_str(), content_type)?;
        }
        if let Some((name, value)) = &self.selected {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

/// Everything derived from one request before the resolution call.
///
/// Built once per request and not touched after the call starts.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    pub target: RoutingTarget,
    pub method: Method,
    pub headers: HeaderSubset,
    /// Always empty for now; the call signature carries it anyway.
    pub body: Bytes,
}

impl RoutingContext {
    pub fn new(target: RoutingTarget, method: Method, headers: HeaderSubset) -> Self {
        Self {
            target,
            method,
            headers,
            body: Bytes::new(),
        }
    }
}
