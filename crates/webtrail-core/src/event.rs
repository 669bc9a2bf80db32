//! Event model — the tagged union both capture streams feed into.
//!
//! Field names follow the JSON surface consumed by downstream tooling
//! (camelCase, `type` discriminant), so the artifact written at export
//! time is byte-compatible with what the companion extension emits.

use std::collections::HashMap;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Placeholder substituted for response bodies with a binary content type.
pub const BINARY_MARKER: &str = "[binary]";

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A decoded request or response payload.
///
/// Serializes as the parsed JSON value, the raw text, the `"[binary]"`
/// marker, or `null` when no body was present or it could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BodyValue {
    Json(serde_json::Value),
    Text(String),
    Binary,
    #[default]
    Absent,
}

impl Serialize for BodyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BodyValue::Json(value) => value.serialize(serializer),
            BodyValue::Text(text) => serializer.serialize_str(text),
            BodyValue::Binary => serializer.serialize_str(BINARY_MARKER),
            BodyValue::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for BodyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Null => BodyValue::Absent,
            serde_json::Value::String(s) if s == BINARY_MARKER => BodyValue::Binary,
            serde_json::Value::String(s) => BodyValue::Text(s),
            other => BodyValue::Json(other),
        })
    }
}

/// One recorded event, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Interaction(InteractionEvent),
    Network(NetworkEvent),
}

impl Event {
    /// Epoch-millisecond timestamp, the merge key at finalize time.
    pub fn timestamp(&self) -> i64 {
        match self {
            Event::Interaction(e) => e.timestamp,
            Event::Network(e) => e.timestamp,
        }
    }
}

/// A user action observed on the page by the content script.
///
/// Parsed permissively: the producer owns truncation (`innerText` capped at
/// 100 chars + ellipsis) and password redaction (`value` null, form fields
/// `[REDACTED]`); missing fields default rather than reject the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionEvent {
    pub timestamp: i64,
    /// click | input | change | submit.
    pub event: String,
    pub selector: String,
    #[serde(rename = "tagName")]
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub value: Option<String>,
    #[serde(rename = "innerText")]
    pub inner_text: String,
    pub url: String,
    #[serde(rename = "formValues", skip_serializing_if = "Option::is_none")]
    pub form_values: Option<HashMap<String, String>>,
}

/// One HTTP exchange, or a transport failure.
///
/// `response_status` of `None` signals the request never completed; in that
/// case `response_headers` is empty, `response_body` is absent, and `error`
/// carries the failure description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkEvent {
    pub timestamp: i64,
    pub url: String,
    pub method: String,
    #[serde(rename = "requestHeaders")]
    pub request_headers: HashMap<String, String>,
    #[serde(rename = "requestBody")]
    pub request_body: BodyValue,
    #[serde(rename = "responseStatus")]
    pub response_status: Option<u16>,
    #[serde(rename = "responseHeaders")]
    pub response_headers: HashMap<String, String>,
    #[serde(rename = "responseBody")]
    pub response_body: BodyValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Session metadata, exported as the artifact's `session` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMeta {
    #[serde(rename = "startTime")]
    pub start_time: i64,
    #[serde(rename = "endTime")]
    pub end_time: Option<i64>,
    #[serde(rename = "startUrl")]
    pub start_url: String,
    /// Root domain used for traffic filtering; unset until the first real
    /// navigation when recording starts on a placeholder URL.
    pub domain: Option<String>,
}

/// The finalized artifact: metadata plus the time-ordered event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    pub session: SessionMeta,
    pub events: Vec<Event>,
}

/// Consumer of captured events. Implementations must serialize their own
/// state; producers may emit from concurrent tasks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event) -> crate::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_serializes_tagged() {
        let event = Event::Interaction(InteractionEvent {
            timestamp: 1706000000000,
            event: "click".into(),
            selector: "#submit".into(),
            tag_name: "BUTTON".into(),
            inner_text: "Submit".into(),
            url: "https://example.com/page".into(),
            ..Default::default()
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "interaction");
        assert_eq!(json["event"], "click");
        assert_eq!(json["tagName"], "BUTTON");
        assert_eq!(json["innerText"], "Submit");
        assert!(json["value"].is_null());
        // formValues only present for submit events
        assert!(json.get("formValues").is_none());
    }

    #[test]
    fn test_network_serializes_tagged() {
        let event = Event::Network(NetworkEvent {
            timestamp: 1706000000001,
            url: "https://api.example.com/data".into(),
            method: "POST".into(),
            request_body: BodyValue::Json(serde_json::json!({"key": "value"})),
            response_status: Some(200),
            response_body: BodyValue::Binary,
            ..Default::default()
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "network");
        assert_eq!(json["responseStatus"], 200);
        assert_eq!(json["requestBody"]["key"], "value");
        assert_eq!(json["responseBody"], BINARY_MARKER);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_body_value_round_trip() {
        for body in [
            BodyValue::Json(serde_json::json!({"a": [1, 2]})),
            BodyValue::Text("plain text".into()),
            BodyValue::Binary,
            BodyValue::Absent,
        ] {
            let json = serde_json::to_string(&body).unwrap();
            let back: BodyValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, body);
        }
    }

    #[test]
    fn test_interaction_parses_permissively() {
        // Unknown fields ignored, missing fields defaulted.
        let event: InteractionEvent = serde_json::from_str(
            r#"{"type":"interaction","timestamp":42,"event":"click","mystery":true}"#,
        )
        .unwrap();
        assert_eq!(event.timestamp, 42);
        assert_eq!(event.event, "click");
        assert!(event.selector.is_empty());
        assert!(event.attributes.is_empty());
    }

    #[test]
    fn test_event_timestamp_accessor() {
        let interaction = Event::Interaction(InteractionEvent {
            timestamp: 7,
            ..Default::default()
        });
        let network = Event::Network(NetworkEvent {
            timestamp: 9,
            ..Default::default()
        });
        assert_eq!(interaction.timestamp(), 7);
        assert_eq!(network.timestamp(), 9);
    }
}
